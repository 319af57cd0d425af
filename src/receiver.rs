//! Byte-driven deframer for host packets.

use core::convert::TryInto;

use crate::hal::Hal;
use crate::protocol::{Response, GUARD, HEADER_SIZE, MAX_PAYLOAD_SIZE};

/// Collects the serial byte stream into whole command packets.
///
/// The receiver is a two-state machine: it first gathers the fixed 9-byte
/// header, then the declared number of payload bytes. A finished packet is
/// parked in the buffer until [`finish_packet`](FrameReceiver::finish_packet)
/// releases it; no further bytes are consumed in between, so the command
/// processor always sees a consistent buffer.
pub(crate) struct FrameReceiver {
    buffer: [u8; MAX_PAYLOAD_SIZE],
    ptr: usize,
    size: usize,
    command: u8,
    header_received: bool,
    packet_pending: bool,
}

impl FrameReceiver {
    pub(crate) fn new() -> Self {
        Self {
            buffer: [0; MAX_PAYLOAD_SIZE],
            ptr: 0,
            size: 0,
            command: 0,
            header_received: false,
            packet_pending: false,
        }
    }

    /// Consumes at most one serial byte and advances the frame state.
    ///
    /// Safe to call from anywhere, including the flash programmer's
    /// busy-wait loops: it returns immediately when a packet is parked or
    /// no byte is available.
    pub(crate) fn poll<H: Hal>(&mut self, hal: &mut H) {
        if self.packet_pending {
            return;
        }
        if !hal.serial_read_ready() {
            return;
        }

        let byte = hal.serial_read_byte();

        // More than the tick period since the previous byte: whatever frame
        // was underway is abandoned and this byte starts a new header.
        if hal.tick_expired() {
            self.header_received = false;
            self.ptr = 0;
            self.size = 0;
        }

        if !self.header_received {
            self.buffer[self.ptr] = byte;
            self.ptr += 1;

            if self.ptr == HEADER_SIZE {
                self.ptr = 0;
                let declared = self.word(1) as usize;

                if self.word(0) != GUARD {
                    hal.serial_write_byte(Response::Error.into());
                } else if declared > MAX_PAYLOAD_SIZE {
                    // A hostile or confused host could otherwise overflow
                    // the staging buffer with its declared length.
                    hal.serial_write_byte(Response::Error.into());
                } else {
                    self.command = self.buffer[8];
                    if declared == 0 {
                        self.packet_pending = true;
                    } else {
                        self.size = declared;
                        self.header_received = true;
                    }
                }
            }
        } else {
            if self.ptr < self.size {
                self.buffer[self.ptr] = byte;
                self.ptr += 1;
            }

            if self.ptr == self.size {
                self.ptr = 0;
                self.size = 0;
                self.header_received = false;
                self.packet_pending = true;
            }
        }

        hal.tick_restart();
    }

    /// Whether a whole packet is parked in the buffer.
    pub(crate) fn packet_pending(&self) -> bool {
        self.packet_pending
    }

    /// Releases the buffer so the next packet can be received.
    pub(crate) fn finish_packet(&mut self) {
        self.packet_pending = false;
    }

    /// Command byte of the parked packet.
    pub(crate) fn command(&self) -> u8 {
        self.command
    }

    /// Payload interpreted as little-endian 32-bit words, indexed from the
    /// start of the payload.
    pub(crate) fn word(&self, index: usize) -> u32 {
        let offset = index * 4;
        u32::from_le_bytes(self.buffer[offset..offset + 4].try_into().unwrap())
    }

    /// The erase-block worth of data following a DATA command's address
    /// word.
    pub(crate) fn block_data(&self) -> &[u8] {
        &self.buffer[4..MAX_PAYLOAD_SIZE]
    }
}
