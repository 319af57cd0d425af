//! The bootloader aggregate and its main loop.

use crate::flash::UnlockWindow;
use crate::hal::Hal;
use crate::protocol::DATA_SIZE;
use crate::receiver::FrameReceiver;

/// Owns the hardware handle and every piece of bootloader state: the frame
/// receiver, the unlock window and the staging buffer for the block most
/// recently received via DATA.
///
/// One call to [`service`](Bootloader::service) performs one turn of the
/// main loop; [`run`](Bootloader::run) loops forever. The receiver is also
/// polled from inside the flash programmer's busy-waits, so serial bytes
/// keep being consumed while an erase or page write is in flight.
pub struct Bootloader<H: Hal> {
    pub(crate) hal: H,
    pub(crate) receiver: FrameReceiver,
    pub(crate) window: UnlockWindow,
    pub(crate) staging: [u8; DATA_SIZE],
    pub(crate) staging_address: u32,
    pub(crate) staging_ready: bool,
}

impl<H: Hal> Bootloader<H> {
    pub fn new(hal: H) -> Self {
        Self {
            hal,
            receiver: FrameReceiver::new(),
            window: UnlockWindow::empty(),
            staging: [0; DATA_SIZE],
            staging_address: 0,
            staging_ready: false,
        }
    }

    /// One turn of the main loop: poll the serial link, then either commit
    /// a staged block to flash or process a completed packet.
    ///
    /// Committing takes precedence, which guarantees that a VERIFY queued
    /// behind a DATA command is only answered after the block has actually
    /// been written.
    pub fn service(&mut self) {
        self.receiver.poll(&mut self.hal);

        if self.staging_ready {
            self.program_block();
        } else if self.receiver.packet_pending() {
            self.process_packet();
        }
    }

    /// Serves the wire protocol forever.
    pub fn run(mut self) -> ! {
        loop {
            self.service();
        }
    }

    /// The currently unlocked address range.
    pub fn unlock_window(&self) -> UnlockWindow {
        self.window
    }

    /// Access to the underlying hardware handle.
    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    /// Releases the hardware handle.
    pub fn into_hal(self) -> H {
        self.hal
    }
}
