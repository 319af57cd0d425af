//! Wire format of the bootloader's serial protocol.
//!
//! Every host packet starts with a fixed 9-byte header: a 4-byte guard word,
//! a 4-byte payload length and a single command byte, all little-endian.
//! The payload follows immediately and its layout depends on the command.
//! The bootloader answers every packet with exactly one [`Response`] byte.

use crate::flash;

/// Magic word opening every packet. Packets with a different guard are
/// dropped after an error response.
pub const GUARD: u32 = 0x5048_434D;

/// Bytes in the fixed packet header (guard, payload size, command).
pub const HEADER_SIZE: usize = 9;

/// Payload bytes carried by a DATA command after its address word: exactly
/// one erase block.
pub const DATA_SIZE: usize = flash::ERASE_BLOCK_SIZE as usize;

/// Capacity of the receive buffer: the DATA payload is the largest the
/// protocol defines (4-byte target address plus one erase block).
pub const MAX_PAYLOAD_SIZE: usize = 4 + DATA_SIZE;

/// Commands understood by the bootloader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Open the write window: payload is `addr: u32, size: u32`.
    Unlock = 0xa0,
    /// Stage one erase block: payload is `addr: u32` followed by
    /// [`DATA_SIZE`] bytes of image data.
    Data = 0xa1,
    /// Compare a host checksum against the unlocked flash range: payload is
    /// `expected_crc32: u32`.
    Verify = 0xa2,
    /// Acknowledge, then perform a system reset. No payload.
    Reset = 0xa3,
    /// Acknowledge, then swap flash banks (which resets). No payload.
    BankSwapReset = 0xa4,
}

impl Command {
    /// Decodes the header's command byte. Returns `None` for bytes outside
    /// the protocol, which the bootloader answers with
    /// [`Response::Invalid`].
    pub fn from_byte(byte: u8) -> Option<Command> {
        match byte {
            0xa0 => Some(Command::Unlock),
            0xa1 => Some(Command::Data),
            0xa2 => Some(Command::Verify),
            0xa3 => Some(Command::Reset),
            0xa4 => Some(Command::BankSwapReset),
            _ => None,
        }
    }
}

/// Status bytes sent back to the host, one per received packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Response {
    /// Command accepted.
    Ok = 0x50,
    /// Malformed packet or rejected arguments.
    Error = 0x51,
    /// Unknown command byte.
    Invalid = 0x52,
    /// VERIFY checksum matched.
    CrcOk = 0x53,
    /// VERIFY checksum did not match.
    CrcFail = 0x54,
}

impl From<Response> for u8 {
    fn from(response: Response) -> u8 {
        response as u8
    }
}
