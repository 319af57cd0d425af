//! Checksum support.
//!
//! Two CRC32 implementations are in play: the hardware unit reached through
//! the HAL, used to answer VERIFY commands, and a table-driven software
//! implementation used by the boot decider to validate the installed image
//! before the hardware is trusted. Both are the IEEE 802.3 CRC32 (reflected
//! polynomial, seed `0xffff_ffff`, final XOR `0xffff_ffff`) and must agree
//! bit for bit over the same bytes.

use crc_any::CRCu32;

use crate::flash::UnlockWindow;
use crate::hal::Hal;

/// Initial value handed to the hardware CRC unit.
pub(crate) const CRC_SEED: u32 = 0xffff_ffff;

/// Runs the hardware CRC over the unlock window, lifting the peripheral's
/// write protection for the duration of the computation.
pub(crate) fn window_crc<H: Hal>(hal: &mut H, window: &UnlockWindow) -> u32 {
    hal.crc_protection_clear();
    let crc = hal.crc_calculate(window.begin(), window.len(), CRC_SEED);
    hal.crc_protection_set();
    crc
}

/// Calculates the CRC32 of a byte buffer the way the bootloader's hardware
/// unit does. Hosts preparing an image descriptor use this to fill in its
/// checksum field.
///
/// # Examples
///
/// ```rust
/// assert_eq!(coracle::crc32(b"123456789"), 0xcbf4_3926);
/// ```
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = CRCu32::crc32();
    crc.digest(data);
    crc.get_crc()
}

/// Feeds the flash range `[begin, end)` into a running digest, reading
/// through the HAL in small chunks.
pub(crate) fn digest_range<H: Hal>(hal: &H, crc: &mut CRCu32, begin: u32, end: u32) {
    let mut chunk = [0u8; 64];
    let mut address = begin;
    while address < end {
        let length = ((end - address) as usize).min(chunk.len());
        hal.read_bytes(address, &mut chunk[..length]);
        crc.digest(&chunk[..length]);
        address += length as u32;
    }
}
