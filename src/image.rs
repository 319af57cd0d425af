//! The descriptor embedded in application images.

use crc_any::CRCu32;

use crate::crc::digest_range;
use crate::flash::{APP_START_ADDRESS, ERASE_BLOCK_SIZE};
use crate::hal::Hal;

/// First signature word of an image descriptor.
pub const DESCRIPTOR_SIGNATURE0: u32 = 0xaa55_fade;

/// Second signature word of an image descriptor.
pub const DESCRIPTOR_SIGNATURE1: u32 = 0x55aa_c0de;

/// Descriptor footprint in flash: two signature words, the image length
/// and its checksum.
pub const DESCRIPTOR_SIZE: u32 = 16;

/// The 16-byte marker an application image embeds somewhere word-aligned
/// within the first erase block of the application region. It names the
/// image's byte length and the CRC32 the boot decider checks before
/// launching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageDescriptor {
    /// Flash address the descriptor was found at.
    pub address: u32,
    /// Length of the image in bytes, counted from the application start.
    pub length: u32,
    /// Expected CRC32 of the image with the descriptor bytes excluded.
    pub checksum: u32,
}

/// Scans the first erase block of the application region for a descriptor.
///
/// Candidates are 32-bit aligned; the scan stops at the last address where
/// both signature words still fit inside the block.
pub fn find_descriptor<H: Hal>(hal: &H) -> Option<ImageDescriptor> {
    let mut address = APP_START_ADDRESS;
    let last = APP_START_ADDRESS + ERASE_BLOCK_SIZE - 8;

    while address <= last {
        if hal.read_word(address) == DESCRIPTOR_SIGNATURE0
            && hal.read_word(address + 4) == DESCRIPTOR_SIGNATURE1
        {
            return Some(ImageDescriptor {
                address,
                length: hal.read_word(address + 8),
                checksum: hal.read_word(address + 12),
            });
        }
        address += 4;
    }

    None
}

/// CRC32 of the installed image with the descriptor's 16 bytes treated as
/// absent: one accumulator over the bytes before the descriptor, continued
/// over the bytes after it.
pub fn image_checksum<H: Hal>(hal: &H, descriptor: &ImageDescriptor) -> u32 {
    let begin = APP_START_ADDRESS;
    let end = begin.wrapping_add(descriptor.length);

    let mut crc = CRCu32::crc32();
    digest_range(hal, &mut crc, begin, end.min(descriptor.address));
    digest_range(hal, &mut crc, descriptor.address + DESCRIPTOR_SIZE, end);
    crc.get_crc()
}
