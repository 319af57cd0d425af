//! Reset-time decision between launching the application and staying in
//! the bootloader.

use crate::flash::APP_START_ADDRESS;
use crate::hal::Hal;
use crate::image;

/// Start of the RAM trigger region the application writes before a soft
/// reset to request bootloader entry.
pub const BTL_TRIGGER_RAM_START: u32 = 0x2000_0000;

/// First trigger word.
pub const TRIGGER_SIGNATURE0: u32 = 0x5048_434d;

/// Second trigger word.
pub const TRIGGER_SIGNATURE1: u32 = 0x4d43_4850;

/// Value of an erased flash word; used as the "no application installed"
/// check on the first word of the application region.
const ERASED_WORD: u32 = 0xffff_ffff;

/// Outcome of the reset-time check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootDecision {
    /// The installed image is intact; set the stack pointer and jump.
    Launch {
        stack_pointer: u32,
        reset_vector: u32,
    },
    /// The active copy failed its checksum and the device still boots from
    /// the primary bank: fail over to the other copy (resets the device).
    SwapBanks,
    /// Serve the wire protocol: nothing to launch, the application asked
    /// for the bootloader, or both image copies are bad.
    StayInBootloader,
}

/// Decides what to do at reset.
///
/// In order: a blank application region or an armed trigger keeps the
/// device in the bootloader; a missing descriptor means the image is
/// corrupt beyond recovery on this bank pair; a checksum mismatch fails
/// over to the alternate bank once, after which the bootloader is the
/// fallback.
pub fn decide<H: Hal>(hal: &mut H) -> BootDecision {
    if hal.read_word(APP_START_ADDRESS) == ERASED_WORD {
        return BootDecision::StayInBootloader;
    }

    if hal.bootloader_trigger() {
        return BootDecision::StayInBootloader;
    }

    let descriptor = match image::find_descriptor(hal) {
        Some(descriptor) => descriptor,
        None => return BootDecision::StayInBootloader,
    };

    if image::image_checksum(hal, &descriptor) != descriptor.checksum {
        if hal.nvm_boots_from_primary() {
            return BootDecision::SwapBanks;
        }
        return BootDecision::StayInBootloader;
    }

    BootDecision::Launch {
        stack_pointer: hal.read_word(APP_START_ADDRESS),
        reset_vector: hal.read_word(APP_START_ADDRESS + 4),
    }
}

/// Runs the boot decision and acts on it.
///
/// Launching and bank swapping never return on hardware; if this function
/// returns, the caller should enter the bootloader's main loop.
pub fn startup<H: Hal>(hal: &mut H) {
    match decide(hal) {
        BootDecision::Launch {
            stack_pointer,
            reset_vector,
        } => hal.launch(stack_pointer, reset_vector),
        BootDecision::SwapBanks => hal.nvm_bank_swap(),
        BootDecision::StayInBootloader => {}
    }
}
