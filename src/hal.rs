//! Hardware access trait.
//!
//! The bootloader core is generic over one [`Hal`] trait that a board crate
//! implements on top of the real peripherals: the serial link the host
//! talks over, the non-volatile-memory controller, the hardware CRC unit
//! behind its peripheral-access-control gate, the free-running system tick
//! used for the inter-byte timeout, and the CPU's reset and
//! launch-application primitives. Everything else (framing, the command
//! protocol, flash programming policy and the boot decision) lives in this
//! crate.

use crate::boot::{BTL_TRIGGER_RAM_START, TRIGGER_SIGNATURE0, TRIGGER_SIGNATURE1};

pub trait Hal {
    /// Whether the serial receiver holds an unread byte.
    fn serial_read_ready(&mut self) -> bool;

    /// Takes one byte out of the serial receiver. Only called after
    /// [`serial_read_ready`](Hal::serial_read_ready) reported `true`.
    fn serial_read_byte(&mut self) -> u8;

    /// Queues one byte for transmission.
    fn serial_write_byte(&mut self, byte: u8);

    /// Whether the transmitter has drained everything queued so far. Polled
    /// before resets so the final response byte reaches the host.
    fn serial_transmit_complete(&mut self) -> bool;

    /// Whether the tick period (configured to 100 ms) has elapsed since the
    /// last restart.
    fn tick_expired(&mut self) -> bool;

    /// Restarts the tick period.
    fn tick_restart(&mut self);

    /// Whether the NVM controller is still working on an erase or write.
    fn nvm_busy(&mut self) -> bool;

    /// Clears the hardware write lock of the region containing `address`.
    fn nvm_region_unlock(&mut self, address: u32);

    /// Starts erasing the erase block at `address`.
    fn nvm_erase_block(&mut self, address: u32);

    /// Starts programming one page at `address`. `data` is exactly one page
    /// long.
    fn nvm_write_page(&mut self, address: u32, data: &[u8]);

    /// Swaps the A/B flash banks. On hardware this resets the device and
    /// does not return.
    fn nvm_bank_swap(&mut self);

    /// Whether the device currently boots from the primary (A) bank.
    fn nvm_boots_from_primary(&mut self) -> bool;

    /// Lifts the peripheral-access-control write protection of the CRC
    /// unit.
    fn crc_protection_clear(&mut self);

    /// Restores the CRC unit's write protection.
    fn crc_protection_set(&mut self);

    /// Runs the hardware CRC32 over `length` bytes starting at `address`
    /// with the given seed. Must match [`crc32`](crate::crc32) bit for bit
    /// over the same bytes when seeded with `0xffff_ffff`.
    fn crc_calculate(&mut self, address: u32, length: u32, seed: u32) -> u32;

    /// Reads a 32-bit word from the memory map (flash or RAM).
    fn read_word(&self, address: u32) -> u32;

    /// Copies bytes out of the memory map.
    fn read_bytes(&self, address: u32, buffer: &mut [u8]);

    /// Requests a warm system reset. On hardware this does not return.
    fn system_reset(&mut self);

    /// Sets the main stack pointer and branches to the application's reset
    /// vector. On hardware this does not return.
    fn launch(&mut self, stack_pointer: u32, reset_vector: u32);

    /// Whether the bootloader was requested explicitly, checked once at
    /// reset. The default looks for the two trigger signatures the
    /// application leaves in RAM before a soft reset; boards with a
    /// dedicated button or strap pin can override it.
    fn bootloader_trigger(&mut self) -> bool {
        self.read_word(BTL_TRIGGER_RAM_START) == TRIGGER_SIGNATURE0
            && self.read_word(BTL_TRIGGER_RAM_START + 4) == TRIGGER_SIGNATURE1
    }
}
