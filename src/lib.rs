//! Device-side core of the coracle UART bootloader.
//!
//! The crate implements everything above the raw peripherals: framing of
//! host packets on the serial byte stream, the flash update command
//! protocol, erase-block programming that stays responsive while the NVM
//! controller is busy, and the reset-time decision between launching the
//! installed application and serving the wire protocol. A board crate
//! provides the hardware through one [`Hal`] implementation.
//!
//! # Example: wiring the core to a board
//! ```rust, no_run
//! use coracle::{boot, Bootloader, Hal};
//!
//! # struct Board;
//! # impl Hal for Board {
//! #     fn serial_read_ready(&mut self) -> bool { unimplemented!() }
//! #     fn serial_read_byte(&mut self) -> u8 { unimplemented!() }
//! #     fn serial_write_byte(&mut self, _: u8) { unimplemented!() }
//! #     fn serial_transmit_complete(&mut self) -> bool { unimplemented!() }
//! #     fn tick_expired(&mut self) -> bool { unimplemented!() }
//! #     fn tick_restart(&mut self) { unimplemented!() }
//! #     fn nvm_busy(&mut self) -> bool { unimplemented!() }
//! #     fn nvm_region_unlock(&mut self, _: u32) { unimplemented!() }
//! #     fn nvm_erase_block(&mut self, _: u32) { unimplemented!() }
//! #     fn nvm_write_page(&mut self, _: u32, _: &[u8]) { unimplemented!() }
//! #     fn nvm_bank_swap(&mut self) { unimplemented!() }
//! #     fn nvm_boots_from_primary(&mut self) -> bool { unimplemented!() }
//! #     fn crc_protection_clear(&mut self) { unimplemented!() }
//! #     fn crc_protection_set(&mut self) { unimplemented!() }
//! #     fn crc_calculate(&mut self, _: u32, _: u32, _: u32) -> u32 { unimplemented!() }
//! #     fn read_word(&self, _: u32) -> u32 { unimplemented!() }
//! #     fn read_bytes(&self, _: u32, _: &mut [u8]) { unimplemented!() }
//! #     fn system_reset(&mut self) { unimplemented!() }
//! #     fn launch(&mut self, _: u32, _: u32) { unimplemented!() }
//! # }
//! // `Board` implements `Hal` on the chip's serial port, NVM controller,
//! // hardware CRC unit and system tick.
//! let mut board = Board;
//!
//! // Launch the installed application if it is intact. Returns only when
//! // the device should stay in the bootloader.
//! boot::startup(&mut board);
//!
//! // Serve the wire protocol forever.
//! Bootloader::new(board).run()
//! ```

#![cfg_attr(not(test), no_std)]

extern crate crc_any;

mod bootloader;
mod command;
mod crc;
mod error;
mod hal;
mod programmer;
mod receiver;
#[cfg(test)]
mod testing;

pub mod boot;
pub mod flash;
pub mod image;
pub mod protocol;

pub use boot::BootDecision;
pub use bootloader::Bootloader;
pub use crc::crc32;
pub use error::{Error, Result};
pub use flash::UnlockWindow;
pub use hal::Hal;
pub use image::ImageDescriptor;
pub use protocol::{Command, Response};
