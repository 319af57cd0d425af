//! Interpretation of completed host packets.

use crate::bootloader::Bootloader;
use crate::crc;
use crate::error::{Error, Result};
use crate::flash;
use crate::hal::Hal;
use crate::protocol::{Command, Response};

impl<H: Hal> Bootloader<H> {
    /// Processes the packet parked in the receive buffer and emits exactly
    /// one response byte.
    ///
    /// RESET and BKSWAP_RESET acknowledge first, wait for the transmitter
    /// to drain so the host actually sees the response, and then hand the
    /// device to the hardware.
    pub(crate) fn process_packet(&mut self) {
        let command = Command::from_byte(self.receiver.command());

        let result = match command {
            Some(Command::Unlock) => self.unlock(),
            Some(Command::Data) => self.stage_block(),
            Some(Command::Verify) => self.verify_window(),
            Some(Command::Reset) | Some(Command::BankSwapReset) => Ok(Response::Ok),
            None => Err(Error::UnknownCommand(self.receiver.command())),
        };

        let response = result.unwrap_or_else(|error| error.response());
        self.hal.serial_write_byte(response.into());

        match command {
            Some(Command::Reset) => {
                self.drain_transmitter();
                self.hal.system_reset();
            }
            Some(Command::BankSwapReset) => {
                self.drain_transmitter();
                self.hal.nvm_bank_swap();
            }
            _ => {}
        }

        self.receiver.finish_packet();
    }

    /// UNLOCK: open the write window after aligning the requested range
    /// down to erase-block and page granularity. Any rejection leaves the
    /// window empty.
    fn unlock(&mut self) -> Result<Response> {
        let begin = flash::align_to_erase_block(self.receiver.word(0));
        let end = begin.wrapping_add(flash::align_to_pages(self.receiver.word(1)));

        if end > begin && end <= flash::FLASH_END {
            self.window.set(begin, end);
            Ok(Response::Ok)
        } else {
            self.window.clear();
            Err(Error::InvalidRange)
        }
    }

    /// DATA: stage one erase block for programming. The block is accepted
    /// purely on its (aligned) target address; the response goes out before
    /// the physical write, which the programmer performs on the next loop
    /// turn.
    fn stage_block(&mut self) -> Result<Response> {
        let address = flash::align_to_erase_block(self.receiver.word(0));

        if !self.window.contains(address) {
            return Err(Error::OutsideWindow);
        }

        self.staging.copy_from_slice(self.receiver.block_data());
        self.staging_address = address;
        self.staging_ready = true;
        Ok(Response::Ok)
    }

    /// VERIFY: compare the host's expected CRC32 against the hardware CRC
    /// of the whole unlock window.
    fn verify_window(&mut self) -> Result<Response> {
        let expected = self.receiver.word(0);
        let computed = crc::window_crc(&mut self.hal, &self.window);

        if computed == expected {
            Ok(Response::CrcOk)
        } else {
            Err(Error::CrcMismatch)
        }
    }

    fn drain_transmitter(&mut self) {
        while !self.hal.serial_transmit_complete() {}
    }
}
