//! Committing a staged block to flash.

use crate::bootloader::Bootloader;
use crate::flash::{PAGES_IN_ERASE_BLOCK, PAGE_SIZE};
use crate::hal::Hal;

impl<H: Hal> Bootloader<H> {
    /// Erases the target erase block and programs it page by page from the
    /// staging buffer.
    ///
    /// Every NVM busy-wait keeps polling the frame receiver, so the host
    /// can stream the next packet while the multi-millisecond flash
    /// operations run. The staged-block flag is only cleared after the
    /// last page write: the programmer never leaves a block half done.
    pub(crate) fn program_block(&mut self) {
        let mut address = self.staging_address;

        // The lock region is never smaller than the erase block.
        self.hal.nvm_region_unlock(address);
        self.wait_nvm_ready();

        self.hal.nvm_erase_block(address);
        self.wait_nvm_ready();

        for page in 0..PAGES_IN_ERASE_BLOCK as usize {
            let offset = page * PAGE_SIZE as usize;
            self.hal
                .nvm_write_page(address, &self.staging[offset..offset + PAGE_SIZE as usize]);
            self.wait_nvm_ready();

            address += PAGE_SIZE;
        }

        self.staging_ready = false;
    }

    fn wait_nvm_ready(&mut self) {
        while self.hal.nvm_busy() {
            self.receiver.poll(&mut self.hal);
        }
    }
}
