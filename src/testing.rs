//! A scripted, memory-backed HAL for the unit tests.

use std::collections::VecDeque;

use crate::boot::{BTL_TRIGGER_RAM_START, TRIGGER_SIGNATURE0, TRIGGER_SIGNATURE1};
use crate::crc32;
use crate::flash::{APP_START_ADDRESS, ERASE_BLOCK_SIZE, FLASH_LENGTH, OFFSET_ALIGN_MASK};
use crate::hal::Hal;
use crate::image::{DESCRIPTOR_SIGNATURE0, DESCRIPTOR_SIGNATURE1, DESCRIPTOR_SIZE};
use crate::protocol::GUARD;

const RAM_SIZE: usize = 0x1000;

/// In-memory device model: a megabyte of flash, a few kilobytes of RAM for
/// the trigger region, scripted serial queues and counters for every
/// side-effecting hardware call. The hardware CRC is implemented with a
/// plain bitwise loop so the tests compare it against the crate's
/// table-driven implementation rather than against itself.
pub(crate) struct MockHal {
    pub flash: Vec<u8>,
    pub ram: Vec<u8>,
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub tick_expire_next: bool,
    pub tick_restarts: u32,
    /// How many busy polls each NVM operation reports before completing.
    pub busy_per_operation: u32,
    busy_remaining: u32,
    pub unlocked_regions: Vec<u32>,
    pub erased_blocks: Vec<u32>,
    pub written_pages: Vec<u32>,
    pub bank_swaps: u32,
    pub system_resets: u32,
    pub primary_bank: bool,
    pub launched: Option<(u32, u32)>,
    pub crc_protection_open: bool,
    pub crc_protection_clears: u32,
    pub crc_protection_sets: u32,
}

impl MockHal {
    pub fn new() -> Self {
        Self {
            flash: vec![0xff; FLASH_LENGTH as usize],
            ram: vec![0; RAM_SIZE],
            rx: VecDeque::new(),
            tx: Vec::new(),
            tick_expire_next: false,
            tick_restarts: 0,
            busy_per_operation: 0,
            busy_remaining: 0,
            unlocked_regions: Vec::new(),
            erased_blocks: Vec::new(),
            written_pages: Vec::new(),
            bank_swaps: 0,
            system_resets: 0,
            primary_bank: true,
            launched: None,
            crc_protection_open: false,
            crc_protection_clears: 0,
            crc_protection_sets: 0,
        }
    }

    /// Queues a complete wire packet on the serial input.
    pub fn push_packet(&mut self, command: u8, payload: &[u8]) {
        self.rx.extend(GUARD.to_le_bytes().iter());
        self.rx.extend((payload.len() as u32).to_le_bytes().iter());
        self.rx.push_back(command);
        self.rx.extend(payload.iter());
    }

    /// Copies data directly into the flash model.
    pub fn load_flash(&mut self, address: u32, data: &[u8]) {
        let address = address as usize;
        self.flash[address..address + data.len()].copy_from_slice(data);
    }

    /// Writes one little-endian word into the flash or RAM model.
    pub fn store_word(&mut self, address: u32, value: u32) {
        let bytes = value.to_le_bytes();
        if address >= BTL_TRIGGER_RAM_START {
            let offset = (address - BTL_TRIGGER_RAM_START) as usize;
            self.ram[offset..offset + 4].copy_from_slice(&bytes);
        } else {
            self.load_flash(address, &bytes);
        }
    }

    /// Leaves the trigger signatures in RAM as the application would before
    /// a soft reset.
    pub fn arm_trigger(&mut self) {
        self.store_word(BTL_TRIGGER_RAM_START, TRIGGER_SIGNATURE0);
        self.store_word(BTL_TRIGGER_RAM_START + 4, TRIGGER_SIGNATURE1);
    }

    /// Installs a synthetic application image: a two-word vector table,
    /// deterministic filler up to the descriptor at `descriptor_offset`
    /// (relative to the application start), `body` right after the
    /// descriptor, and a correct checksum in the descriptor's last word.
    pub fn install_image(&mut self, descriptor_offset: u32, length: u32, body: &[u8]) {
        self.store_word(APP_START_ADDRESS, 0x2000_4000);
        self.store_word(APP_START_ADDRESS + 4, (APP_START_ADDRESS + 0x41) | 1);
        for offset in 8..descriptor_offset {
            self.flash[(APP_START_ADDRESS + offset) as usize] = (offset * 13 % 251) as u8;
        }

        let descriptor = APP_START_ADDRESS + descriptor_offset;
        self.store_word(descriptor, DESCRIPTOR_SIGNATURE0);
        self.store_word(descriptor + 4, DESCRIPTOR_SIGNATURE1);
        self.store_word(descriptor + 8, length);

        let body_start = (descriptor + DESCRIPTOR_SIZE) as usize;
        self.flash[body_start..body_start + body.len()].copy_from_slice(body);

        let end = (APP_START_ADDRESS + length) as usize;
        let mut stream = Vec::new();
        stream.extend_from_slice(&self.flash[APP_START_ADDRESS as usize..descriptor as usize]);
        stream.extend_from_slice(&self.flash[body_start..end]);
        self.store_word(descriptor + 12, crc32(&stream));
    }

    fn read_mapped(&self, address: u32) -> u8 {
        if address >= BTL_TRIGGER_RAM_START {
            let offset = (address - BTL_TRIGGER_RAM_START) as usize;
            self.ram.get(offset).copied().unwrap_or(0)
        } else {
            self.flash.get(address as usize).copied().unwrap_or(0xff)
        }
    }
}

impl Hal for MockHal {
    fn serial_read_ready(&mut self) -> bool {
        !self.rx.is_empty()
    }

    fn serial_read_byte(&mut self) -> u8 {
        self.rx.pop_front().expect("serial read past end of script")
    }

    fn serial_write_byte(&mut self, byte: u8) {
        self.tx.push(byte);
    }

    fn serial_transmit_complete(&mut self) -> bool {
        true
    }

    fn tick_expired(&mut self) -> bool {
        let expired = self.tick_expire_next;
        self.tick_expire_next = false;
        expired
    }

    fn tick_restart(&mut self) {
        self.tick_restarts += 1;
    }

    fn nvm_busy(&mut self) -> bool {
        if self.busy_remaining > 0 {
            self.busy_remaining -= 1;
            true
        } else {
            false
        }
    }

    fn nvm_region_unlock(&mut self, address: u32) {
        self.unlocked_regions.push(address);
        self.busy_remaining = self.busy_per_operation;
    }

    fn nvm_erase_block(&mut self, address: u32) {
        assert_eq!(address & OFFSET_ALIGN_MASK, address, "unaligned erase");
        let begin = address as usize;
        let end = begin + ERASE_BLOCK_SIZE as usize;
        for byte in &mut self.flash[begin..end] {
            *byte = 0xff;
        }
        self.erased_blocks.push(address);
        self.busy_remaining = self.busy_per_operation;
    }

    fn nvm_write_page(&mut self, address: u32, data: &[u8]) {
        let begin = address as usize;
        self.flash[begin..begin + data.len()].copy_from_slice(data);
        self.written_pages.push(address);
        self.busy_remaining = self.busy_per_operation;
    }

    fn nvm_bank_swap(&mut self) {
        self.bank_swaps += 1;
    }

    fn nvm_boots_from_primary(&mut self) -> bool {
        self.primary_bank
    }

    fn crc_protection_clear(&mut self) {
        self.crc_protection_open = true;
        self.crc_protection_clears += 1;
    }

    fn crc_protection_set(&mut self) {
        self.crc_protection_open = false;
        self.crc_protection_sets += 1;
    }

    fn crc_calculate(&mut self, address: u32, length: u32, seed: u32) -> u32 {
        assert!(self.crc_protection_open, "CRC unit is write protected");
        let mut crc = seed;
        for index in 0..length {
            crc ^= u32::from(self.read_mapped(address + index));
            for _ in 0..8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ 0xedb8_8320
                } else {
                    crc >> 1
                };
            }
        }
        crc ^ 0xffff_ffff
    }

    fn read_word(&self, address: u32) -> u32 {
        let mut bytes = [0u8; 4];
        self.read_bytes(address, &mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn read_bytes(&self, address: u32, buffer: &mut [u8]) {
        for (index, byte) in buffer.iter_mut().enumerate() {
            *byte = self.read_mapped(address + index as u32);
        }
    }

    fn system_reset(&mut self) {
        self.system_resets += 1;
    }

    fn launch(&mut self, stack_pointer: u32, reset_vector: u32) {
        self.launched = Some((stack_pointer, reset_vector));
    }
}
