//! Shared test harness: 64 KiB of RAM mapped in every space, reset vectors
//! pointing at a program loaded at 0x1000.

#![allow(dead_code)]

use cpu_m68k::{shared_ram, Cpu68000, CpuConfig, MemoryMap, SharedRam};

pub const RAM_SIZE: usize = 0x1_0000;
pub const STACK: u32 = 0x8000;
pub const PROGRAM: u32 = 0x1000;
pub const HANDLER: u32 = 0x3000;

pub struct Machine {
    pub cpu: Cpu68000,
    pub ram: SharedRam,
}

impl Machine {
    /// Reset into `program` at 0x1000 with SSP 0x8000.
    pub fn new(program: &[u16]) -> Self {
        Self::with_config(program, CpuConfig::default())
    }

    pub fn with_config(program: &[u16], config: CpuConfig) -> Self {
        let mut machine = Self::powered_on(program, config);
        machine.cpu.reset().expect("reset vectors are mapped");
        machine
    }

    /// Memory and vectors in place, but the CPU has not been reset.
    pub fn powered_on(program: &[u16], config: CpuConfig) -> Self {
        let ram = shared_ram(RAM_SIZE);
        let mut memory = MemoryMap::new(&config);
        memory.map_ram(0, RAM_SIZE as u32 - 1, &ram);

        let mut cpu = Cpu68000::new(config);
        cpu.load_memory(memory);

        let machine = Self { cpu, ram };
        machine.poke_long(0, STACK);
        machine.poke_long(4, PROGRAM);
        machine.load(PROGRAM, program);
        machine
    }

    pub fn load(&self, address: u32, words: &[u16]) {
        for (i, &word) in words.iter().enumerate() {
            self.poke_word(address + 2 * i as u32, word);
        }
    }

    /// Point `vector` at `handler`.
    pub fn set_vector(&self, vector: u8, handler: u32) {
        self.poke_long(u32::from(vector) * 4, handler);
    }

    pub fn poke_byte(&self, address: u32, value: u8) {
        self.ram.borrow_mut()[address as usize] = value;
    }

    pub fn poke_word(&self, address: u32, value: u16) {
        let i = address as usize;
        self.ram.borrow_mut()[i..i + 2].copy_from_slice(&value.to_be_bytes());
    }

    pub fn poke_long(&self, address: u32, value: u32) {
        let i = address as usize;
        self.ram.borrow_mut()[i..i + 4].copy_from_slice(&value.to_be_bytes());
    }

    pub fn peek_byte(&self, address: u32) -> u8 {
        self.ram.borrow()[address as usize]
    }

    pub fn peek_word(&self, address: u32) -> u16 {
        let ram = self.ram.borrow();
        let i = address as usize;
        u16::from_be_bytes([ram[i], ram[i + 1]])
    }

    pub fn peek_long(&self, address: u32) -> u32 {
        let ram = self.ram.borrow();
        let i = address as usize;
        u32::from_be_bytes([ram[i], ram[i + 1], ram[i + 2], ram[i + 3]])
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
