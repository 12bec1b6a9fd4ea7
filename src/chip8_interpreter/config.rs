use std::path::{Path, PathBuf};

use crate::chip8_interpreter::error::Chip8Error;
use crate::chip8_interpreter::quirks::{Chip8Quirks, CONFORMANT_QUIRKS};

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: usize = 0x200;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START;
pub const REGISTER_COUNT: usize = 16;
pub const FLAG_REGISTER: usize = 0xF;
pub const STACK_DEPTH: usize = 16;
pub const KEY_COUNT: usize = 16;
pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
pub const SCREEN_CELLS: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

pub const DEFAULT_CPU_HZ: u32 = 500;
pub const TIMER_HZ: u32 = 60;

pub const FONT_START: usize = 0x050;
pub const FONT_GLYPH_HEIGHT: usize = 5;
pub const FONT_BYTES: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Everything needed to bring up an interpreter for one ROM.
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    pub rom_path: PathBuf,
    pub cpu_hz: u32,
    pub quirks: Chip8Quirks,
    /// Fixed seed for `Cxnn`; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl InterpreterConfig {
    pub fn new(rom_path: impl AsRef<Path>) -> Self {
        Self {
            rom_path: rom_path.as_ref().to_path_buf(),
            cpu_hz: DEFAULT_CPU_HZ,
            quirks: CONFORMANT_QUIRKS,
            seed: None,
        }
    }

    pub fn with_cpu_hz(mut self, cpu_hz: u32) -> Self {
        self.cpu_hz = cpu_hz;
        self
    }

    pub fn with_quirks(mut self, quirks: Chip8Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), Chip8Error> {
        if self.cpu_hz == 0 {
            return Err(Chip8Error::InvalidArgument("cpu_hz must be > 0"));
        }
        Ok(())
    }
}
