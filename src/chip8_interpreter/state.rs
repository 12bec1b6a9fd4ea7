use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, log_enabled};

use crate::chip8_interpreter::config::{
    FONT_BYTES, FONT_START, KEY_COUNT, MAX_ROM_SIZE, MEMORY_SIZE, PROGRAM_START, REGISTER_COUNT,
    SCREEN_CELLS, STACK_DEPTH,
};
use crate::chip8_interpreter::error::Chip8Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    StopRequested,
    ProgramCounterOutOfBounds(usize),
    /// An instruction failed; `opcode` was fetched from `address`.
    Fault { opcode: u16, address: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// Suspended by `Fx0A`; the next key-down lands in `register`.
    WaitingForKey { register: usize },
    Halted(HaltReason),
}

impl RunState {
    pub fn is_halted(&self) -> bool {
        matches!(self, Self::Halted(_))
    }
}

#[derive(Debug, Clone)]
pub struct EmulatorState {
    pub memory: [u8; MEMORY_SIZE],
    pub registers: [u8; REGISTER_COUNT],
    pub stack: [u16; STACK_DEPTH],
    pub stack_pointer: usize,
    pub key_inputs: [bool; KEY_COUNT],
    pub screen_buffer: [u8; SCREEN_CELLS],
    pub pc: usize,
    pub index: u16,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub should_draw: bool,
    pub run_state: RunState,
    pub op: u16,
    pub rom: Vec<u8>,
    pub rom_path: Option<PathBuf>,
}

impl Default for EmulatorState {
    fn default() -> Self {
        Self {
            memory: [0; MEMORY_SIZE],
            registers: [0; REGISTER_COUNT],
            stack: [0; STACK_DEPTH],
            stack_pointer: 0,
            key_inputs: [false; KEY_COUNT],
            screen_buffer: [0; SCREEN_CELLS],
            pc: PROGRAM_START,
            index: 0,
            delay_timer: 0,
            sound_timer: 0,
            should_draw: false,
            run_state: RunState::Running,
            op: 0,
            rom: Vec::new(),
            rom_path: None,
        }
    }
}

impl EmulatorState {
    pub fn register(&self, index: usize) -> Result<u8, Chip8Error> {
        self.registers
            .get(index)
            .copied()
            .ok_or(Chip8Error::RegisterOutOfRange(index))
    }

    pub fn set_register(&mut self, index: usize, value: u8) -> Result<(), Chip8Error> {
        let slot = self
            .registers
            .get_mut(index)
            .ok_or(Chip8Error::RegisterOutOfRange(index))?;
        *slot = value;
        Ok(())
    }

    pub fn read_memory(&self, address: usize) -> Result<u8, Chip8Error> {
        self.memory
            .get(address)
            .copied()
            .ok_or(Chip8Error::MemoryOutOfRange(address))
    }

    pub fn write_memory(&mut self, address: usize, value: u8) -> Result<(), Chip8Error> {
        let slot = self
            .memory
            .get_mut(address)
            .ok_or(Chip8Error::MemoryOutOfRange(address))?;
        *slot = value;
        Ok(())
    }

    pub fn pixel(&self, cell: usize) -> Result<bool, Chip8Error> {
        self.screen_buffer
            .get(cell)
            .map(|value| *value == 1)
            .ok_or(Chip8Error::PixelOutOfRange(cell))
    }

    /// Flips one cell and returns whether it was lit beforehand.
    pub fn xor_pixel(&mut self, cell: usize) -> Result<bool, Chip8Error> {
        let slot = self
            .screen_buffer
            .get_mut(cell)
            .ok_or(Chip8Error::PixelOutOfRange(cell))?;
        let was_set = *slot == 1;
        *slot ^= 1;
        Ok(was_set)
    }

    pub fn key_pressed(&self, key: usize) -> Result<bool, Chip8Error> {
        self.key_inputs
            .get(key)
            .copied()
            .ok_or(Chip8Error::KeyOutOfRange(key))
    }

    pub fn set_key_state(&mut self, key: usize, is_pressed: bool) -> Result<(), Chip8Error> {
        let slot = self
            .key_inputs
            .get_mut(key)
            .ok_or(Chip8Error::KeyOutOfRange(key))?;
        *slot = is_pressed;
        Ok(())
    }

    pub fn push_stack(&mut self, return_address: u16) -> Result<(), Chip8Error> {
        if self.stack_pointer >= STACK_DEPTH {
            return Err(Chip8Error::StackOverflow);
        }
        self.stack[self.stack_pointer] = return_address;
        self.stack_pointer += 1;
        Ok(())
    }

    pub fn pop_stack(&mut self) -> Result<u16, Chip8Error> {
        if self.stack_pointer == 0 {
            return Err(Chip8Error::StackUnderflow);
        }
        self.stack_pointer -= 1;
        Ok(self.stack[self.stack_pointer])
    }

    pub fn stack_top(&self) -> Option<u16> {
        self.stack_pointer
            .checked_sub(1)
            .map(|top| self.stack[top])
    }

    /// Big-endian opcode at `address`.
    pub fn opcode_at(&self, address: usize) -> Result<u16, Chip8Error> {
        let high = self.read_memory(address)?;
        let low = self.read_memory(address + 1)?;
        Ok(u16::from_be_bytes([high, low]))
    }
}

pub fn create_state(rom_path: Option<&Path>) -> Result<EmulatorState, Chip8Error> {
    let mut state = EmulatorState::default();
    reset_state(&mut state)?;
    if let Some(path) = rom_path {
        load_rom(&mut state, path)?;
    }
    Ok(state)
}

/// Returns the machine to power-on state, keeping and reloading the last ROM.
pub fn reset_state(state: &mut EmulatorState) -> Result<(), Chip8Error> {
    state.memory = [0; MEMORY_SIZE];
    state.registers = [0; REGISTER_COUNT];
    state.stack = [0; STACK_DEPTH];
    state.stack_pointer = 0;
    state.key_inputs = [false; KEY_COUNT];
    clear_display(state);
    state.should_draw = false;

    state.pc = PROGRAM_START;
    state.index = 0;
    state.delay_timer = 0;
    state.sound_timer = 0;
    state.run_state = RunState::Running;
    state.op = 0;

    load_font(state);

    let rom = std::mem::take(&mut state.rom);
    if !rom.is_empty() {
        load_rom_bytes(state, &rom)?;
    }
    Ok(())
}

pub fn clear_display(state: &mut EmulatorState) {
    state.screen_buffer = [0; SCREEN_CELLS];
}

pub fn load_font(state: &mut EmulatorState) {
    state.memory[FONT_START..FONT_START + FONT_BYTES.len()].copy_from_slice(&FONT_BYTES);
}

pub fn load_rom(state: &mut EmulatorState, path: &Path) -> Result<(), Chip8Error> {
    let rom_bytes = fs::read(path)?;
    load_rom_bytes(state, &rom_bytes)?;
    state.rom_path = Some(path.to_path_buf());
    info!("read {} bytes from {}", rom_bytes.len(), path.display());
    Ok(())
}

pub fn load_rom_bytes(state: &mut EmulatorState, rom_bytes: &[u8]) -> Result<(), Chip8Error> {
    if rom_bytes.len() > MAX_ROM_SIZE {
        return Err(Chip8Error::RomTooLarge {
            size: rom_bytes.len(),
            max: MAX_ROM_SIZE,
        });
    }

    let start = PROGRAM_START;
    let end = PROGRAM_START + rom_bytes.len();
    state.memory[start..].fill(0);
    state.memory[start..end].copy_from_slice(rom_bytes);
    state.rom = rom_bytes.to_vec();

    info!("loaded rom into mem starting at {start:x} - to {end:x}");
    if log_enabled!(log::Level::Debug) {
        debug!("rom contents:\n{}", hex_dump(rom_bytes));
    }

    Ok(())
}

fn hex_dump(rom: &[u8]) -> String {
    rom.chunks(16)
        .map(|row| {
            row.iter()
                .map(|byte| format!("0x{byte:02x}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
