use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum Chip8Error {
    Io(std::io::Error),
    RomTooLarge { size: usize, max: usize },
    ProgramCounterOutOfBounds(usize),
    IllegalInstruction { opcode: u16, address: usize },
    RegisterOutOfRange(usize),
    MemoryOutOfRange(usize),
    PixelOutOfRange(usize),
    KeyOutOfRange(usize),
    StackOverflow,
    StackUnderflow,
    MachineHalted,
    InvalidArgument(&'static str),
}

impl Display for Chip8Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::RomTooLarge { size, max } => {
                write!(f, "ROM too large: {size} bytes (max {max})")
            }
            Self::ProgramCounterOutOfBounds(pc) => {
                write!(f, "program counter exceeded program memory: 0x{pc:03x}")
            }
            Self::IllegalInstruction { opcode, address } => {
                write!(f, "illegal instruction 0x{opcode:04x} at 0x{address:03x}")
            }
            Self::RegisterOutOfRange(index) => write!(f, "register V{index:x} out of range"),
            Self::MemoryOutOfRange(address) => {
                write!(f, "memory access out of range: 0x{address:04x}")
            }
            Self::PixelOutOfRange(cell) => write!(f, "pixel {cell} outside the framebuffer"),
            Self::KeyOutOfRange(key) => write!(f, "key 0x{key:x} is not on the keypad"),
            Self::StackOverflow => write!(f, "call with full stack"),
            Self::StackUnderflow => write!(f, "return instruction with empty stack"),
            Self::MachineHalted => write!(f, "machine is halted"),
            Self::InvalidArgument(argument) => write!(f, "invalid argument: {argument}"),
        }
    }
}

impl std::error::Error for Chip8Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Chip8Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
