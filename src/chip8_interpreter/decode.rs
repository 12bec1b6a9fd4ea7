use std::fmt::{Display, Formatter};

/// The 35 instruction semantics an opcode can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Anything no other rule matches, including `0nnn` routine calls.
    Null,
    Clear,
    Return,
    Jump,
    Call,
    SkipIfEqualConst,
    SkipIfNotEqualConst,
    SkipIfEqualVal,
    LoadConst,
    AddConst,
    LoadVal,
    LoadOr,
    LoadAnd,
    LoadXor,
    AddVal,
    SubVal,
    ShiftRight,
    SubValInverse,
    ShiftLeft,
    SkipIfNotEqualVal,
    SetIndex,
    JumpOffset,
    Random,
    DrawSprite,
    SkipIfKeyPressed,
    SkipIfKeyNotPressed,
    GetDelayTimer,
    WaitForKey,
    SetDelayTimer,
    SetSoundTimer,
    AddToIndex,
    SetIndexToFont,
    StoreBcd,
    DumpRegisters,
    LoadRegisters,
}

/// One fetched opcode with every operand field pre-split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedOpcode {
    pub raw: u16,
    pub instruction: Instruction,
    /// Second nibble, a register index.
    pub x: usize,
    /// Third nibble, a register index.
    pub y: usize,
    /// Fourth nibble.
    pub n: u8,
    /// Low byte immediate.
    pub nn: u8,
    /// Low 12 bits, an address.
    pub nnn: u16,
}

impl DecodedOpcode {
    pub fn family(&self) -> u8 {
        (self.raw >> 12) as u8
    }
}

impl Display for DecodedOpcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X} {:?}", self.raw, self.instruction)
    }
}

pub fn decode(raw: u16) -> DecodedOpcode {
    DecodedOpcode {
        raw,
        instruction: classify(raw),
        x: ((raw & 0x0F00) >> 8) as usize,
        y: ((raw & 0x00F0) >> 4) as usize,
        n: (raw & 0x000F) as u8,
        nn: (raw & 0x00FF) as u8,
        nnn: raw & 0x0FFF,
    }
}

fn classify(raw: u16) -> Instruction {
    use Instruction::*;

    match raw & 0xF000 {
        0x0000 => match raw {
            0x00E0 => Clear,
            0x00EE => Return,
            _ => Null,
        },
        0x1000 => Jump,
        0x2000 => Call,
        0x3000 => SkipIfEqualConst,
        0x4000 => SkipIfNotEqualConst,
        0x5000 => SkipIfEqualVal,
        0x6000 => LoadConst,
        0x7000 => AddConst,
        0x8000 => match raw & 0x000F {
            0x0 => LoadVal,
            0x1 => LoadOr,
            0x2 => LoadAnd,
            0x3 => LoadXor,
            0x4 => AddVal,
            0x5 => SubVal,
            0x6 => ShiftRight,
            0x7 => SubValInverse,
            0xE => ShiftLeft,
            _ => Null,
        },
        0x9000 => SkipIfNotEqualVal,
        0xA000 => SetIndex,
        0xB000 => JumpOffset,
        0xC000 => Random,
        0xD000 => DrawSprite,
        0xE000 => match raw & 0x00FF {
            0x9E => SkipIfKeyPressed,
            0xA1 => SkipIfKeyNotPressed,
            _ => Null,
        },
        _ => match raw & 0x00FF {
            0x07 => GetDelayTimer,
            0x0A => WaitForKey,
            0x15 => SetDelayTimer,
            0x18 => SetSoundTimer,
            0x1E => AddToIndex,
            0x29 => SetIndexToFont,
            0x33 => StoreBcd,
            0x55 => DumpRegisters,
            0x65 => LoadRegisters,
            _ => Null,
        },
    }
}
