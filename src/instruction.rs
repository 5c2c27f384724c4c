use std::fmt;

use crate::{Error, Result};

/// A raw 16-bit instruction word with accessors for its operand fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    pub fn raw(&self) -> u16 {
        self.0
    }

    /// The top nibble, selecting the instruction family.
    pub fn family(&self) -> u8 {
        ((self.0 & 0xF000) >> 12) as u8
    }

    pub fn x(&self) -> usize {
        ((self.0 & 0x0F00) >> 8) as usize
    }

    pub fn y(&self) -> usize {
        ((self.0 & 0x00F0) >> 4) as usize
    }

    pub fn n(&self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    pub fn kk(&self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    pub fn nnn(&self) -> u16 {
        self.0 & 0x0FFF
    }
}

/// One decoded Chip-8 instruction. Register operands are indices into V0..VF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Clear,
    Return,
    Jump(u16),
    Call(u16),
    SkipIfEqualImmediate(usize, u8),
    SkipIfNotEqualImmediate(usize, u8),
    SkipIfEqualRegister(usize, usize),
    LoadRegisterImmediate(usize, u8),
    AddRegisterImmediate(usize, u8),
    LoadRegisterRegister(usize, usize),
    OrRegisterRegister(usize, usize),
    AndRegisterRegister(usize, usize),
    XorRegisterRegister(usize, usize),
    AddRegisterRegister(usize, usize),
    SubRegisterRegister(usize, usize),
    ShiftRightRegister(usize),
    SubRegisterRegisterNegated(usize, usize),
    ShiftLeftRegister(usize),
    SkipIfNotEqualRegister(usize, usize),
    LoadIndex(u16),
    JumpOffset(u16),
    Random(usize, u8),
    DrawSprite(usize, usize, u8),
    SkipIfKeyPressed(usize),
    SkipIfKeyNotPressed(usize),
    LoadDelayTimer(usize),
    WaitForKey(usize),
    SetDelayTimer(usize),
    SetSoundTimer(usize),
    AddIndex(usize),
    LoadFontAddress(usize),
    StoreBcd(usize),
    StoreRegisters(usize),
    LoadRegisters(usize),
}

impl Instruction {
    /// Maps an opcode to its instruction. `address` is only used to report unknown opcodes.
    pub fn decode(opcode: Opcode, address: u16) -> Result<Instruction> {
        use Instruction::*;

        let (x, y, n, kk, nnn) = (opcode.x(), opcode.y(), opcode.n(), opcode.kk(), opcode.nnn());

        let instruction = match (opcode.family(), n) {
            (0x0, _) if opcode.raw() == 0x00E0 => Clear,
            (0x0, _) if opcode.raw() == 0x00EE => Return,
            (0x1, _) => Jump(nnn),
            (0x2, _) => Call(nnn),
            (0x3, _) => SkipIfEqualImmediate(x, kk),
            (0x4, _) => SkipIfNotEqualImmediate(x, kk),
            (0x5, 0x0) => SkipIfEqualRegister(x, y),
            (0x6, _) => LoadRegisterImmediate(x, kk),
            (0x7, _) => AddRegisterImmediate(x, kk),
            (0x8, 0x0) => LoadRegisterRegister(x, y),
            (0x8, 0x1) => OrRegisterRegister(x, y),
            (0x8, 0x2) => AndRegisterRegister(x, y),
            (0x8, 0x3) => XorRegisterRegister(x, y),
            (0x8, 0x4) => AddRegisterRegister(x, y),
            (0x8, 0x5) => SubRegisterRegister(x, y),
            (0x8, 0x6) => ShiftRightRegister(x),
            (0x8, 0x7) => SubRegisterRegisterNegated(x, y),
            (0x8, 0xE) => ShiftLeftRegister(x),
            (0x9, 0x0) => SkipIfNotEqualRegister(x, y),
            (0xA, _) => LoadIndex(nnn),
            (0xB, _) => JumpOffset(nnn),
            (0xC, _) => Random(x, kk),
            (0xD, _) => DrawSprite(x, y, n),
            (0xE, _) if kk == 0x9E => SkipIfKeyPressed(x),
            (0xE, _) if kk == 0xA1 => SkipIfKeyNotPressed(x),
            (0xF, _) => match kk {
                0x07 => LoadDelayTimer(x),
                0x0A => WaitForKey(x),
                0x15 => SetDelayTimer(x),
                0x18 => SetSoundTimer(x),
                0x1E => AddIndex(x),
                0x29 => LoadFontAddress(x),
                0x33 => StoreBcd(x),
                0x55 => StoreRegisters(x),
                0x65 => LoadRegisters(x),
                _ => return Err(unknown(opcode, address)),
            },
            _ => return Err(unknown(opcode, address)),
        };

        Ok(instruction)
    }
}

fn unknown(opcode: Opcode, address: u16) -> Error {
    Error::UnknownOpcode {
        opcode: opcode.raw(),
        address,
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Clear => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(nnn) => write!(f, "JP {:#05X}", nnn),
            Call(nnn) => write!(f, "CALL {:#05X}", nnn),
            SkipIfEqualImmediate(x, kk) => write!(f, "SE V{:X}, {:#04X}", x, kk),
            SkipIfNotEqualImmediate(x, kk) => write!(f, "SNE V{:X}, {:#04X}", x, kk),
            SkipIfEqualRegister(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadRegisterImmediate(x, kk) => write!(f, "LD V{:X}, {:#04X}", x, kk),
            AddRegisterImmediate(x, kk) => write!(f, "ADD V{:X}, {:#04X}", x, kk),
            LoadRegisterRegister(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            OrRegisterRegister(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            AndRegisterRegister(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            XorRegisterRegister(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddRegisterRegister(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            SubRegisterRegister(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRightRegister(x) => write!(f, "SHR V{:X}", x),
            SubRegisterRegisterNegated(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeftRegister(x) => write!(f, "SHL V{:X}", x),
            SkipIfNotEqualRegister(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex(nnn) => write!(f, "LD I, {:#05X}", nnn),
            JumpOffset(nnn) => write!(f, "JP V0, {:#05X}", nnn),
            Random(x, kk) => write!(f, "RND V{:X}, {:#04X}", x, kk),
            DrawSprite(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipIfKeyPressed(x) => write!(f, "SKP V{:X}", x),
            SkipIfKeyNotPressed(x) => write!(f, "SKNP V{:X}", x),
            LoadDelayTimer(x) => write!(f, "LD V{:X}, DT", x),
            WaitForKey(x) => write!(f, "LD V{:X}, K", x),
            SetDelayTimer(x) => write!(f, "LD DT, V{:X}", x),
            SetSoundTimer(x) => write!(f, "LD ST, V{:X}", x),
            AddIndex(x) => write!(f, "ADD I, V{:X}", x),
            LoadFontAddress(x) => write!(f, "LD F, V{:X}", x),
            StoreBcd(x) => write!(f, "LD B, V{:X}", x),
            StoreRegisters(x) => write!(f, "LD [I], V{:X}", x),
            LoadRegisters(x) => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
