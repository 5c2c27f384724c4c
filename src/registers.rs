use crate::{memory::START_ROM, Error, Result};

pub const STACK_SIZE: usize = 16;
pub const FLAG: usize = 0xF;

/// Mask for the 12 bits that address the 4 KiB of memory.
pub const ADDRESS_MASK: u16 = 0x0FFF;

#[derive(Debug)]
pub(crate) struct Registers {
    /// Chip-8 has 16 general purpose 8-bit registers, usually referred to as Vx, where x is a hexadecimal digit (0 through F).
    /// The VF register should not be used by any program, as it is used as a flag by some instructions.
    pub vx: [u8; 16],

    pub i: u16,
    /// The program counter (PC) should be 16-bit, and is used to store the currently executing address.
    pub pc: u16,
    /// The stack pointer (SP) counts the return addresses in use: the next free slot, so 16 means the stack is full.
    pub sp: u16,

    pub delay: u8,
    pub sound: u8,

    /// The stack is an array of 16 16-bit values, used to store the address that the interpreter shoud return to when finished with a subroutine. Chip-8 allows for up to 16 levels of nested subroutines.
    pub stack: [u16; STACK_SIZE],
}

impl Default for Registers {
    fn default() -> Self {
        Registers {
            vx: [0; 16],
            i: 0,
            pc: START_ROM as u16,
            sp: 0,
            delay: 0,
            sound: 0,
            stack: [0; STACK_SIZE],
        }
    }
}

impl Registers {
    /// Puts `address` on top of the stack. `origin` is the address of the call, used for reporting.
    pub fn push(&mut self, address: u16, origin: u16) -> Result<()> {
        let sp = self.sp as usize;

        if sp >= STACK_SIZE {
            return Err(Error::StackOverflow { address: origin });
        }

        self.stack[sp] = address;
        self.sp += 1;

        Ok(())
    }

    pub fn pop(&mut self, origin: u16) -> Result<u16> {
        if self.sp == 0 {
            return Err(Error::StackUnderflow { address: origin });
        }

        self.sp -= 1;

        Ok(self.stack[self.sp as usize])
    }

    pub fn set_flag(&mut self, value: bool) {
        self.vx[FLAG] = value as u8;
    }

    pub fn tick_timers(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }
}
