use std::{
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use log::{debug, error, trace, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    display::Display,
    instruction::{Instruction, Opcode},
    keyboard::Keyboard,
    memory::Memory,
    registers::{Registers, ADDRESS_MASK},
    Error, Result,
};

pub struct Interpreter {
    registers: Registers,
    memory: Memory,
    display: Display,
    keyboard: Keyboard,
    rng: ChaCha8Rng,
}

impl Interpreter {
    /// Creates a machine with the font installed and no program, seeding `Cxkk` from the clock.
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();

        Self::with_seed(seed)
    }

    pub fn with_seed(seed: u64) -> Self {
        Interpreter {
            registers: Registers::default(),
            memory: Memory::new(),
            display: Display::new(),
            keyboard: Keyboard::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn with_rom(bytes: &[u8]) -> Result<Self> {
        let mut interpreter = Self::new();
        interpreter.load(bytes)?;

        Ok(interpreter)
    }

    /// Installs a program image at `0x200`.
    pub fn load(&mut self, bytes: &[u8]) -> Result<()> {
        self.memory.load_rom(bytes)
    }

    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();

        let bytes = std::fs::read(path).map_err(|source| Error::RomUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read ROM {}", path.display());

        self.load(&bytes)
    }

    /// Back to the state right after construction: registers, screen, keys and all of memory
    /// are restored, the font included. The random number generator keeps its state.
    pub fn reset(&mut self) {
        self.registers = Registers::default();
        self.memory = Memory::new();
        self.display.clear();
        self.keyboard.clear();

        debug!("Machine reset");
    }

    /// Runs one fetch-decode-execute cycle followed by one timer decay.
    ///
    /// A failing cycle is rejected as a whole: the program counter keeps pointing at the
    /// offending instruction and the timers are left alone.
    pub fn step(&mut self) -> Result<()> {
        let pc = self.registers.pc;

        if let Err(e) = self.cycle(pc) {
            self.registers.pc = pc;

            if e.is_fatal() {
                error!("Cycle at {:#05X} failed: {}", pc, e);
            } else {
                warn!("Cycle at {:#05X} rejected: {}", pc, e);
            }

            return Err(e);
        }

        self.registers.tick_timers();

        Ok(())
    }

    fn cycle(&mut self, pc: u16) -> Result<()> {
        let opcode = Opcode(self.memory.read_word(pc as usize)?);
        let instruction = Instruction::decode(opcode, pc)?;

        trace!("{:#05X}: {:04X} {}", pc, opcode.raw(), instruction);

        self.registers.pc = pc + 2;

        self.execute(instruction, pc)
    }

    fn execute(&mut self, instruction: Instruction, pc: u16) -> Result<()> {
        use Instruction::*;

        match instruction {
            Clear => self.handle_clear(),
            Return => self.handle_ret(pc)?,
            Jump(n) => self.handle_jump(n),
            Call(n) => self.handle_call(n, pc)?,
            SkipIfEqualImmediate(x, k) => self.handle_skip_if_equal_immediate(x, k),
            SkipIfNotEqualImmediate(x, k) => self.handle_skip_if_not_equal_immediate(x, k),
            SkipIfEqualRegister(x, y) => self.handle_skip_if_equal_register(x, y),
            LoadRegisterImmediate(x, k) => self.handle_load_register_immediate(x, k),
            AddRegisterImmediate(x, k) => self.handle_add_register_immediate(x, k),
            LoadRegisterRegister(x, y) => self.handle_load_register_register(x, y),
            OrRegisterRegister(x, y) => self.handle_or_register_register(x, y),
            AndRegisterRegister(x, y) => self.handle_and_register_register(x, y),
            XorRegisterRegister(x, y) => self.handle_xor_register_register(x, y),
            AddRegisterRegister(x, y) => self.handle_add_register_register(x, y),
            SubRegisterRegister(x, y) => self.handle_sub_register_register(x, y),
            ShiftRightRegister(x) => self.handle_shift_right_register_one(x),
            SubRegisterRegisterNegated(x, y) => self.handle_sub_register_register_negated(x, y),
            ShiftLeftRegister(x) => self.handle_shift_left_register_one(x),
            SkipIfNotEqualRegister(x, y) => self.handle_skip_if_not_equal_register(x, y),
            LoadIndex(n) => self.handle_load_immediate(n),
            JumpOffset(n) => self.handle_jump_offset(n),
            Random(x, k) => self.handle_random(x, k),
            DrawSprite(x, y, n) => self.handle_draw_sprite(x, y, n)?,
            SkipIfKeyPressed(x) => self.handle_skip_if_key_pressed(x),
            SkipIfKeyNotPressed(x) => self.handle_skip_if_key_not_pressed(x),
            LoadDelayTimer(x) => self.handle_load_delay_timer(x),
            WaitForKey(x) => self.handle_wait_for_key(x),
            SetDelayTimer(x) => self.handle_set_delay_timer(x),
            SetSoundTimer(x) => self.handle_set_sound_timer(x),
            AddIndex(x) => self.handle_add_index(x),
            LoadFontAddress(x) => self.handle_load_font_address(x),
            StoreBcd(x) => self.handle_store_bcd(x)?,
            StoreRegisters(x) => self.handle_store_registers(x)?,
            LoadRegisters(x) => self.handle_load_registers(x)?,
        }

        Ok(())
    }

    /// 00E0 - CLS
    /// Clear the display.
    fn handle_clear(&mut self) {
        self.display.clear();
    }

    /// 00EE - RET
    /// Return from a subroutine.
    ///
    /// The interpreter sets the program counter to the address at the top of the stack, then subtracts 1 from the stack pointer.
    fn handle_ret(&mut self, pc: u16) -> Result<()> {
        self.registers.pc = self.registers.pop(pc)?;

        Ok(())
    }

    /// 1nnn - JP addr
    /// Jump to location nnn.
    ///
    /// The interpreter sets the program counter to nnn.
    fn handle_jump(&mut self, n: u16) {
        self.registers.pc = n;
    }

    /// 2nnn - CALL addr
    /// Call subroutine at nnn.
    ///
    /// The interpreter increments the stack pointer, then puts the current PC on the top of the stack. The PC is then set to nnn.
    fn handle_call(&mut self, n: u16, pc: u16) -> Result<()> {
        self.registers.push(self.registers.pc, pc)?;
        self.registers.pc = n;

        Ok(())
    }

    /// 3xkk - SE Vx, byte
    /// Skip next instruction if Vx = kk.
    ///
    /// The interpreter compares register Vx to kk, and if they are equal, increments the program counter by 2.
    fn handle_skip_if_equal_immediate(&mut self, x: usize, k: u8) {
        if self.registers.vx[x] == k {
            self.registers.pc += 2;
        }
    }

    /// 4xkk - SNE Vx, byte
    /// Skip next instruction if Vx != kk.
    ///
    /// The interpreter compares register Vx to kk, and if they are not equal, increments the program counter by 2.
    fn handle_skip_if_not_equal_immediate(&mut self, x: usize, k: u8) {
        if self.registers.vx[x] != k {
            self.registers.pc += 2;
        }
    }

    /// 5xy0 - SE Vx, Vy
    /// Skip next instruction if Vx = Vy.
    ///
    /// The interpreter compares register Vx to register Vy, and if they are equal, increments the program counter by 2.
    fn handle_skip_if_equal_register(&mut self, x: usize, y: usize) {
        if self.registers.vx[x] == self.registers.vx[y] {
            self.registers.pc += 2;
        }
    }

    /// 6xkk - LD Vx, byte
    /// Set Vx = kk.
    fn handle_load_register_immediate(&mut self, x: usize, k: u8) {
        self.registers.vx[x] = k;
    }

    /// 7xkk - ADD Vx, byte
    /// Set Vx = Vx + kk. VF is left alone.
    fn handle_add_register_immediate(&mut self, x: usize, k: u8) {
        let result = self.registers.vx[x].wrapping_add(k);
        self.registers.vx[x] = result;
    }

    /// 8xy0 - LD Vx, Vy
    fn handle_load_register_register(&mut self, x: usize, y: usize) {
        self.registers.vx[x] = self.registers.vx[y];
    }

    /// 8xy1 - OR Vx, Vy
    fn handle_or_register_register(&mut self, x: usize, y: usize) {
        self.registers.vx[x] |= self.registers.vx[y];
    }

    /// 8xy2 - AND Vx, Vy
    fn handle_and_register_register(&mut self, x: usize, y: usize) {
        self.registers.vx[x] &= self.registers.vx[y];
    }

    /// 8xy3 - XOR Vx, Vy
    fn handle_xor_register_register(&mut self, x: usize, y: usize) {
        self.registers.vx[x] ^= self.registers.vx[y];
    }

    /// 8xy4 - ADD Vx, Vy
    /// Set Vx = Vx + Vy, set VF = carry.
    ///
    /// The values of Vx and Vy are added together. If the result is greater than 8 bits
    /// (i.e., > 255,) VF is set to 1, otherwise 0. Only the lowest 8 bits of the result are kept, and stored in Vx.
    fn handle_add_register_register(&mut self, x: usize, y: usize) {
        let a = self.registers.vx[x];
        let b = self.registers.vx[y];

        let (result, overflow) = a.overflowing_add(b);
        self.registers.vx[x] = result;

        self.registers.set_flag(overflow);
    }

    /// 8xy5 - SUB Vx, Vy
    /// Set Vx = Vx - Vy, set VF = NOT borrow.
    ///
    /// If Vx > Vy, then VF is set to 1, otherwise 0. Then Vy is subtracted from Vx, and the results stored in Vx.
    fn handle_sub_register_register(&mut self, x: usize, y: usize) {
        let a = self.registers.vx[x];
        let b = self.registers.vx[y];

        self.registers.vx[x] = a.wrapping_sub(b);

        self.registers.set_flag(a > b);
    }

    /// 8xy6 - SHR Vx {, Vy}
    /// Set Vx = Vx SHR 1.
    ///
    /// If the least-significant bit of Vx is 1, then VF is set to 1, otherwise 0. Then Vx is divided by 2.
    fn handle_shift_right_register_one(&mut self, x: usize) {
        let a = self.registers.vx[x];

        self.registers.vx[x] = a >> 1;

        self.registers.set_flag(a & 0b0000_0001 != 0);
    }

    /// 8xy7 - SUBN Vx, Vy
    /// Set Vx = Vy - Vx, set VF = NOT borrow.
    ///
    /// If Vy > Vx, then VF is set to 1, otherwise 0. Then Vx is subtracted from Vy, and the results stored in Vx.
    fn handle_sub_register_register_negated(&mut self, x: usize, y: usize) {
        let a = self.registers.vx[x];
        let b = self.registers.vx[y];

        self.registers.vx[x] = b.wrapping_sub(a);

        self.registers.set_flag(b > a);
    }

    /// 8xyE - SHL Vx {, Vy}
    /// Set Vx = Vx SHL 1.
    ///
    /// If the most-significant bit of Vx is 1, then VF is set to 1, otherwise to 0. Then Vx is multiplied by 2.
    fn handle_shift_left_register_one(&mut self, x: usize) {
        let a = self.registers.vx[x];

        self.registers.vx[x] = a << 1;

        self.registers.set_flag(a & 0b1000_0000 != 0);
    }

    /// 9xy0 - SNE Vx, Vy
    /// Skip next instruction if Vx != Vy.
    fn handle_skip_if_not_equal_register(&mut self, x: usize, y: usize) {
        if self.registers.vx[x] != self.registers.vx[y] {
            self.registers.pc += 2;
        }
    }

    /// Annn - LD I, addr
    /// Set I = nnn.
    fn handle_load_immediate(&mut self, n: u16) {
        self.registers.i = n;
    }

    /// Bnnn - JP V0, addr
    /// Jump to location nnn + V0, kept within the 12-bit address space.
    fn handle_jump_offset(&mut self, n: u16) {
        self.registers.pc = (n + self.registers.vx[0] as u16) & ADDRESS_MASK;
    }

    /// Cxkk - RND Vx, byte
    /// Set Vx = random byte AND kk.
    fn handle_random(&mut self, x: usize, k: u8) {
        let value: u8 = self.rng.gen();
        self.registers.vx[x] = value & k;
    }

    /// Dxyn - DRW Vx, Vy, nibble
    /// Display n-byte sprite starting at memory location I at (Vx, Vy), set VF = collision.
    ///
    /// The interpreter reads n bytes from memory, starting at the address stored in I. These bytes
    /// are then displayed as sprites on screen at coordinates (Vx, Vy). Sprites are XORed onto the
    /// existing screen. If this causes any pixels to be erased, VF is set to 1, otherwise it is set
    /// to 0. The origin wraps around the screen, whatever sticks out past the right or bottom edge is clipped.
    fn handle_draw_sprite(&mut self, x: usize, y: usize, n: u8) -> Result<()> {
        let rows = self.memory.read_slice(self.registers.i as usize, n as usize)?;

        let was_cleared = self.display.draw_sprite(self.registers.vx[x], self.registers.vx[y], rows);

        self.registers.set_flag(was_cleared);

        Ok(())
    }

    /// Ex9E - SKP Vx
    /// Skip next instruction if key with the value of Vx is pressed.
    fn handle_skip_if_key_pressed(&mut self, x: usize) {
        if self.keyboard.is_pressed(self.registers.vx[x]) {
            self.registers.pc += 2;
        }
    }

    /// ExA1 - SKNP Vx
    /// Skip next instruction if key with the value of Vx is not pressed.
    fn handle_skip_if_key_not_pressed(&mut self, x: usize) {
        if !self.keyboard.is_pressed(self.registers.vx[x]) {
            self.registers.pc += 2;
        }
    }

    /// Fx07 - LD Vx, DT
    fn handle_load_delay_timer(&mut self, x: usize) {
        self.registers.vx[x] = self.registers.delay;
    }

    /// Fx0A - LD Vx, K
    /// Wait for a key press, store the value of the key in Vx.
    ///
    /// Waiting does not block: without a pressed key the program counter is moved back
    /// onto this instruction, so it is fetched again on the next cycle.
    fn handle_wait_for_key(&mut self, x: usize) {
        match self.keyboard.first_pressed() {
            Some(key) => self.registers.vx[x] = key,
            None => self.registers.pc -= 2,
        }
    }

    /// Fx15 - LD DT, Vx
    fn handle_set_delay_timer(&mut self, x: usize) {
        self.registers.delay = self.registers.vx[x];
    }

    /// Fx18 - LD ST, Vx
    fn handle_set_sound_timer(&mut self, x: usize) {
        self.registers.sound = self.registers.vx[x];
    }

    /// Fx1E - ADD I, Vx
    /// Set I = I + Vx, kept within the 12-bit address space.
    fn handle_add_index(&mut self, x: usize) {
        self.registers.i = (self.registers.i + self.registers.vx[x] as u16) & ADDRESS_MASK;
    }

    /// Fx29 - LD F, Vx
    /// Set I = location of sprite for digit Vx.
    fn handle_load_font_address(&mut self, x: usize) {
        self.registers.i = Memory::font_address(self.registers.vx[x]);
    }

    /// Fx33 - LD B, Vx
    /// Store BCD representation of Vx in memory locations I, I+1, and I+2.
    ///
    /// The interpreter takes the decimal value of Vx, and places the hundreds digit in memory at location in I,
    /// the tens digit at location I+1, and the ones digit at location I+2.
    fn handle_store_bcd(&mut self, x: usize) -> Result<()> {
        let value = self.registers.vx[x];
        let digits = [value / 100, value / 10 % 10, value % 10];

        self.memory.write_slice(self.registers.i as usize, &digits)
    }

    /// Fx55 - LD [I], Vx
    /// Store registers V0 through Vx in memory starting at location I. I itself is not changed.
    fn handle_store_registers(&mut self, x: usize) -> Result<()> {
        self.memory
            .write_slice(self.registers.i as usize, &self.registers.vx[..=x])
    }

    /// Fx65 - LD Vx, [I]
    /// Read registers V0 through Vx from memory starting at location I. I itself is not changed.
    fn handle_load_registers(&mut self, x: usize) -> Result<()> {
        let bytes = self.memory.read_slice(self.registers.i as usize, x + 1)?;
        self.registers.vx[..=x].copy_from_slice(bytes);

        Ok(())
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    pub fn pc(&self) -> u16 {
        self.registers.pc
    }

    pub fn index(&self) -> u16 {
        self.registers.i
    }

    pub fn register(&self, x: usize) -> u8 {
        self.registers.vx[x & 0xF]
    }

    pub fn delay_timer(&self) -> u8 {
        self.registers.delay
    }

    /// Non-zero while a tone should be playing.
    pub fn sound_timer(&self) -> u8 {
        self.registers.sound
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory.0
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
