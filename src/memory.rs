use log::debug;

use crate::{Error, Result};

pub const MEMORY_SIZE: usize = 4096;
pub const START_ROM: usize = 0x200;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - START_ROM;
pub const FONT_START: usize = 0x050;
pub const FONT_GLYPH_SIZE: usize = 5;

const FONT_DATA: &'static [u8] = &[
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

/// The 4 KiB address space. `0x000..0x200` belongs to the interpreter and holds the font,
/// programs are loaded at `0x200`.
#[derive(Debug)]
pub(crate) struct Memory(pub [u8; MEMORY_SIZE]);

impl Memory {
    pub fn new() -> Self {
        let mut memory = Memory([0; MEMORY_SIZE]);
        memory.0[FONT_START..FONT_START + FONT_DATA.len()].copy_from_slice(FONT_DATA);

        memory
    }

    /// Copies `bytes` verbatim to `START_ROM`. Nothing is written if the image does not fit.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<()> {
        let rom_size = bytes.len();

        if rom_size > MAX_ROM_SIZE {
            return Err(Error::RomTooLarge {
                size: rom_size,
                max_size: MAX_ROM_SIZE,
            });
        }

        self.0[START_ROM..START_ROM + rom_size].copy_from_slice(bytes);
        debug!("Loaded {} byte ROM at {:#05X}", rom_size, START_ROM);

        Ok(())
    }

    /// Reads a big-endian word, as instructions are stored.
    pub fn read_word(&self, address: usize) -> Result<u16> {
        self.check_range(address, 2)?;
        Ok(u16::from_be_bytes([self.0[address], self.0[address + 1]]))
    }

    pub fn read_slice(&self, address: usize, len: usize) -> Result<&[u8]> {
        self.check_range(address, len)?;
        Ok(&self.0[address..address + len])
    }

    pub fn write_slice(&mut self, address: usize, bytes: &[u8]) -> Result<()> {
        self.check_range(address, bytes.len())?;
        self.0[address..address + bytes.len()].copy_from_slice(bytes);

        Ok(())
    }

    /// Address of the built-in glyph for the low nibble of `digit`.
    pub fn font_address(digit: u8) -> u16 {
        (FONT_START + FONT_GLYPH_SIZE * (digit & 0xF) as usize) as u16
    }

    fn check_range(&self, address: usize, len: usize) -> Result<()> {
        if address + len > MEMORY_SIZE {
            return Err(Error::MemoryOutOfBounds { address, len });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim::{assert_matches, assert_ok};
    use fake::{Dummy, Fake, Faker};
    use quickcheck_macros::quickcheck;
    use rand::{rngs::StdRng, SeedableRng};

    #[derive(Debug, Clone, Dummy)]
    struct RomFixture {
        #[dummy(faker = "(Faker, 1..3584)")]
        bytes: Vec<u8>,
    }

    impl quickcheck::Arbitrary for RomFixture {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            let mut rng = StdRng::seed_from_u64(u64::arbitrary(g));

            Faker.fake_with_rng(&mut rng)
        }
    }

    #[quickcheck]
    fn test_load_rom(rom: RomFixture) {
        let num_bytes = rom.bytes.len();

        let mut memory = Memory::new();
        assert_ok!(memory.load_rom(&rom.bytes));

        assert_eq!(memory.0[START_ROM..START_ROM + num_bytes], rom.bytes);
    }

    #[quickcheck]
    fn test_load_rom_leaves_rest_untouched(rom: RomFixture) {
        let num_bytes = rom.bytes.len();
        let pristine = Memory::new();

        let mut memory = Memory::new();
        assert_ok!(memory.load_rom(&rom.bytes));

        assert_eq!(memory.0[..START_ROM], pristine.0[..START_ROM]);
        assert_eq!(memory.0[START_ROM + num_bytes..], pristine.0[START_ROM + num_bytes..]);
    }

    #[test]
    fn test_font_installed() {
        let memory = Memory::new();

        assert_eq!(memory.0[FONT_START..FONT_START + FONT_DATA.len()], *FONT_DATA);
        assert!(memory.0[..FONT_START].iter().all(|b| *b == 0));
        assert!(memory.0[FONT_START + FONT_DATA.len()..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_load_rom_max_size() {
        let mut memory = Memory::new();

        assert_ok!(memory.load_rom(&[0xAB; MAX_ROM_SIZE]));
        assert_eq!(memory.0[MEMORY_SIZE - 1], 0xAB);
    }

    #[test]
    fn test_load_rom_too_large() {
        let mut memory = Memory::new();

        let result = memory.load_rom(&[0xAB; MAX_ROM_SIZE + 1]);

        assert_matches!(result, Err(Error::RomTooLarge { size: 3585, max_size: 3584 }));
        assert!(memory.0[START_ROM..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_read_word_is_big_endian() {
        let mut memory = Memory::new();
        assert_ok!(memory.load_rom(&[0x12, 0x34]));

        assert_eq!(memory.read_word(START_ROM).unwrap(), 0x1234);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut memory = Memory::new();

        assert_matches!(memory.read_slice(0x1000, 1), Err(Error::MemoryOutOfBounds { address: 0x1000, len: 1 }));
        assert_matches!(memory.read_word(0xFFF), Err(Error::MemoryOutOfBounds { address: 0xFFF, len: 2 }));
        assert_matches!(memory.read_slice(0xFFE, 3), Err(Error::MemoryOutOfBounds { .. }));
        assert_matches!(memory.write_slice(0xFFE, &[1, 2, 3]), Err(Error::MemoryOutOfBounds { .. }));

        assert_eq!(memory.0[0xFFE..], [0, 0]);
        assert_ok!(memory.write_slice(0xFFE, &[1, 2]));
        assert_eq!(memory.read_slice(0xFFF, 1).unwrap(), [2]);
    }

    #[test]
    fn test_font_address() {
        assert_eq!(Memory::font_address(0x0), 0x050);
        assert_eq!(Memory::font_address(0xA), 0x050 + 5 * 10);
        assert_eq!(Memory::font_address(0x1F), 0x050 + 5 * 0xF);
    }
}
