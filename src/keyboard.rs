use std::fmt::{self, Display};

pub const KEY_COUNT: usize = 16;

/// The hexadecimal keypad, `0x0` through `0xF`. Key indices are masked to their low nibble.
pub struct Keyboard {
    pressed_keys: [bool; KEY_COUNT],
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            pressed_keys: [false; KEY_COUNT],
        }
    }

    pub fn is_pressed(&self, key: u8) -> bool {
        self.pressed_keys[(key & 0xF) as usize]
    }

    pub fn press_key(&mut self, key: u8) {
        self.set_key(key, true)
    }

    pub fn release_key(&mut self, key: u8) {
        self.set_key(key, false)
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.pressed_keys[(key & 0xF) as usize] = pressed;
    }

    pub fn clear(&mut self) {
        for key in self.pressed_keys.iter_mut() {
            *key = false;
        }
    }

    /// The lowest-indexed key that is currently held down.
    pub fn first_pressed(&self) -> Option<u8> {
        self.pressed_keys.iter().position(|k| *k).map(|k| k as u8)
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Keyboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pressed_keys.map(|k| if k { "o" } else { " " }).join(""))
    }
}
