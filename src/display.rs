use std::fmt;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// The original implementation of the Chip-8 language used a 64x32-pixel monochrome display with this format:
/// ( 0, 0)   (63, 0)
/// ( 0,31)   (63,31)
///
/// Coordinates passed to `pixel` and `xor_pixel` wrap around the screen, so `(64, 0)` is `(0, 0)`.
pub struct Display([bool; DISPLAY_WIDTH * DISPLAY_HEIGHT]);

impl Display {
    pub fn new() -> Self {
        Display([false; DISPLAY_WIDTH * DISPLAY_HEIGHT])
    }

    pub fn clear(&mut self) {
        for i in &mut self.0 {
            *i = false
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.0[self.compute_idx(x, y)]
    }

    /// Xors the pixel at position (`x`, `y`) and returns `true`
    /// if the pixel was cleared.
    pub fn xor_pixel(&mut self, x: usize, y: usize, value: bool) -> bool {
        let idx = self.compute_idx(x, y);
        let last_value = self.0[idx];
        let new_value = last_value ^ value;
        self.0[idx] = new_value;

        last_value && !new_value
    }

    /// Xors a sprite onto the screen and returns `true` if any pixel was cleared.
    ///
    /// Each byte of `rows` is one line of 8 pixels, most significant bit leftmost. The origin
    /// wraps around the screen, the rest of the sprite is clipped at the right and bottom edges.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let origin_x = x as usize % self.width();
        let origin_y = y as usize % self.height();

        let mut was_cleared = false;

        for (offset, sprite) in rows.iter().enumerate() {
            let row = origin_y + offset;
            if row >= self.height() {
                break;
            }

            let mut mask = 0b1000_0000;

            for col in origin_x..(origin_x + 8).min(self.width()) {
                if sprite & mask > 0 && self.xor_pixel(col, row, true) {
                    was_cleared = true;
                }

                mask >>= 1;
            }
        }

        was_cleared
    }

    fn compute_idx(&self, x: usize, y: usize) -> usize {
        (y % self.height()) * self.width() + x % self.width()
    }

    pub fn pixels(&self) -> &[bool] {
        &self.0
    }

    pub fn width(&self) -> usize {
        DISPLAY_WIDTH
    }

    pub fn height(&self) -> usize {
        DISPLAY_HEIGHT
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.0.chunks(self.width()) {
            let line: String = row.iter().map(|p| if *p { '█' } else { ' ' }).collect();
            writeln!(f, "{}", line.trim_end())?;
        }

        Ok(())
    }
}
