pub mod display;
mod error;
pub mod instruction;
pub mod interpreter;
pub mod keyboard;
mod memory;
mod registers;

pub use error::Error;
pub use memory::{FONT_START, MAX_ROM_SIZE, START_ROM};

pub type Result<T> = std::result::Result<T, Error>;
