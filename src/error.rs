use std::path::PathBuf;

/// Everything that can make the interpreter reject a cycle or a ROM.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown opcode {opcode:#06X} at address {address:#05X}")]
    UnknownOpcode { opcode: u16, address: u16 },

    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("Unable to read ROM from {}", path.display())]
    RomUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stack overflow: call at address {address:#05X} exceeds 16 nested subroutines")]
    StackOverflow { address: u16 },

    #[error("Stack underflow: return at address {address:#05X} with an empty call stack")]
    StackUnderflow { address: u16 },

    #[error("Memory access out of bounds: {len} byte(s) at address {address:#06X}")]
    MemoryOutOfBounds { address: usize, len: usize },
}

impl Error {
    /// Stack and memory violations leave the machine in a state that can not be trusted anymore,
    /// decode and load errors can be recovered from by the caller.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::StackOverflow { .. } | Error::StackUnderflow { .. } | Error::MemoryOutOfBounds { .. }
        )
    }
}
