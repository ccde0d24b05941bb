//! The per-session argument buffer
//!
//! Arguments travel as one fixed-size block: a little-endian count word
//! followed by that many NUL-terminated UTF-8 strings packed back to
//! back. The loader never interprets the strings; it stores the block
//! for the spawned process to pick up.

/// Size of the argument block in bytes, count word included.
pub const ARGV_BUF_SIZE: usize = 0x200;

/// Fixed-size argument block owned by a loader session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentBuffer {
    bytes: [u8; ARGV_BUF_SIZE],
}

impl ArgumentBuffer {
    /// Creates an empty block with a zero count
    pub const fn new() -> Self {
        Self {
            bytes: [0; ARGV_BUF_SIZE],
        }
    }

    /// Replaces the block with a single argument
    ///
    /// Used when a load falls back to the default boot image. The
    /// argument is truncated to fit the block with its terminator.
    pub fn reset_single(&mut self, argument: &str) {
        self.bytes = [0; ARGV_BUF_SIZE];
        self.bytes[..4].copy_from_slice(&1u32.to_le_bytes());
        let room = ARGV_BUF_SIZE - 4 - 1;
        let data = argument.as_bytes();
        let len = data.len().min(room);
        self.bytes[4..4 + len].copy_from_slice(&data[..len]);
    }

    /// Replaces the block with caller-supplied bytes
    ///
    /// Shorter input leaves the tail zeroed; longer input is truncated to
    /// the block size.
    pub fn fill_from(&mut self, bytes: &[u8]) {
        self.bytes = [0; ARGV_BUF_SIZE];
        let len = bytes.len().min(ARGV_BUF_SIZE);
        self.bytes[..len].copy_from_slice(&bytes[..len]);
    }

    /// The declared argument count
    pub fn argument_count(&self) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.bytes[..4]);
        u32::from_le_bytes(raw)
    }

    /// The `index`-th argument, if the block holds that many
    pub fn argument(&self, index: u32) -> Option<&str> {
        if index >= self.argument_count() {
            return None;
        }
        let mut offset = 4;
        for _ in 0..index {
            let end = self.bytes[offset..].iter().position(|&b| b == 0)?;
            offset += end + 1;
            if offset >= ARGV_BUF_SIZE {
                return None;
            }
        }
        let end = self.bytes[offset..].iter().position(|&b| b == 0)?;
        std::str::from_utf8(&self.bytes[offset..offset + end]).ok()
    }

    /// The raw block
    pub fn as_bytes(&self) -> &[u8; ARGV_BUF_SIZE] {
        &self.bytes
    }
}

impl Default for ArgumentBuffer {
    fn default() -> Self {
        Self::new()
    }
}
