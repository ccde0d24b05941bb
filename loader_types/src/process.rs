//! Process identity types

use serde::{Deserialize, Serialize};
use std::fmt;

/// 64-bit title identifier
///
/// Titles identify installed content; system modules, applications and the
/// homebrew stand-in process all carry one. On the wire a title id travels
/// as two 32-bit words, low word first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TitleId(u64);

impl TitleId {
    /// Creates a title ID from its raw 64-bit value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Reassembles a title ID from two command-buffer words
    pub const fn from_words(low: u32, high: u32) -> Self {
        Self((low as u64) | ((high as u64) << 32))
    }

    /// Returns the raw 64-bit value
    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Returns the low command-buffer word
    pub const fn low_word(&self) -> u32 {
        self.0 as u32
    }

    /// Returns the high command-buffer word
    pub const fn high_word(&self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Title({:#018x})", self.0)
    }
}

/// Fixed 8-byte process name
///
/// Shorter names are NUL-padded; an 8-byte name carries no terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessName([u8; 8]);

impl ProcessName {
    /// Creates a process name from its raw bytes
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Reassembles a process name from two command-buffer words
    pub const fn from_words(low: u32, high: u32) -> Self {
        let lo = low.to_le_bytes();
        let hi = high.to_le_bytes();
        Self([lo[0], lo[1], lo[2], lo[3], hi[0], hi[1], hi[2], hi[3]])
    }

    /// Returns the raw bytes
    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Display for ProcessName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(8);
        write!(f, "{}", String::from_utf8_lossy(&self.0[..end]))
    }
}
