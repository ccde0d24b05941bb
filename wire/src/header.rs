//! Request/response header word packing
//!
//! The first word of every command buffer encodes the opcode in the top
//! 16 bits and two 6-bit parameter counts below: the number of normal
//! parameter words, then the number of translate-parameter words
//! (descriptors plus their payloads).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Decoded header word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Header {
    /// Command opcode
    pub opcode: u16,
    /// Number of normal parameter words following the header
    pub normal: u8,
    /// Number of translate parameter words following the normal ones
    pub translate: u8,
}

impl Header {
    /// Creates a header; counts above 63 do not fit the wire format
    pub const fn new(opcode: u16, normal: u8, translate: u8) -> Self {
        Self {
            opcode,
            normal,
            translate,
        }
    }

    /// Packs the header into its wire word
    pub const fn encode(self) -> u32 {
        ((self.opcode as u32) << 16) | (((self.normal as u32) & 0x3F) << 6) | ((self.translate as u32) & 0x3F)
    }

    /// Unpacks a wire word
    pub const fn decode(word: u32) -> Self {
        Self {
            opcode: (word >> 16) as u16,
            normal: ((word >> 6) & 0x3F) as u8,
            translate: (word & 0x3F) as u8,
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Header(op={:#06x}, normal={}, translate={})",
            self.opcode, self.normal, self.translate
        )
    }
}
