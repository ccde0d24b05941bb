//! Translate-parameter descriptor words
//!
//! Buffers and handles are never passed as raw words; each is introduced
//! by a descriptor word declaring its kind, size and access rights. The
//! dispatcher checks the descriptor before trusting anything after it.

use serde::{Deserialize, Serialize};

/// Mask selecting the slot and tag bits of a static-buffer descriptor,
/// ignoring the size bits above them.
pub const STATIC_DESC_MASK: u32 = 0x3FFF;

/// Access rights carried by a read/write buffer descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum BufferRights {
    /// Caller grants read access
    Read = 0x2,
    /// Caller grants write access
    Write = 0x4,
    /// Caller grants both
    ReadWrite = 0x6,
}

/// Builds a static-buffer receive descriptor for the given session slot
///
/// Layout: size in bits 14 and up, slot index in bits 10-13, tag `0x2`.
pub const fn static_buffer(size: usize, slot: u8) -> u32 {
    ((size as u32) << 14) | static_buffer_tag(slot)
}

/// The slot-and-tag portion of a static-buffer descriptor
///
/// This is what request validation compares against after masking with
/// [`STATIC_DESC_MASK`]; the size bits are caller-chosen.
pub const fn static_buffer_tag(slot: u8) -> u32 {
    ((slot as u32) << 10) | 0x2
}

/// Builds a mapped-buffer descriptor of exact size with the given rights
///
/// Layout: size in bits 4 and up, tag `0x8`, rights in the low bits.
pub const fn rw_buffer(size: usize, rights: BufferRights) -> u32 {
    ((size as u32) << 4) | 0x8 | rights as u32
}

/// Builds a moved-handles descriptor for `count` handles
///
/// Moving a handle transfers ownership to the receiving process.
pub const fn moved_handles(count: u32) -> u32 {
    ((count - 1) << 26) | 0x10
}
