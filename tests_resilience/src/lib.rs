//! Resilience Test Utilities
//!
//! This crate provides shared utilities for resilience and integration tests.
//!
//! ## Test Philosophy
//!
//! - **No handle leaks**: a failed load must release every file and region
//!   it acquired, at every possible failure point
//! - **Deterministic failures**: all faults are reproducible via FaultPolicy
//!   and a seeded generator
//! - **Well-formed responses**: the command buffer always leaves a handler
//!   holding either a success shape or the opcode-0 error shape

use wire::{CommandBuffer, Header};

/// Small deterministic generator for randomized trials
///
/// Plain xorshift32; trials that fail reproduce exactly from the seed
/// printed in the assertion message.
#[derive(Debug, Clone)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Creates a generator from a non-zero seed
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0xBAD_5EED } else { seed },
        }
    }

    /// Next raw value
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform-ish pick in `0..bound`
    pub fn pick(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound
    }

    /// True roughly once per `denominator` calls
    pub fn one_in(&mut self, denominator: u32) -> bool {
        self.pick(denominator) == 0
    }
}

/// Builds a well-formed load command for the given base address
pub fn load_command(base_address: u32) -> CommandBuffer {
    let mut cmdbuf = CommandBuffer::request(Header::new(1, 6, 0));
    cmdbuf.set_word(1, base_address);
    cmdbuf.set_word(2, 0x100);
    cmdbuf.set_word(3, 0x0000_1E00);
    cmdbuf.set_word(4, 0x0004_0000);
    cmdbuf.set_word(5, u32::from_le_bytes(*b"hbx_"));
    cmdbuf.set_word(6, u32::from_le_bytes(*b"app\0"));
    cmdbuf
}
