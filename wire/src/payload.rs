//! Out-of-band request payloads
//!
//! Descriptor words in the command buffer declare buffers that do not
//! travel inside the word buffer itself; the transport delivers their
//! contents alongside the request. The dispatcher must check that the
//! delivered payload kind agrees with the descriptor words before use.

/// Buffer contents delivered with one request
#[derive(Debug)]
pub enum RequestPayload<'a> {
    /// No out-of-band buffer accompanies this request
    None,
    /// Contents of a session static-buffer slot, read-only to the handler
    StaticBuffer {
        /// The static-buffer slot the transport filled
        slot: u8,
        /// The delivered bytes, truncated to the descriptor's size
        bytes: &'a [u8],
    },
    /// A caller-owned buffer mapped read/write for in-place rewriting
    ReadWrite(&'a mut [u8]),
}

impl RequestPayload<'_> {
    /// Returns true when no buffer accompanies the request
    pub fn is_none(&self) -> bool {
        matches!(self, RequestPayload::None)
    }
}
