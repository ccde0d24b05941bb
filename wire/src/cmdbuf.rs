//! The request/response command buffer
//!
//! One fixed-size word buffer per session carries the request in and the
//! response out; the handler overwrites it in place. Word 0 is always the
//! header word.

use crate::{Header, ResultCode};

/// Number of words in a command buffer
pub const CMDBUF_WORDS: usize = 64;

/// Fixed-size request/response word buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBuffer {
    words: [u32; CMDBUF_WORDS],
}

impl CommandBuffer {
    /// Creates a zeroed buffer
    pub const fn new() -> Self {
        Self {
            words: [0; CMDBUF_WORDS],
        }
    }

    /// Creates a buffer with the given request header in word 0
    pub const fn request(header: Header) -> Self {
        let mut buffer = Self::new();
        buffer.words[0] = header.encode();
        buffer
    }

    /// Reads one word
    pub fn word(&self, index: usize) -> u32 {
        self.words[index]
    }

    /// Writes one word
    pub fn set_word(&mut self, index: usize, value: u32) {
        self.words[index] = value;
    }

    /// Decodes the header word
    pub fn header(&self) -> Header {
        Header::decode(self.words[0])
    }

    /// Replaces the header word
    pub fn set_header(&mut self, header: Header) {
        self.words[0] = header.encode();
    }

    /// Writes a failure response: header (0, 1, 0) plus the status word
    ///
    /// Failure responses deliberately report opcode 0 so a caller can
    /// never mistake them for a well-formed success shape.
    pub fn respond_error(&mut self, code: ResultCode) {
        self.set_header(Header::new(0, 1, 0));
        self.words[1] = code.raw();
    }

    /// Writes a status-only success response for the given opcode
    pub fn respond_status(&mut self, opcode: u16, code: ResultCode) {
        self.set_header(Header::new(opcode, 1, 0));
        self.words[1] = code.raw();
    }

    /// The response status word, valid after a handler has run
    pub fn status(&self) -> ResultCode {
        ResultCode::from_raw(self.words[1])
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result;

    #[test]
    fn test_request_sets_header() {
        let buffer = CommandBuffer::request(Header::new(2, 0, 2));
        assert_eq!(buffer.header(), Header::new(2, 0, 2));
        assert_eq!(buffer.word(1), 0);
    }

    #[test]
    fn test_respond_error_shape() {
        let mut buffer = CommandBuffer::request(Header::new(7, 3, 0));
        buffer.respond_error(result::UNKNOWN_COMMAND);
        assert_eq!(buffer.header(), Header::new(0, 1, 0));
        assert_eq!(buffer.status(), result::UNKNOWN_COMMAND);
    }

    #[test]
    fn test_respond_status_shape() {
        let mut buffer = CommandBuffer::request(Header::new(3, 0, 2));
        buffer.respond_status(3, ResultCode::SUCCESS);
        assert_eq!(buffer.header(), Header::new(3, 1, 0));
        assert!(buffer.status().is_success());
    }
}
