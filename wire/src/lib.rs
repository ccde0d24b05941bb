//! # Wire Protocol
//!
//! This crate implements the word-oriented IPC protocol spoken between the
//! process loader and the HBX loader service.
//!
//! ## Philosophy
//!
//! The protocol is a fixed binary contract, not a serialization format.
//! Every request starts with a header word whose exact shape is checked
//! against a per-opcode constant before any parameter is read; buffers and
//! handles travel as typed descriptor words, never as bare integers.
//!
//! ## Key Types
//!
//! - [`Header`]: opcode + parameter-count word packing
//! - [`CommandBuffer`]: the request/response word buffer
//! - [`RequestPayload`]: out-of-band buffer contents delivered with a request
//! - [`ResultCode`]: packed status word returned to the caller

pub mod cmdbuf;
pub mod descriptor;
pub mod header;
pub mod payload;
pub mod result;

pub use cmdbuf::{CommandBuffer, CMDBUF_WORDS};
pub use descriptor::{
    moved_handles, rw_buffer, static_buffer, static_buffer_tag, BufferRights, STATIC_DESC_MASK,
};
pub use header::Header;
pub use payload::RequestPayload;
pub use result::{Level, Module, ResultCode, Summary};
