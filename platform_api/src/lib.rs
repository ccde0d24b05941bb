//! # Platform API
//!
//! This crate defines the interface between the loader service and the
//! operating system it runs on.
//!
//! ## Philosophy
//!
//! The platform provides **mechanisms**, not policies:
//! - Image access (open, size, close)
//! - Memory regions (map, unmap)
//! - Codeset creation (the object the process manager spawns from)
//! - System queries (firmware version, hardware variant)
//!
//! The loader owns all policy: which path to open, where to map, what
//! privileges to stamp into the extended header. Everything the loader
//! does to the outside world goes through [`LoaderPlatform`], so the whole
//! service can be driven against a simulated platform in tests.

pub mod error;
pub mod platform;

pub use error::PlatformError;
pub use platform::{CodesetHandle, CodesetRequest, FileHandle, LoaderPlatform, RegionHandle};
