//! # Loader Types
//!
//! This crate defines the fundamental types used throughout the HBX loader.
//!
//! ## Philosophy
//!
//! Loader types are designed with these principles:
//! - **Explicit over implicit**: paths, titles and versions are typed and
//!   cannot be confused with raw words.
//! - **Bounded by construction**: a [`TargetPath`] cannot exceed the
//!   platform path limit; invalid input is rejected at the boundary.
//! - **Deterministic**: every type compares and encodes the same way on
//!   both hardware variants and across firmware eras.
//!
//! ## Key Types
//!
//! - [`TargetPath`]: bounded, zero-terminated UTF-16 image path
//! - [`TitleId`]: 64-bit title identifier
//! - [`ProcessName`]: fixed 8-byte process name
//! - [`FirmwareVersion`] / [`HardwareVariant`]: system-capability queries
//! - [`SessionId`]: unique identifier for a loader session

pub mod ids;
pub mod path;
pub mod process;
pub mod system;

pub use ids::SessionId;
pub use path::{PathDecodeError, TargetPath, PATH_MAX};
pub use process::{ProcessName, TitleId};
pub use system::{FirmwareVersion, HardwareVariant};
