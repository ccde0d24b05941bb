//! # HBX Loader Service
//!
//! This crate implements the service that turns HBX homebrew images into
//! runnable processes.
//!
//! ## Philosophy
//!
//! The service is a thin, auditable dispatcher over four commands:
//! select a target image, store an argument block, stage the image into
//! a codeset, and rewrite an extended header so the spawned process gets
//! the privileges it needs. All policy (default boot image, staging
//! address, privilege templates) is baked-in constant data; all
//! mechanism lives behind [`platform_api::LoaderPlatform`], so the whole
//! service runs unchanged against the simulated platform in tests.
//!
//! ## Key Types
//!
//! - [`LoaderService`]: per-session state and command dispatch
//! - [`ArgumentBuffer`]: the packed argument block
//! - [`EventLog`]: structured record of what a session did

pub mod argv;
pub mod config;
pub mod error;
pub mod events;
pub mod load;
pub mod service;

pub use argv::{ArgumentBuffer, ARGV_BUF_SIZE};
pub use error::LoaderError;
pub use events::{EventLog, LoaderEvent};
pub use load::{LoadRequest, PendingImage};
pub use service::{opcode, LoaderService};
