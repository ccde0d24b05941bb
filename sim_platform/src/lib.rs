//! # Simulated Platform
//!
//! This crate provides a simulated implementation of the platform API.
//!
//! ## Purpose
//!
//! The simulated platform allows testing the loader without hardware:
//! - Runs under `cargo test`
//! - Deterministic (no real I/O, no real memory mapping)
//! - Fast (a volume is a hash map, a region is a table entry)
//! - Inspectable (every open handle and every open attempt is visible)
//!
//! ## Philosophy
//!
//! **Testability is a first-class design constraint.**
//!
//! The loader's hardest bugs are cleanup bugs: a file left open after a
//! failed mapping, a region leaked after codeset creation fails. The
//! simulation therefore tracks every handle it issues and exposes exact
//! live counts, so tests can assert that a failed load releases
//! everything it acquired.

pub mod fault;
pub mod platform;

pub use fault::{FaultPoint, FaultPolicy};
pub use platform::SimPlatform;
