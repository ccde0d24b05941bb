//! # Extended Header
//!
//! This crate models the extended-header record the kernel reads at
//! process-creation time, and the rewrite that grants an HBX homebrew
//! process the privileges of a natively-built title.
//!
//! ## Philosophy
//!
//! The kernel trusts this record implicitly, so the crate treats it as a
//! strongly-typed view over an exact-size byte buffer rather than an
//! opaque blob: every field has a named accessor, every baked-in table is
//! a documented constant, and the patch itself is a pure function of
//! `(bytes, firmware version, hardware variant)`.
//!
//! ## Key Items
//!
//! - [`ExHeaderView`]: field-level accessors over a caller-owned buffer
//! - [`templates`]: the service, dependency and kernel-capability tables
//! - [`patch_exheader`]: the deterministic privilege rewrite

pub mod layout;
pub mod patch;
pub mod templates;
pub mod view;

pub use patch::{patch_exheader, PatchReport, NFC_MIN_FIRMWARE};
pub use view::{CapBlock, ExHeaderError, ExHeaderView};
