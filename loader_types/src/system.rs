//! Firmware version and hardware variant queries
//!
//! The loader's extended-header policy is a deterministic function of the
//! firmware version and the hardware variant; both are queried once from
//! the platform and never change for the lifetime of a session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Packed firmware version, ordered newest-last
///
/// Packs as `major << 24 | minor << 16 | revision << 8`, so ordinary
/// integer comparison orders firmware releases correctly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FirmwareVersion(u32);

impl FirmwareVersion {
    /// Creates a version from its major/minor/revision parts
    pub const fn new(major: u8, minor: u8, revision: u8) -> Self {
        Self(((major as u32) << 24) | ((minor as u32) << 16) | ((revision as u32) << 8))
    }

    /// Returns the packed representation
    pub const fn packed(&self) -> u32 {
        self.0
    }

    /// Major version component
    pub const fn major(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Minor version component
    pub const fn minor(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Revision component
    pub const fn revision(&self) -> u8 {
        (self.0 >> 8) as u8
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.revision())
    }
}

/// One of the two supported device revisions
///
/// The enhanced variant carries the faster secondary cores and the
/// hardware video decoder; the extended-header policy appends extra
/// dependencies only on that variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HardwareVariant {
    /// The original device revision
    Standard,
    /// The later, faster device revision
    Enhanced,
}

impl fmt::Display for HardwareVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareVariant::Standard => write!(f, "Standard"),
            HardwareVariant::Enhanced => write!(f, "Enhanced"),
        }
    }
}
