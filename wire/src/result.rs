//! Packed result codes
//!
//! Every response carries a status word. Zero is success; failures pack a
//! severity level, a summary, the module that raised the error and a
//! module-specific description into one word, so the caller can both
//! branch on "failed at all" and report the precise origin.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level, stored in the top five bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum Level {
    /// The operation succeeded
    Success = 0,
    /// The failure may clear on retry by the caller
    Temporary = 26,
    /// The failure will not clear without intervention
    Permanent = 27,
}

/// Failure summary, stored above the module bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum Summary {
    /// No failure
    Success = 0,
    /// A required resource ran out
    OutOfResource = 3,
    /// The referenced object does not exist
    NotFound = 4,
    /// A caller-supplied argument was malformed
    WrongArgument = 8,
    /// The module failed internally
    Internal = 11,
}

/// Module that raised the error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum Module {
    /// Shared OS / IPC plumbing
    Os = 6,
    /// Kernel memory management
    Kernel = 13,
    /// Filesystem and storage volumes
    Fs = 17,
    /// The process loader layer
    Loader = 27,
}

/// Packed status word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultCode(u32);

impl ResultCode {
    /// The all-zero success word
    pub const SUCCESS: ResultCode = ResultCode(0);

    /// Packs a failure code from its parts
    ///
    /// Layout: level in bits 27-31, summary in bits 21-26, module in bits
    /// 10-17, description in bits 0-9.
    pub const fn new(level: Level, summary: Summary, module: Module, description: u16) -> Self {
        Self(
            ((level as u32) << 27)
                | ((summary as u32) << 21)
                | ((module as u32) << 10)
                | ((description as u32) & 0x3FF),
        )
    }

    /// Reinterprets a raw status word
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw status word
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Returns true for the success word
    pub const fn is_success(&self) -> bool {
        self.0 == 0
    }

    /// Returns true for any failure word
    pub const fn is_failure(&self) -> bool {
        self.0 != 0
    }

    /// The module-specific description bits
    pub const fn description(&self) -> u16 {
        (self.0 & 0x3FF) as u16
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Description: the request header word did not match the expected shape,
/// or an attached payload could not be decoded.
pub const DESC_INVALID_COMMAND: u16 = 0x30;

/// Description: the opcode is outside the handled set.
pub const DESC_INVALID_SELECTION: u16 = 0x2F;

/// Description: the referenced object was not found.
pub const DESC_NOT_FOUND: u16 = 0x3FA;

/// Malformed request header or undecodable payload; no state was changed
/// beyond what the operation itself specifies.
pub const INVALID_COMMAND: ResultCode = ResultCode::new(
    Level::Permanent,
    Summary::WrongArgument,
    Module::Os,
    DESC_INVALID_COMMAND,
);

/// Opcode outside the handled set.
pub const UNKNOWN_COMMAND: ResultCode = ResultCode::new(
    Level::Permanent,
    Summary::WrongArgument,
    Module::Os,
    DESC_INVALID_SELECTION,
);

/// Codeset creation yielded no object after a successful allocation.
pub const LOADER_NOT_FOUND: ResultCode = ResultCode::new(
    Level::Permanent,
    Summary::Internal,
    Module::Loader,
    DESC_NOT_FOUND,
);
