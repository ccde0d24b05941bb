//! Platform error types

use thiserror::Error;
use wire::result::{Level, Module, ResultCode, Summary};

/// Errors that can occur when calling into the platform
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    /// The image path does not resolve to a file
    #[error("image not found: {0}")]
    ImageNotFound(String),

    /// The backing volume is not mounted or stopped responding
    #[error("volume unavailable: {0}")]
    VolumeUnavailable(String),

    /// The image size could not be queried
    #[error("size query failed: {0}")]
    SizeQueryFailed(String),

    /// The requested region could not be mapped
    #[error("mapping failed at {base:#010x} ({size:#x} bytes)")]
    MappingFailed { base: u32, size: u32 },

    /// Not enough memory to satisfy an allocation
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// A handle was stale or never issued
    #[error("invalid handle: {0}")]
    InvalidHandle(u32),
}

impl PlatformError {
    /// Packs the error into the status word reported to the client
    pub fn result_code(&self) -> ResultCode {
        match self {
            PlatformError::ImageNotFound(_) => ResultCode::new(
                Level::Permanent,
                Summary::NotFound,
                Module::Fs,
                wire::result::DESC_NOT_FOUND,
            ),
            PlatformError::VolumeUnavailable(_) | PlatformError::SizeQueryFailed(_) => {
                ResultCode::new(Level::Temporary, Summary::Internal, Module::Fs, 0x1F5)
            }
            PlatformError::MappingFailed { .. } | PlatformError::OutOfMemory(_) => {
                ResultCode::new(Level::Permanent, Summary::OutOfResource, Module::Kernel, 0x2BF)
            }
            PlatformError::InvalidHandle(_) => ResultCode::new(
                Level::Permanent,
                Summary::WrongArgument,
                Module::Kernel,
                0x2F,
            ),
        }
    }
}
