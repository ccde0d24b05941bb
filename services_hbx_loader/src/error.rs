//! Loader error types

use loader_types::PathDecodeError;
use platform_api::PlatformError;
use thiserror::Error;
use wire::result;
use wire::ResultCode;

/// Errors a command handler can report to its caller
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoaderError {
    /// The header word or a descriptor word did not match the expected
    /// shape for the opcode
    #[error("malformed command")]
    InvalidCommandFormat,

    /// The target path payload could not be decoded
    #[error("target path rejected: {0}")]
    PathDecode(#[from] PathDecodeError),

    /// Opening or reading the image failed
    #[error("image access failed: {0}")]
    Storage(PlatformError),

    /// Mapping the staging region failed
    #[error("staging allocation failed: {0}")]
    Allocation(PlatformError),

    /// The platform finished codeset creation but produced no object
    #[error("codeset creation produced no object")]
    ImageCreationFailed,

    /// The opcode is outside the handled set
    #[error("unknown opcode {0:#x}")]
    UnknownCommand(u16),
}

impl LoaderError {
    /// Packs the error into the status word sent back to the client
    pub fn result_code(&self) -> ResultCode {
        match self {
            LoaderError::InvalidCommandFormat | LoaderError::PathDecode(_) => {
                result::INVALID_COMMAND
            }
            LoaderError::Storage(e) | LoaderError::Allocation(e) => e.result_code(),
            LoaderError::ImageCreationFailed => result::LOADER_NOT_FOUND,
            LoaderError::UnknownCommand(_) => result::UNKNOWN_COMMAND,
        }
    }
}
