//! The loader's view of the operating system

use crate::error::PlatformError;
use loader_types::{FirmwareVersion, HardwareVariant, ProcessName, TargetPath, TitleId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an open image file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileHandle(pub u32);

/// Handle to a mapped memory region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionHandle(pub u32);

/// Handle to a created codeset, ready for the process manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodesetHandle(pub u32);

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File({:#x})", self.0)
    }
}

impl fmt::Display for RegionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Region({:#x})", self.0)
    }
}

impl fmt::Display for CodesetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Codeset({:#x})", self.0)
    }
}

/// Identity of the codeset to build from a staged image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodesetRequest {
    /// Process name stamped on the codeset
    pub name: ProcessName,
    /// Address the relocated image expects to run at
    pub base_address: u32,
    /// Title id the codeset reports
    pub title_id: TitleId,
}

/// Everything the loader needs from the operating system
///
/// One implementation talks to the real kernel and filesystem; the
/// simulated one backs the test suite. The loader holds the only copy of
/// each handle it is given, so implementations may treat handle release as
/// unconditional.
pub trait LoaderPlatform {
    /// Opens the image at `path` for reading
    fn open_image(&mut self, path: &TargetPath) -> Result<FileHandle, PlatformError>;

    /// Closes an image opened by [`LoaderPlatform::open_image`]
    fn close_image(&mut self, file: FileHandle);

    /// Size of an open image in bytes
    fn image_size(&mut self, file: FileHandle) -> Result<u32, PlatformError>;

    /// Maps a fresh memory region of `size` bytes at `base`
    ///
    /// `extra_flags` carries the caller-selected allocation flag bits and
    /// is combined with the platform's own mapping mode.
    fn map_region(
        &mut self,
        base: u32,
        size: u32,
        extra_flags: u32,
    ) -> Result<RegionHandle, PlatformError>;

    /// Unmaps a region that was never turned into a codeset
    fn unmap_region(&mut self, region: RegionHandle);

    /// Builds a codeset from a staged region and its source image
    ///
    /// On success the platform consumes the region. `None` means the
    /// platform produced no object; the region stays mapped and the
    /// caller must unmap it.
    fn create_codeset(
        &mut self,
        request: &CodesetRequest,
        region: RegionHandle,
        file: FileHandle,
    ) -> Option<CodesetHandle>;

    /// Firmware version the system booted with
    fn firmware_version(&self) -> FirmwareVersion;

    /// Hardware revision the service is running on
    fn hardware_variant(&self) -> HardwareVariant;
}
