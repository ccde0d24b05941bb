//! Image staging for process loads

use loader_types::{ProcessName, TitleId};
use platform_api::{CodesetRequest, FileHandle, LoaderPlatform, RegionHandle};

/// Decoded parameters of a load command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest {
    /// Address the relocated image expects to run at
    pub base_address: u32,
    /// Masked allocation-flag bits forwarded to the mapping
    pub extra_flags: u32,
    /// Title id the spawned process reports
    pub title_id: TitleId,
    /// Process name stamped on the codeset
    pub name: ProcessName,
}

impl LoadRequest {
    /// The codeset identity this request asks for
    pub fn codeset_request(&self) -> CodesetRequest {
        CodesetRequest {
            name: self.name,
            base_address: self.base_address,
            title_id: self.title_id,
        }
    }
}

/// Platform resources held while an image is staged
///
/// Owns the open file and, once mapped, the staging region. A failed
/// pipeline step calls [`PendingImage::release`], which frees whatever
/// is held; nothing leaks regardless of which step failed.
#[derive(Debug)]
pub struct PendingImage {
    file: FileHandle,
    region: Option<RegionHandle>,
}

impl PendingImage {
    /// Starts tracking a freshly opened image
    pub fn new(file: FileHandle) -> Self {
        Self { file, region: None }
    }

    /// The open image file
    pub fn file(&self) -> FileHandle {
        self.file
    }

    /// Records the mapped staging region
    pub fn hold_region(&mut self, region: RegionHandle) {
        self.region = Some(region);
    }

    /// Gives up tracking of the region without unmapping it
    ///
    /// Called when ownership of the region passes to the platform.
    pub fn take_region(&mut self) -> Option<RegionHandle> {
        self.region.take()
    }

    /// Frees everything still held
    pub fn release<P: LoaderPlatform>(self, platform: &mut P) {
        if let Some(region) = self.region {
            platform.unmap_region(region);
        }
        platform.close_image(self.file);
    }
}
