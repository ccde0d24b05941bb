//! In-process platform simulation

use crate::fault::{FaultPoint, FaultPolicy};
use loader_types::{FirmwareVersion, HardwareVariant, TargetPath};
use platform_api::{
    CodesetHandle, CodesetRequest, FileHandle, LoaderPlatform, PlatformError, RegionHandle,
};
use std::collections::HashMap;

/// An image stored on the simulated volume
#[derive(Debug, Clone, Copy)]
struct SimImage {
    size: u32,
}

/// A region the simulation currently has mapped
#[derive(Debug, Clone, Copy)]
struct SimRegion {
    base: u32,
    size: u32,
}

/// Simulated platform state
///
/// All state is accessible: tests add images up front, then inspect open
/// handles, mapped regions, created codesets and the full log of open
/// attempts after driving the loader.
#[derive(Debug)]
pub struct SimPlatform {
    firmware: FirmwareVersion,
    variant: Option<HardwareVariant>,
    fault: FaultPolicy,

    volume: HashMap<String, SimImage>,
    open_files: HashMap<u32, String>,
    regions: HashMap<u32, SimRegion>,
    codesets: HashMap<u32, CodesetRequest>,
    next_handle: u32,

    open_attempts: Vec<String>,
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SimPlatform {
    pub fn new() -> Self {
        Self {
            firmware: FirmwareVersion::new(2, 50, 0),
            variant: None,
            fault: FaultPolicy::Never,
            volume: HashMap::new(),
            open_files: HashMap::new(),
            regions: HashMap::new(),
            codesets: HashMap::new(),
            next_handle: 0,
            open_attempts: Vec::new(),
        }
    }

    /// Sets the firmware version reported to the loader
    pub fn with_firmware(mut self, firmware: FirmwareVersion) -> Self {
        self.firmware = firmware;
        self
    }

    /// Sets the hardware variant reported to the loader
    pub fn with_variant(mut self, variant: HardwareVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Sets the fault policy for subsequent calls
    pub fn with_fault(mut self, fault: FaultPolicy) -> Self {
        self.fault = fault;
        self
    }

    /// Places an image of `size` bytes at `path` on the volume
    pub fn add_image(mut self, path: &str, size: u32) -> Self {
        self.volume.insert(path.to_string(), SimImage { size });
        self
    }

    /// Replaces the fault policy mid-test
    pub fn set_fault(&mut self, fault: FaultPolicy) {
        self.fault = fault;
    }

    /// Number of image files currently open
    pub fn open_file_count(&self) -> usize {
        self.open_files.len()
    }

    /// Number of regions currently mapped
    pub fn mapped_region_count(&self) -> usize {
        self.regions.len()
    }

    /// Number of codesets created so far
    pub fn codeset_count(&self) -> usize {
        self.codesets.len()
    }

    /// Every path the loader tried to open, in order
    pub fn open_attempts(&self) -> &[String] {
        &self.open_attempts
    }

    /// The request a codeset was created from
    pub fn codeset_request(&self, codeset: CodesetHandle) -> Option<&CodesetRequest> {
        self.codesets.get(&codeset.0)
    }

    fn issue_handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl LoaderPlatform for SimPlatform {
    fn open_image(&mut self, path: &TargetPath) -> Result<FileHandle, PlatformError> {
        let path = path.to_string_lossy();
        self.open_attempts.push(path.clone());
        if self.fault.trips_at(FaultPoint::Open) {
            return Err(PlatformError::VolumeUnavailable(path));
        }
        if !self.volume.contains_key(&path) {
            return Err(PlatformError::ImageNotFound(path));
        }
        let handle = self.issue_handle();
        self.open_files.insert(handle, path);
        Ok(FileHandle(handle))
    }

    fn close_image(&mut self, file: FileHandle) {
        self.open_files.remove(&file.0);
    }

    fn image_size(&mut self, file: FileHandle) -> Result<u32, PlatformError> {
        if self.fault.trips_at(FaultPoint::SizeQuery) {
            let path = self.open_files.get(&file.0).cloned().unwrap_or_default();
            return Err(PlatformError::SizeQueryFailed(path));
        }
        let path = self
            .open_files
            .get(&file.0)
            .ok_or(PlatformError::InvalidHandle(file.0))?;
        let image = self.volume[path];
        Ok(image.size)
    }

    fn map_region(
        &mut self,
        base: u32,
        size: u32,
        _extra_flags: u32,
    ) -> Result<RegionHandle, PlatformError> {
        if self.fault.trips_at(FaultPoint::Map) {
            return Err(PlatformError::MappingFailed { base, size });
        }
        let handle = self.issue_handle();
        self.regions.insert(handle, SimRegion { base, size });
        Ok(RegionHandle(handle))
    }

    fn unmap_region(&mut self, region: RegionHandle) {
        self.regions.remove(&region.0);
    }

    fn create_codeset(
        &mut self,
        request: &CodesetRequest,
        region: RegionHandle,
        _file: FileHandle,
    ) -> Option<CodesetHandle> {
        if self.fault.trips_at(FaultPoint::CreateCodeset) {
            // No codeset: the region stays mapped for the caller to free.
            return None;
        }
        self.regions.remove(&region.0);
        let handle = self.issue_handle();
        self.codesets.insert(handle, *request);
        Some(CodesetHandle(handle))
    }

    fn firmware_version(&self) -> FirmwareVersion {
        self.firmware
    }

    fn hardware_variant(&self) -> HardwareVariant {
        self.variant.unwrap_or(HardwareVariant::Standard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loader_types::{ProcessName, TitleId};

    fn boot_path() -> TargetPath {
        TargetPath::from_ascii("/boot.hbx")
    }

    fn request() -> CodesetRequest {
        CodesetRequest {
            name: ProcessName::from_bytes(*b"hbx_app\0"),
            base_address: 0x1000_0000,
            title_id: TitleId::new(0x000400000D921E00),
        }
    }

    #[test]
    fn test_open_and_close_track_handles() {
        let mut platform = SimPlatform::new().add_image("/boot.hbx", 0x4000);
        let file = platform.open_image(&boot_path()).unwrap();
        assert_eq!(platform.open_file_count(), 1);
        assert_eq!(platform.image_size(file), Ok(0x4000));
        platform.close_image(file);
        assert_eq!(platform.open_file_count(), 0);
    }

    #[test]
    fn test_missing_image_is_not_found_but_still_logged() {
        let mut platform = SimPlatform::new();
        let result = platform.open_image(&boot_path());
        assert_eq!(
            result,
            Err(PlatformError::ImageNotFound("/boot.hbx".into()))
        );
        assert_eq!(platform.open_attempts(), ["/boot.hbx"]);
    }

    #[test]
    fn test_stale_file_handle_rejected() {
        let mut platform = SimPlatform::new().add_image("/boot.hbx", 16);
        let file = platform.open_image(&boot_path()).unwrap();
        platform.close_image(file);
        assert_eq!(platform.image_size(file), Err(PlatformError::InvalidHandle(file.0)));
    }

    #[test]
    fn test_create_codeset_consumes_the_region() {
        let mut platform = SimPlatform::new().add_image("/boot.hbx", 16);
        let file = platform.open_image(&boot_path()).unwrap();
        let region = platform.map_region(0x1000_0000, 0x1000, 0).unwrap();
        assert_eq!(platform.mapped_region_count(), 1);

        let codeset = platform.create_codeset(&request(), region, file).unwrap();
        assert_eq!(platform.mapped_region_count(), 0);
        assert_eq!(platform.codeset_count(), 1);
        assert_eq!(platform.codeset_request(codeset), Some(&request()));
    }

    #[test]
    fn test_codeset_fault_leaves_the_region_mapped() {
        let mut platform = SimPlatform::new()
            .add_image("/boot.hbx", 16)
            .with_fault(FaultPolicy::At(FaultPoint::CreateCodeset));
        let file = platform.open_image(&boot_path()).unwrap();
        let region = platform.map_region(0x1000_0000, 0x1000, 0).unwrap();
        assert_eq!(platform.create_codeset(&request(), region, file), None);
        assert_eq!(platform.mapped_region_count(), 1);
        assert_eq!(platform.codeset_count(), 0);
        platform.unmap_region(region);
        assert_eq!(platform.mapped_region_count(), 0);
    }

    #[test]
    fn test_fault_points_fail_their_call() {
        let mut platform = SimPlatform::new()
            .add_image("/boot.hbx", 16)
            .with_fault(FaultPolicy::At(FaultPoint::Map));
        let file = platform.open_image(&boot_path()).unwrap();
        assert!(platform.image_size(file).is_ok());
        assert_eq!(
            platform.map_region(0x1000_0000, 0x1000, 0),
            Err(PlatformError::MappingFailed { base: 0x1000_0000, size: 0x1000 })
        );
    }
}
