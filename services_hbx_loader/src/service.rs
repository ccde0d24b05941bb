//! Command dispatch for one loader session

use crate::argv::ArgumentBuffer;
use crate::config;
use crate::error::LoaderError;
use crate::events::{EventLog, LoaderEvent};
use crate::load::{LoadRequest, PendingImage};
use loader_types::{ProcessName, SessionId, TargetPath, TitleId};
use platform_api::{CodesetHandle, LoaderPlatform};
use wire::{
    moved_handles, rw_buffer, static_buffer_tag, BufferRights, CommandBuffer, Header,
    RequestPayload, ResultCode, STATIC_DESC_MASK,
};

/// Opcodes of the loader protocol
pub mod opcode {
    /// Stage the selected image and return a codeset handle
    pub const LOAD_PROCESS: u16 = 1;
    /// Select the image the next load opens
    pub const SET_TARGET: u16 = 2;
    /// Store the argument block for the next spawned process
    pub const SET_ARGUMENTS: u16 = 3;
    /// Rewrite a caller-owned extended header in place
    pub const PATCH_EXHEADER: u16 = 4;
}

/// One loader session: the target slot, the argument block and the
/// command handlers that mutate them
#[derive(Debug)]
pub struct LoaderService {
    session: SessionId,
    target: TargetPath,
    arguments: ArgumentBuffer,
    events: EventLog,
}

impl LoaderService {
    pub fn new() -> Self {
        let session = SessionId::new();
        Self {
            session,
            target: TargetPath::empty(),
            arguments: ArgumentBuffer::new(),
            events: EventLog::new(session),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// The image the next load will open; empty means the default
    pub fn target(&self) -> &TargetPath {
        &self.target
    }

    /// The argument block the next spawned process receives
    pub fn arguments(&self) -> &ArgumentBuffer {
        &self.arguments
    }

    /// Everything this session has done so far
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Handles one command, writing the response into `cmdbuf`
    ///
    /// Failures of any kind become an error response with opcode 0; the
    /// command buffer always leaves this method holding a well-formed
    /// response.
    pub fn handle_command<P: LoaderPlatform>(
        &mut self,
        platform: &mut P,
        cmdbuf: &mut CommandBuffer,
        payload: RequestPayload<'_>,
    ) {
        let opcode = cmdbuf.header().opcode;
        let outcome = match opcode {
            opcode::LOAD_PROCESS => self.load_process(platform, cmdbuf, payload),
            opcode::SET_TARGET => self.set_target(cmdbuf, payload),
            opcode::SET_ARGUMENTS => self.set_arguments(cmdbuf, payload),
            opcode::PATCH_EXHEADER => self.patch_exheader(platform, cmdbuf, payload),
            other => Err(LoaderError::UnknownCommand(other)),
        };
        if let Err(error) = outcome {
            let code = error.result_code();
            self.events.record(LoaderEvent::CommandRejected {
                opcode,
                code: code.raw(),
            });
            cmdbuf.respond_error(code);
        }
    }

    fn load_process<P: LoaderPlatform>(
        &mut self,
        platform: &mut P,
        cmdbuf: &mut CommandBuffer,
        payload: RequestPayload<'_>,
    ) -> Result<(), LoaderError> {
        if cmdbuf.word(0) != Header::new(opcode::LOAD_PROCESS, 6, 0).encode() || !payload.is_none()
        {
            return Err(LoaderError::InvalidCommandFormat);
        }
        let request = LoadRequest {
            base_address: cmdbuf.word(1),
            extra_flags: cmdbuf.word(2) & config::EXTRA_FLAG_MASK,
            title_id: TitleId::from_words(cmdbuf.word(3), cmdbuf.word(4)),
            name: ProcessName::from_words(cmdbuf.word(5), cmdbuf.word(6)),
        };

        let defaulted = self.target.is_empty();
        if defaulted {
            self.target = config::DEFAULT_BOOT_TARGET;
            self.arguments.reset_single(config::DEFAULT_BOOT_ARGV);
        }
        // The slot is one-shot: consumed by this load whether it succeeds
        // or not, so the next undirected load boots the default again.
        let path = std::mem::take(&mut self.target);
        self.events.record(LoaderEvent::LoadStarted {
            path: path.to_string_lossy(),
            defaulted,
        });

        let codeset = self.stage_and_create(platform, &path, &request)?;
        self.events.record(LoaderEvent::LoadCompleted {
            path: path.to_string_lossy(),
            codeset: codeset.0,
        });

        cmdbuf.set_header(Header::new(opcode::LOAD_PROCESS, 1, 2));
        cmdbuf.set_word(1, ResultCode::SUCCESS.raw());
        cmdbuf.set_word(2, moved_handles(1));
        cmdbuf.set_word(3, codeset.0);
        Ok(())
    }

    fn stage_and_create<P: LoaderPlatform>(
        &mut self,
        platform: &mut P,
        path: &TargetPath,
        request: &LoadRequest,
    ) -> Result<CodesetHandle, LoaderError> {
        let file = platform.open_image(path).map_err(LoaderError::Storage)?;
        let mut pending = PendingImage::new(file);

        let size = match platform.image_size(pending.file()) {
            Ok(size) => size,
            Err(e) => {
                pending.release(platform);
                return Err(LoaderError::Storage(e));
            }
        };

        let total = config::round_to_page(size);
        let region = match platform.map_region(config::MAP_BASE, total, request.extra_flags) {
            Ok(region) => region,
            Err(e) => {
                pending.release(platform);
                return Err(LoaderError::Allocation(e));
            }
        };
        pending.hold_region(region);

        match platform.create_codeset(&request.codeset_request(), region, pending.file()) {
            Some(codeset) => {
                // The platform took the region; only the file remains.
                let _ = pending.take_region();
                pending.release(platform);
                Ok(codeset)
            }
            None => {
                pending.release(platform);
                Err(LoaderError::ImageCreationFailed)
            }
        }
    }

    fn set_target(
        &mut self,
        cmdbuf: &mut CommandBuffer,
        payload: RequestPayload<'_>,
    ) -> Result<(), LoaderError> {
        // A malformed request leaves the slot exactly as it was; only a
        // payload that fails to decode clears it.
        if cmdbuf.word(0) != Header::new(opcode::SET_TARGET, 0, 2).encode()
            || cmdbuf.word(1) & STATIC_DESC_MASK != static_buffer_tag(0)
        {
            return Err(LoaderError::InvalidCommandFormat);
        }
        let RequestPayload::StaticBuffer { slot: 0, bytes } = payload else {
            return Err(LoaderError::InvalidCommandFormat);
        };

        match TargetPath::from_utf8(bytes) {
            Ok(path) => {
                self.events.record(LoaderEvent::TargetSet {
                    path: path.to_string_lossy(),
                });
                self.target = path;
                cmdbuf.respond_status(opcode::SET_TARGET, ResultCode::SUCCESS);
                Ok(())
            }
            Err(e) => {
                self.target.clear();
                Err(LoaderError::PathDecode(e))
            }
        }
    }

    fn set_arguments(
        &mut self,
        cmdbuf: &mut CommandBuffer,
        payload: RequestPayload<'_>,
    ) -> Result<(), LoaderError> {
        if cmdbuf.word(0) != Header::new(opcode::SET_ARGUMENTS, 0, 2).encode()
            || cmdbuf.word(1) & STATIC_DESC_MASK != static_buffer_tag(1)
        {
            return Err(LoaderError::InvalidCommandFormat);
        }
        let RequestPayload::StaticBuffer { slot: 1, bytes } = payload else {
            return Err(LoaderError::InvalidCommandFormat);
        };

        self.arguments.fill_from(bytes);
        self.events.record(LoaderEvent::ArgumentsStored {
            count: self.arguments.argument_count(),
        });
        cmdbuf.respond_status(opcode::SET_ARGUMENTS, ResultCode::SUCCESS);
        Ok(())
    }

    fn patch_exheader<P: LoaderPlatform>(
        &mut self,
        platform: &mut P,
        cmdbuf: &mut CommandBuffer,
        payload: RequestPayload<'_>,
    ) -> Result<(), LoaderError> {
        let descriptor = rw_buffer(exheader::ExHeaderView::SIZE, BufferRights::ReadWrite);
        if cmdbuf.word(0) != Header::new(opcode::PATCH_EXHEADER, 0, 2).encode()
            || cmdbuf.word(1) != descriptor
        {
            return Err(LoaderError::InvalidCommandFormat);
        }
        let token = cmdbuf.word(2);
        let RequestPayload::ReadWrite(bytes) = payload else {
            return Err(LoaderError::InvalidCommandFormat);
        };

        let report = exheader::patch_exheader(
            bytes,
            platform.firmware_version(),
            platform.hardware_variant(),
        )
        .map_err(|_| LoaderError::InvalidCommandFormat)?;

        self.events.record(LoaderEvent::ExHeaderPatched {
            appended_pairs: report.appended_pairs,
        });
        cmdbuf.set_header(Header::new(opcode::PATCH_EXHEADER, 1, 2));
        cmdbuf.set_word(1, ResultCode::SUCCESS.raw());
        cmdbuf.set_word(2, descriptor);
        cmdbuf.set_word(3, token);
        Ok(())
    }
}

impl Default for LoaderService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exheader::templates::DEPENDENCY_TEMPLATE;
    use loader_types::{FirmwareVersion, HardwareVariant};
    use sim_platform::{FaultPoint, FaultPolicy, SimPlatform};
    use wire::result;
    use wire::static_buffer;

    fn load_cmdbuf() -> CommandBuffer {
        let mut cmdbuf = CommandBuffer::request(Header::new(1, 6, 0));
        cmdbuf.set_word(1, 0x0010_8000);
        cmdbuf.set_word(2, 0x0000_0103); // only 0x100 survives the mask
        cmdbuf.set_word(3, 0x0000_1E00);
        cmdbuf.set_word(4, 0x0004_0000);
        cmdbuf.set_word(5, u32::from_le_bytes(*b"hbx_"));
        cmdbuf.set_word(6, u32::from_le_bytes(*b"app\0"));
        cmdbuf
    }

    fn set_target_cmdbuf(path_len: usize) -> CommandBuffer {
        let mut cmdbuf = CommandBuffer::request(Header::new(2, 0, 2));
        cmdbuf.set_word(1, static_buffer(path_len, 0));
        cmdbuf
    }

    fn set_target(service: &mut LoaderService, path: &[u8]) -> ResultCode {
        let mut cmdbuf = set_target_cmdbuf(path.len());
        let mut platform = SimPlatform::new();
        service.handle_command(
            &mut platform,
            &mut cmdbuf,
            RequestPayload::StaticBuffer { slot: 0, bytes: path },
        );
        cmdbuf.status()
    }

    #[test]
    fn test_undirected_load_boots_the_default() {
        let mut platform = SimPlatform::new().add_image("/boot.hbx", 0x3200);
        let mut service = LoaderService::new();
        let mut cmdbuf = load_cmdbuf();

        service.handle_command(&mut platform, &mut cmdbuf, RequestPayload::None);

        assert_eq!(cmdbuf.header(), Header::new(1, 1, 2));
        assert!(cmdbuf.status().is_success());
        assert_eq!(cmdbuf.word(2), moved_handles(1));
        let codeset = CodesetHandle(cmdbuf.word(3));
        let created = platform.codeset_request(codeset).unwrap();
        assert_eq!(created.name.as_bytes(), b"hbx_app\0");
        assert_eq!(created.base_address, 0x0010_8000);

        assert_eq!(platform.open_attempts(), ["/boot.hbx"]);
        assert_eq!(service.arguments().argument(0), Some("sd:/boot.hbx"));
        assert_eq!(platform.open_file_count(), 0);
        assert_eq!(platform.mapped_region_count(), 0);
    }

    #[test]
    fn test_selected_target_is_consumed_by_the_load() {
        let mut platform = SimPlatform::new()
            .add_image("/boot.hbx", 0x1000)
            .add_image("/apps/demo.hbx", 0x1000);
        let mut service = LoaderService::new();

        assert!(set_target(&mut service, b"/apps/demo.hbx").is_success());
        assert_eq!(service.target().to_string_lossy(), "/apps/demo.hbx");

        let mut cmdbuf = load_cmdbuf();
        service.handle_command(&mut platform, &mut cmdbuf, RequestPayload::None);
        assert!(cmdbuf.status().is_success());
        assert!(service.target().is_empty());

        // The next undirected load falls back to the default image.
        let mut cmdbuf = load_cmdbuf();
        service.handle_command(&mut platform, &mut cmdbuf, RequestPayload::None);
        assert_eq!(platform.open_attempts(), ["/apps/demo.hbx", "/boot.hbx"]);
    }

    #[test]
    fn test_target_consumed_even_when_the_load_fails() {
        let mut platform = SimPlatform::new().add_image("/boot.hbx", 0x1000);
        let mut service = LoaderService::new();
        assert!(set_target(&mut service, b"/missing.hbx").is_success());

        let mut cmdbuf = load_cmdbuf();
        service.handle_command(&mut platform, &mut cmdbuf, RequestPayload::None);
        assert_eq!(cmdbuf.header(), Header::new(0, 1, 0));
        assert!(cmdbuf.status().is_failure());
        assert!(service.target().is_empty());
    }

    #[test]
    fn test_load_header_mismatch_is_rejected_before_any_io() {
        let mut platform = SimPlatform::new().add_image("/boot.hbx", 0x1000);
        let mut service = LoaderService::new();
        let mut cmdbuf = load_cmdbuf();
        cmdbuf.set_header(Header::new(1, 5, 0));

        service.handle_command(&mut platform, &mut cmdbuf, RequestPayload::None);
        assert_eq!(cmdbuf.status(), result::INVALID_COMMAND);
        assert!(platform.open_attempts().is_empty());
    }

    #[test]
    fn test_every_fault_point_leaks_nothing() {
        for point in FaultPoint::ALL {
            let mut platform = SimPlatform::new()
                .add_image("/boot.hbx", 0x2800)
                .with_fault(FaultPolicy::At(point));
            let mut service = LoaderService::new();
            let mut cmdbuf = load_cmdbuf();

            service.handle_command(&mut platform, &mut cmdbuf, RequestPayload::None);

            assert!(cmdbuf.status().is_failure(), "{point:?}");
            assert_eq!(cmdbuf.header(), Header::new(0, 1, 0), "{point:?}");
            assert_eq!(platform.open_file_count(), 0, "{point:?}");
            assert_eq!(platform.mapped_region_count(), 0, "{point:?}");
            assert_eq!(platform.codeset_count(), 0, "{point:?}");
        }
    }

    #[test]
    fn test_codeset_failure_reports_the_loader_module() {
        let mut platform = SimPlatform::new()
            .add_image("/boot.hbx", 0x1000)
            .with_fault(FaultPolicy::At(FaultPoint::CreateCodeset));
        let mut service = LoaderService::new();
        let mut cmdbuf = load_cmdbuf();
        service.handle_command(&mut platform, &mut cmdbuf, RequestPayload::None);
        assert_eq!(cmdbuf.status(), result::LOADER_NOT_FOUND);
    }

    #[test]
    fn test_set_target_decode_failure_clears_the_slot() {
        let mut service = LoaderService::new();
        assert!(set_target(&mut service, b"/apps/demo.hbx").is_success());

        let status = set_target(&mut service, &[0x2F, 0xFF, 0xFE]);
        assert_eq!(status, result::INVALID_COMMAND);
        assert!(service.target().is_empty());
    }

    #[test]
    fn test_set_target_overlength_path_clears_the_slot() {
        let mut service = LoaderService::new();
        assert!(set_target(&mut service, b"/apps/demo.hbx").is_success());

        let long = vec![b'a'; 300];
        let status = set_target(&mut service, &long);
        assert_eq!(status, result::INVALID_COMMAND);
        assert!(service.target().is_empty());
    }

    #[test]
    fn test_set_target_header_mismatch_leaves_the_slot_alone() {
        let mut service = LoaderService::new();
        assert!(set_target(&mut service, b"/apps/demo.hbx").is_success());

        let mut platform = SimPlatform::new();
        let mut cmdbuf = set_target_cmdbuf(4);
        cmdbuf.set_header(Header::new(2, 1, 2));
        service.handle_command(
            &mut platform,
            &mut cmdbuf,
            RequestPayload::StaticBuffer { slot: 0, bytes: b"/x" },
        );
        assert_eq!(cmdbuf.status(), result::INVALID_COMMAND);
        assert_eq!(service.target().to_string_lossy(), "/apps/demo.hbx");
    }

    #[test]
    fn test_set_target_rejects_the_wrong_slot() {
        let mut platform = SimPlatform::new();
        let mut service = LoaderService::new();
        let mut cmdbuf = CommandBuffer::request(Header::new(2, 0, 2));
        cmdbuf.set_word(1, static_buffer(4, 1));
        service.handle_command(
            &mut platform,
            &mut cmdbuf,
            RequestPayload::StaticBuffer { slot: 1, bytes: b"/x" },
        );
        assert_eq!(cmdbuf.status(), result::INVALID_COMMAND);
    }

    #[test]
    fn test_set_arguments_stores_the_block() {
        let mut platform = SimPlatform::new();
        let mut service = LoaderService::new();
        let mut block = 2u32.to_le_bytes().to_vec();
        block.extend_from_slice(b"demo.hbx\0--fast\0");

        let mut cmdbuf = CommandBuffer::request(Header::new(3, 0, 2));
        cmdbuf.set_word(1, static_buffer(block.len(), 1));
        service.handle_command(
            &mut platform,
            &mut cmdbuf,
            RequestPayload::StaticBuffer { slot: 1, bytes: &block },
        );

        assert_eq!(cmdbuf.header(), Header::new(3, 1, 0));
        assert!(cmdbuf.status().is_success());
        assert_eq!(service.arguments().argument_count(), 2);
        assert_eq!(service.arguments().argument(1), Some("--fast"));
    }

    #[test]
    fn test_patch_exheader_rewrites_and_echoes() {
        let mut platform = SimPlatform::new()
            .with_firmware(FirmwareVersion::new(2, 50, 0))
            .with_variant(HardwareVariant::Enhanced);
        let mut service = LoaderService::new();
        let mut bytes = vec![0xAAu8; exheader::ExHeaderView::SIZE];
        let descriptor = rw_buffer(exheader::ExHeaderView::SIZE, BufferRights::ReadWrite);

        let mut cmdbuf = CommandBuffer::request(Header::new(4, 0, 2));
        cmdbuf.set_word(1, descriptor);
        cmdbuf.set_word(2, 0xCAFE_0000);
        service.handle_command(
            &mut platform,
            &mut cmdbuf,
            RequestPayload::ReadWrite(&mut bytes),
        );

        assert_eq!(cmdbuf.header(), Header::new(4, 1, 2));
        assert!(cmdbuf.status().is_success());
        assert_eq!(cmdbuf.word(2), descriptor);
        assert_eq!(cmdbuf.word(3), 0xCAFE_0000);

        let view = exheader::ExHeaderView::new(&mut bytes).unwrap();
        assert_eq!(view.name().as_bytes(), b"hbx_app\0");
        assert_eq!(view.dependency_count(), DEPENDENCY_TEMPLATE.len() + 2);
        assert!(matches!(
            service.events().entries().last(),
            Some(LoaderEvent::ExHeaderPatched { appended_pairs: 2 })
        ));
    }

    #[test]
    fn test_patch_exheader_rejects_wrong_descriptor_size() {
        let mut platform = SimPlatform::new();
        let mut service = LoaderService::new();
        let mut bytes = vec![0u8; exheader::ExHeaderView::SIZE];

        let mut cmdbuf = CommandBuffer::request(Header::new(4, 0, 2));
        cmdbuf.set_word(1, rw_buffer(exheader::ExHeaderView::SIZE - 1, BufferRights::ReadWrite));
        service.handle_command(
            &mut platform,
            &mut cmdbuf,
            RequestPayload::ReadWrite(&mut bytes),
        );
        assert_eq!(cmdbuf.status(), result::INVALID_COMMAND);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_unknown_opcode() {
        let mut platform = SimPlatform::new();
        let mut service = LoaderService::new();
        let mut cmdbuf = CommandBuffer::request(Header::new(9, 0, 0));
        service.handle_command(&mut platform, &mut cmdbuf, RequestPayload::None);
        assert_eq!(cmdbuf.header(), Header::new(0, 1, 0));
        assert_eq!(cmdbuf.status(), result::UNKNOWN_COMMAND);
        assert!(matches!(
            service.events().entries().last(),
            Some(LoaderEvent::CommandRejected { opcode: 9, .. })
        ));
    }

    #[test]
    fn test_event_log_tells_the_session_story() {
        let mut platform = SimPlatform::new().add_image("/boot.hbx", 0x1000);
        let mut service = LoaderService::new();
        let mut cmdbuf = load_cmdbuf();
        service.handle_command(&mut platform, &mut cmdbuf, RequestPayload::None);

        let entries = service.events().entries();
        assert!(matches!(
            entries[0],
            LoaderEvent::LoadStarted { defaulted: true, .. }
        ));
        assert!(matches!(entries[1], LoaderEvent::LoadCompleted { .. }));
        let json = service.events().to_json().unwrap();
        assert!(json.contains("/boot.hbx"));
    }
}
