//! The extended-header privilege rewrite
//!
//! A pure transform: given the same buffer, firmware version and hardware
//! variant, the output is byte-identical. There is no failure path after
//! the size check.

use crate::layout::{KERNEL_CAP_SLOTS, RESLIMIT_SLOTS, SERVICE_ACCESS_SLOTS};
use crate::templates::{
    DEPENDENCY_TEMPLATE, KERNEL_CAP_TEMPLATE, KERNEL_CAP_UNUSED, NFC_MODULE, NFC_SERVICE,
    SERVICE_ACCESS_TEMPLATE, VIDEO_DECODER_MODULE, VIDEO_DECODER_SERVICE,
};
use crate::view::{CapBlock, ExHeaderError, ExHeaderView};
use loader_types::{FirmwareVersion, HardwareVariant, ProcessName};

/// Name stamped into every patched header.
pub const HBX_PROCESS_NAME: ProcessName = ProcessName::from_bytes(*b"hbx_app\0");

/// Stack size granted to homebrew processes
///
/// HBX binaries and their runtime need no more than this; a generous
/// native-title value would waste memory.
pub const HBX_STACK_SIZE: u32 = 0x1000;

/// Core version written to both capability blocks.
pub const CORE_VERSION: u32 = 2;

/// Operating mode on the enhanced hardware variant (production).
pub const ENHANCED_PROD_MODE: u8 = 1;

/// Operating mode on the standard hardware variant (production).
pub const LEGACY_PROD_MODE: u8 = 0;

/// Priority in the kernel-enforced block.
pub const KERNEL_BLOCK_PRIORITY: u8 = 0x30;

/// Resource-limit category value needed to run work on the secondary core.
pub const SECONDARY_CORE_RESLIMIT: u16 = 0x9E;

/// Resource-limit category tag for the application class.
pub const RESLIMIT_CATEGORY_APPLICATION: u8 = 0;

/// First firmware release whose capability era includes the NFC module.
pub const NFC_MIN_FIRMWARE: FirmwareVersion = FirmwareVersion::new(2, 50, 0);

/// What a patch appended beyond the fixed templates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchReport {
    /// Number of dependency/service pairs appended after the templates
    pub appended_pairs: usize,
}

/// Rewrites a caller-owned extended header in place
///
/// Rejects any buffer whose size differs from the exact record size
/// without writing a byte. Past that check the rewrite is unconditional:
/// identity fields, the dependency list, both capability blocks and both
/// kernel-capability tables are overwritten from the baked-in templates,
/// then the firmware-conditional dependency/service pairs are appended at
/// the first free slots after the templates.
pub fn patch_exheader(
    bytes: &mut [u8],
    firmware: FirmwareVersion,
    variant: HardwareVariant,
) -> Result<PatchReport, ExHeaderError> {
    let mut view = ExHeaderView::new(bytes)?;

    view.set_name(HBX_PROCESS_NAME);
    view.set_stack_size(HBX_STACK_SIZE);

    view.clear_dependencies();
    for (slot, &title) in DEPENDENCY_TEMPLATE.iter().enumerate() {
        view.set_dependency(slot, title);
    }

    for block in CapBlock::BOTH {
        view.set_core_version(block, CORE_VERSION);
        view.set_core_flags(block, false, false);
        view.set_operating_modes(block, ENHANCED_PROD_MODE, LEGACY_PROD_MODE);
        view.set_affinity_mask(block, 1 << 0);
        view.clear_reslimits(block);
        view.set_fs_access_mask(block, 0xFFFF_FFFF);
        view.set_storage_flags(block, true, true);
        view.clear_service_access(block);
        for (slot, &name) in SERVICE_ACCESS_TEMPLATE.iter().enumerate() {
            view.set_service_access(block, slot, name);
        }
        view.set_reslimit_category(block, RESLIMIT_CATEGORY_APPLICATION);
        view.fill_kernel_caps(block, KERNEL_CAP_UNUSED);
        for (slot, &descriptor) in KERNEL_CAP_TEMPLATE.iter().enumerate() {
            view.set_kernel_cap(block, slot, descriptor);
        }
    }

    // The two blocks intentionally disagree on these sub-fields; the
    // access-descriptor signature expects exactly this asymmetry.
    view.set_ideal_processor(CapBlock::Kernel, 0);
    view.set_priority(CapBlock::Kernel, KERNEL_BLOCK_PRIORITY);
    view.set_ideal_processor(CapBlock::AccessDescriptor, 1 << 0);
    view.set_priority(CapBlock::AccessDescriptor, 0);

    // Secondary-core budget: slot 0 in the kernel block, slot 1 in the
    // access-descriptor block.
    view.set_reslimit(CapBlock::Kernel, 0, SECONDARY_CORE_RESLIMIT);
    view.set_reslimit(CapBlock::AccessDescriptor, 1, SECONDARY_CORE_RESLIMIT);

    let mut next_dependency = DEPENDENCY_TEMPLATE.len();
    let mut next_service = SERVICE_ACCESS_TEMPLATE.len();
    let mut appended_pairs = 0;

    if firmware >= NFC_MIN_FIRMWARE {
        view.set_dependency(next_dependency, NFC_MODULE);
        for block in CapBlock::BOTH {
            view.set_service_access(block, next_service, NFC_SERVICE);
        }
        next_dependency += 1;
        next_service += 1;
        appended_pairs += 1;

        if variant == HardwareVariant::Enhanced {
            view.set_dependency(next_dependency, VIDEO_DECODER_MODULE);
            for block in CapBlock::BOTH {
                view.set_service_access(block, next_service, VIDEO_DECODER_SERVICE);
            }
            appended_pairs += 1;
        }
    }

    debug_assert!(next_service < SERVICE_ACCESS_SLOTS);
    debug_assert!(KERNEL_CAP_TEMPLATE.len() <= KERNEL_CAP_SLOTS);
    debug_assert!(RESLIMIT_SLOTS == 2);

    Ok(PatchReport { appended_pairs })
}
