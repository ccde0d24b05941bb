//! Binary layout of the extended-header record
//!
//! All multi-byte fields are little-endian. The record is three regions:
//! the system control info, then two capability blocks of identical shape
//! (the kernel-enforced block and the access-descriptor block checked by
//! the signature verifier).

/// Total size of the record; anything else is rejected outright.
pub const EXHEADER_SIZE: usize = SCI_SIZE + 2 * BLOCK_SIZE;

/// Size of the system control info region.
pub const SCI_SIZE: usize = 0x1A0;

/// Size of one capability block.
pub const BLOCK_SIZE: usize = 0x1D0;

/// Offset of the kernel-enforced capability block.
pub const KERNEL_BLOCK_BASE: usize = SCI_SIZE;

/// Offset of the access-descriptor capability block.
pub const ACCESS_BLOCK_BASE: usize = SCI_SIZE + BLOCK_SIZE;

// System control info, absolute offsets.
pub const NAME_OFFSET: usize = 0x000;
pub const NAME_LEN: usize = 8;
pub const VERSION_OFFSET: usize = 0x008;
pub const STACK_SIZE_OFFSET: usize = 0x00C;
pub const DEPENDENCIES_OFFSET: usize = 0x010;
pub const DEPENDENCY_SLOTS: usize = 48;
pub const SAVEDATA_SIZE_OFFSET: usize = 0x190;
pub const JUMP_ID_OFFSET: usize = 0x198;

// Capability block, offsets relative to the block base.
pub const CORE_VERSION_OFFSET: usize = 0x00;
pub const CORE_FLAGS_OFFSET: usize = 0x04;
pub const ENHANCED_MODE_OFFSET: usize = 0x05;
pub const LEGACY_MODE_OFFSET: usize = 0x06;
pub const IDEAL_PROCESSOR_OFFSET: usize = 0x07;
pub const AFFINITY_MASK_OFFSET: usize = 0x08;
pub const PRIORITY_OFFSET: usize = 0x09;
pub const RESLIMIT_CATEGORY_OFFSET: usize = 0x0A;
pub const RESLIMITS_OFFSET: usize = 0x0C;
pub const RESLIMIT_SLOTS: usize = 2;
pub const FS_ACCESS_OFFSET: usize = 0x10;
pub const STORAGE_FLAGS_OFFSET: usize = 0x14;
pub const SERVICE_ACCESS_OFFSET: usize = 0x18;
pub const SERVICE_ACCESS_SLOTS: usize = 34;
pub const SERVICE_NAME_LEN: usize = 8;
pub const KERNEL_CAPS_OFFSET: usize = 0x128;
pub const KERNEL_CAP_SLOTS: usize = 32;

// Core flag bits.
pub const CORE_FLAG_HIGH_CLOCKRATE: u8 = 1 << 0;
pub const CORE_FLAG_L2_CACHE: u8 = 1 << 1;

// Storage flag bits.
pub const STORAGE_FLAG_NO_ROMFS: u32 = 1 << 0;
pub const STORAGE_FLAG_EXTENDED_SAVEDATA: u32 = 1 << 1;
