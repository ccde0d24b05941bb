//! Typed view over a caller-owned extended-header buffer

use crate::layout::*;
use loader_types::ProcessName;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from constructing a view or patching a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExHeaderError {
    /// The buffer is not exactly [`EXHEADER_SIZE`] bytes; nothing was written
    #[error("extended header buffer is {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Selects one of the two capability blocks
///
/// The two blocks are near-duplicates: the kernel enforces the first, the
/// signature verifier checks the second against the access descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapBlock {
    /// The block the kernel enforces at runtime
    Kernel,
    /// The block compared against the access-descriptor signature
    AccessDescriptor,
}

impl CapBlock {
    /// Both blocks, in record order
    pub const BOTH: [CapBlock; 2] = [CapBlock::Kernel, CapBlock::AccessDescriptor];

    const fn base(self) -> usize {
        match self {
            CapBlock::Kernel => KERNEL_BLOCK_BASE,
            CapBlock::AccessDescriptor => ACCESS_BLOCK_BASE,
        }
    }
}

/// Field-level accessors over a caller-owned buffer
///
/// The view neither allocates nor copies; every setter writes in place at
/// a fixed offset. Construction fails on any size other than the exact
/// record size, before anything is written.
#[derive(Debug)]
pub struct ExHeaderView<'a> {
    bytes: &'a mut [u8],
}

impl<'a> ExHeaderView<'a> {
    /// Exact required buffer size
    pub const SIZE: usize = EXHEADER_SIZE;

    /// Wraps a buffer, rejecting any size mismatch
    pub fn new(bytes: &'a mut [u8]) -> Result<Self, ExHeaderError> {
        if bytes.len() != EXHEADER_SIZE {
            return Err(ExHeaderError::SizeMismatch {
                expected: EXHEADER_SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Self { bytes })
    }

    // System control info

    /// Process name field
    pub fn name(&self) -> ProcessName {
        let mut raw = [0u8; NAME_LEN];
        raw.copy_from_slice(&self.bytes[NAME_OFFSET..NAME_OFFSET + NAME_LEN]);
        ProcessName::from_bytes(raw)
    }

    pub fn set_name(&mut self, name: ProcessName) {
        self.bytes[NAME_OFFSET..NAME_OFFSET + NAME_LEN].copy_from_slice(name.as_bytes());
    }

    /// Remaster version, untouched by the patch
    pub fn version(&self) -> u16 {
        self.read_u16(VERSION_OFFSET)
    }

    pub fn stack_size(&self) -> u32 {
        self.read_u32(STACK_SIZE_OFFSET)
    }

    pub fn set_stack_size(&mut self, size: u32) {
        self.write_u32(STACK_SIZE_OFFSET, size);
    }

    /// Save-data size, untouched by the patch
    pub fn savedata_size(&self) -> u64 {
        self.read_u64(SAVEDATA_SIZE_OFFSET)
    }

    /// Jump id, untouched by the patch
    pub fn jump_id(&self) -> u64 {
        self.read_u64(JUMP_ID_OFFSET)
    }

    /// Zeroes every dependency slot
    pub fn clear_dependencies(&mut self) {
        for slot in 0..DEPENDENCY_SLOTS {
            self.set_dependency(slot, 0);
        }
    }

    pub fn dependency(&self, slot: usize) -> u64 {
        assert!(slot < DEPENDENCY_SLOTS);
        self.read_u64(DEPENDENCIES_OFFSET + slot * 8)
    }

    pub fn set_dependency(&mut self, slot: usize, title: u64) {
        assert!(slot < DEPENDENCY_SLOTS);
        self.write_u64(DEPENDENCIES_OFFSET + slot * 8, title);
    }

    /// Number of leading non-zero dependency slots
    pub fn dependency_count(&self) -> usize {
        (0..DEPENDENCY_SLOTS)
            .take_while(|&slot| self.dependency(slot) != 0)
            .count()
    }

    // Capability blocks

    pub fn core_version(&self, block: CapBlock) -> u32 {
        self.read_u32(block.base() + CORE_VERSION_OFFSET)
    }

    pub fn set_core_version(&mut self, block: CapBlock, version: u32) {
        self.write_u32(block.base() + CORE_VERSION_OFFSET, version);
    }

    pub fn use_high_clockrate(&self, block: CapBlock) -> bool {
        self.bytes[block.base() + CORE_FLAGS_OFFSET] & CORE_FLAG_HIGH_CLOCKRATE != 0
    }

    pub fn enable_l2_cache(&self, block: CapBlock) -> bool {
        self.bytes[block.base() + CORE_FLAGS_OFFSET] & CORE_FLAG_L2_CACHE != 0
    }

    pub fn set_core_flags(&mut self, block: CapBlock, high_clockrate: bool, l2_cache: bool) {
        let mut flags = 0u8;
        if high_clockrate {
            flags |= CORE_FLAG_HIGH_CLOCKRATE;
        }
        if l2_cache {
            flags |= CORE_FLAG_L2_CACHE;
        }
        self.bytes[block.base() + CORE_FLAGS_OFFSET] = flags;
    }

    /// Operating mode used on the enhanced hardware variant
    pub fn enhanced_mode(&self, block: CapBlock) -> u8 {
        self.bytes[block.base() + ENHANCED_MODE_OFFSET]
    }

    /// Operating mode used on the standard hardware variant
    pub fn legacy_mode(&self, block: CapBlock) -> u8 {
        self.bytes[block.base() + LEGACY_MODE_OFFSET]
    }

    pub fn set_operating_modes(&mut self, block: CapBlock, enhanced: u8, legacy: u8) {
        self.bytes[block.base() + ENHANCED_MODE_OFFSET] = enhanced;
        self.bytes[block.base() + LEGACY_MODE_OFFSET] = legacy;
    }

    pub fn ideal_processor(&self, block: CapBlock) -> u8 {
        self.bytes[block.base() + IDEAL_PROCESSOR_OFFSET]
    }

    pub fn set_ideal_processor(&mut self, block: CapBlock, processor: u8) {
        self.bytes[block.base() + IDEAL_PROCESSOR_OFFSET] = processor;
    }

    pub fn affinity_mask(&self, block: CapBlock) -> u8 {
        self.bytes[block.base() + AFFINITY_MASK_OFFSET]
    }

    pub fn set_affinity_mask(&mut self, block: CapBlock, mask: u8) {
        self.bytes[block.base() + AFFINITY_MASK_OFFSET] = mask;
    }

    pub fn priority(&self, block: CapBlock) -> u8 {
        self.bytes[block.base() + PRIORITY_OFFSET]
    }

    pub fn set_priority(&mut self, block: CapBlock, priority: u8) {
        self.bytes[block.base() + PRIORITY_OFFSET] = priority;
    }

    pub fn reslimit_category(&self, block: CapBlock) -> u8 {
        self.bytes[block.base() + RESLIMIT_CATEGORY_OFFSET]
    }

    pub fn set_reslimit_category(&mut self, block: CapBlock, category: u8) {
        self.bytes[block.base() + RESLIMIT_CATEGORY_OFFSET] = category;
    }

    pub fn reslimit(&self, block: CapBlock, slot: usize) -> u16 {
        assert!(slot < RESLIMIT_SLOTS);
        self.read_u16(block.base() + RESLIMITS_OFFSET + slot * 2)
    }

    pub fn set_reslimit(&mut self, block: CapBlock, slot: usize, value: u16) {
        assert!(slot < RESLIMIT_SLOTS);
        self.write_u16(block.base() + RESLIMITS_OFFSET + slot * 2, value);
    }

    pub fn clear_reslimits(&mut self, block: CapBlock) {
        for slot in 0..RESLIMIT_SLOTS {
            self.set_reslimit(block, slot, 0);
        }
    }

    pub fn fs_access_mask(&self, block: CapBlock) -> u32 {
        self.read_u32(block.base() + FS_ACCESS_OFFSET)
    }

    pub fn set_fs_access_mask(&mut self, block: CapBlock, mask: u32) {
        self.write_u32(block.base() + FS_ACCESS_OFFSET, mask);
    }

    pub fn no_romfs(&self, block: CapBlock) -> bool {
        self.read_u32(block.base() + STORAGE_FLAGS_OFFSET) & STORAGE_FLAG_NO_ROMFS != 0
    }

    pub fn extended_savedata(&self, block: CapBlock) -> bool {
        self.read_u32(block.base() + STORAGE_FLAGS_OFFSET) & STORAGE_FLAG_EXTENDED_SAVEDATA != 0
    }

    pub fn set_storage_flags(&mut self, block: CapBlock, no_romfs: bool, extended_savedata: bool) {
        let mut flags = 0u32;
        if no_romfs {
            flags |= STORAGE_FLAG_NO_ROMFS;
        }
        if extended_savedata {
            flags |= STORAGE_FLAG_EXTENDED_SAVEDATA;
        }
        self.write_u32(block.base() + STORAGE_FLAGS_OFFSET, flags);
    }

    pub fn service_access(&self, block: CapBlock, slot: usize) -> [u8; SERVICE_NAME_LEN] {
        assert!(slot < SERVICE_ACCESS_SLOTS);
        let offset = block.base() + SERVICE_ACCESS_OFFSET + slot * SERVICE_NAME_LEN;
        let mut name = [0u8; SERVICE_NAME_LEN];
        name.copy_from_slice(&self.bytes[offset..offset + SERVICE_NAME_LEN]);
        name
    }

    pub fn set_service_access(&mut self, block: CapBlock, slot: usize, name: [u8; SERVICE_NAME_LEN]) {
        assert!(slot < SERVICE_ACCESS_SLOTS);
        let offset = block.base() + SERVICE_ACCESS_OFFSET + slot * SERVICE_NAME_LEN;
        self.bytes[offset..offset + SERVICE_NAME_LEN].copy_from_slice(&name);
    }

    pub fn clear_service_access(&mut self, block: CapBlock) {
        for slot in 0..SERVICE_ACCESS_SLOTS {
            self.set_service_access(block, slot, [0; SERVICE_NAME_LEN]);
        }
    }

    pub fn kernel_cap(&self, block: CapBlock, slot: usize) -> u32 {
        assert!(slot < KERNEL_CAP_SLOTS);
        self.read_u32(block.base() + KERNEL_CAPS_OFFSET + slot * 4)
    }

    pub fn set_kernel_cap(&mut self, block: CapBlock, slot: usize, descriptor: u32) {
        assert!(slot < KERNEL_CAP_SLOTS);
        self.write_u32(block.base() + KERNEL_CAPS_OFFSET + slot * 4, descriptor);
    }

    /// Writes `descriptor` to every kernel-capability slot
    ///
    /// The patch fills the table with the unused sentinel before laying
    /// down the template, so nothing from the buffer's prior life (for
    /// instance a genuine signed title) survives in the trailing slots.
    pub fn fill_kernel_caps(&mut self, block: CapBlock, descriptor: u32) {
        for slot in 0..KERNEL_CAP_SLOTS {
            self.set_kernel_cap(block, slot, descriptor);
        }
    }

    // Little-endian field helpers

    fn read_u16(&self, offset: usize) -> u16 {
        let mut raw = [0u8; 2];
        raw.copy_from_slice(&self.bytes[offset..offset + 2]);
        u16::from_le_bytes(raw)
    }

    fn write_u16(&mut self, offset: usize, value: u16) {
        self.bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    fn read_u32(&self, offset: usize) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.bytes[offset..offset + 4]);
        u32::from_le_bytes(raw)
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        self.bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn read_u64(&self, offset: usize) -> u64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.bytes[offset..offset + 8]);
        u64::from_le_bytes(raw)
    }

    fn write_u64(&mut self, offset: usize, value: u64) {
        self.bytes[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
    }
}
