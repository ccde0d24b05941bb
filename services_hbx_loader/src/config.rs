//! Baked-in service configuration

use loader_types::TargetPath;

/// Image opened when no target was selected before a load.
pub const DEFAULT_BOOT_PATH: &str = "/boot.hbx";

/// Argument handed to the default boot image, volume prefix included.
pub const DEFAULT_BOOT_ARGV: &str = "sd:/boot.hbx";

/// The default boot path in slot form.
pub const DEFAULT_BOOT_TARGET: TargetPath = TargetPath::from_ascii(DEFAULT_BOOT_PATH);

/// Address the staging region is mapped at while an image is prepared.
pub const MAP_BASE: u32 = 0x1000_0000;

/// Allocation-flag bits a load request may pass through to the mapping;
/// everything outside this mask is discarded.
pub const EXTRA_FLAG_MASK: u32 = 0xF00;

/// Mapping granularity; staging sizes are rounded up to this.
pub const PAGE_SIZE: u32 = 0x1000;

/// Rounds a byte count up to the next page boundary.
pub const fn round_to_page(size: u32) -> u32 {
    (size + PAGE_SIZE - 1) & !(PAGE_SIZE - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_target_matches_path() {
        assert_eq!(DEFAULT_BOOT_TARGET.to_string_lossy(), DEFAULT_BOOT_PATH);
        assert!(!DEFAULT_BOOT_TARGET.is_empty());
    }

    #[test]
    fn test_round_to_page() {
        assert_eq!(round_to_page(0), 0);
        assert_eq!(round_to_page(1), PAGE_SIZE);
        assert_eq!(round_to_page(PAGE_SIZE), PAGE_SIZE);
        assert_eq!(round_to_page(PAGE_SIZE + 1), 2 * PAGE_SIZE);
    }
}
