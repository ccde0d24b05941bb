//! Baked-in privilege templates
//!
//! These tables describe the privileges a faked process is granted: which
//! named services it may connect to, which system modules it declares as
//! dependencies, and which kernel capability descriptors it carries. The
//! patch overwrites the caller's extended header wholesale from these
//! tables; nothing is merged.

use crate::layout::SERVICE_NAME_LEN;

/// High word shared by every system-module title id.
pub const SYSTEM_MODULE_HIGH: u64 = 0x0004_0130;

/// Low-word bit marking a module that exists only on the enhanced
/// hardware variant.
pub const ENHANCED_MODULE_BIT: u64 = 0x2000_0000;

/// Builds a system-module title id from its unique id.
pub const fn module_title(unique: u32) -> u64 {
    (SYSTEM_MODULE_HIGH << 32) | ((unique as u64) << 8) | 0x02
}

/// Builds a title id for a module shipped only on the enhanced variant.
pub const fn enhanced_module_title(unique: u32) -> u64 {
    (SYSTEM_MODULE_HIGH << 32) | ENHANCED_MODULE_BIT | ((unique as u64) << 8) | 0x02
}

/// Pads a service name to its fixed 8-byte slot.
pub const fn service_name(name: &str) -> [u8; SERVICE_NAME_LEN] {
    let bytes = name.as_bytes();
    assert!(bytes.len() <= SERVICE_NAME_LEN);
    let mut slot = [0u8; SERVICE_NAME_LEN];
    let mut i = 0;
    while i < bytes.len() {
        slot[i] = bytes[i];
        i += 1;
    }
    slot
}

/// Services a homebrew process may connect to
///
/// Fills the first 32 service-access slots; the two slots after the
/// template are reserved for the firmware-conditional appends.
pub const SERVICE_ACCESS_TEMPLATE: [[u8; SERVICE_NAME_LEN]; 32] = [
    service_name("app:mgr"),
    service_name("aud:dsp"),
    service_name("aud:snd"),
    service_name("cam:usr"),
    service_name("cfg:nvm"),
    service_name("cfg:usr"),
    service_name("fs:user"),
    service_name("gpu:cmd"),
    service_name("gpu:lcd"),
    service_name("hid:user"),
    service_name("http:cli"),
    service_name("ir:raw"),
    service_name("ir:rst"),
    service_name("ir:user"),
    service_name("ldr:ro"),
    service_name("media:yc"),
    service_name("mic:usr"),
    service_name("ndm:usr"),
    service_name("net:acc"),
    service_name("net:ext"),
    service_name("net:uds"),
    service_name("news:sys"),
    service_name("nim:sys"),
    service_name("ns:sys"),
    service_name("pm:app"),
    service_name("push:p"),
    service_name("pwr:sys"),
    service_name("pwr:usr"),
    service_name("qr:usr"),
    service_name("soc:usr"),
    service_name("ssl:cli"),
    service_name("store:am"),
];

/// System modules the faked process declares as dependencies
pub const DEPENDENCY_TEMPLATE: [u64; 28] = [
    module_title(0x15), // store manager
    module_title(0x16), // camera
    module_title(0x17), // config
    module_title(0x18), // codec
    module_title(0x1A), // audio dsp
    module_title(0x1B), // gpio
    module_title(0x1C), // gpu
    module_title(0x1D), // hid
    module_title(0x1E), // i2c
    module_title(0x1F), // mcu
    module_title(0x20), // mic
    module_title(0x21), // pdn
    module_title(0x22), // power
    module_title(0x23), // spi
    module_title(0x24), // network access
    module_title(0x27), // sound
    module_title(0x28), // local play
    module_title(0x29), // http
    module_title(0x2B), // network daemon
    module_title(0x2C), // install manager
    module_title(0x2D), // wireless
    module_title(0x2E), // socket
    module_title(0x2F), // ssl
    module_title(0x31), // process security
    module_title(0x33), // infrared
    module_title(0x34), // push
    module_title(0x35), // news
    module_title(0x37), // ro loader
];

/// Near-field-communication module, present from [`crate::NFC_MIN_FIRMWARE`] on.
pub const NFC_MODULE: u64 = module_title(0x40);

/// Service-access entry matching [`NFC_MODULE`].
pub const NFC_SERVICE: [u8; SERVICE_NAME_LEN] = service_name("nfc:user");

/// Hardware video decoder, enhanced variant only.
pub const VIDEO_DECODER_MODULE: u64 = enhanced_module_title(0x41);

/// Service-access entry matching [`VIDEO_DECODER_MODULE`].
pub const VIDEO_DECODER_SERVICE: [u8; SERVICE_NAME_LEN] = service_name("vdec:std");

/// Filler for kernel-capability slots not covered by the template.
pub const KERNEL_CAP_UNUSED: u32 = 0xFFFF_FFFF;

/// Kernel capability descriptors granted to the faked process
///
/// The table is laid down after every slot is set to [`KERNEL_CAP_UNUSED`],
/// so no descriptor from the buffer's previous owner survives.
pub const KERNEL_CAP_TEMPLATE: [u32; 9] = [
    0xFC00022C, // minimum kernel release (required for the new linear mapping)
    0xFF81FF50, // RW static mapping: 0x1FF50000
    0xFF81FF58, // RW static mapping: 0x1FF58000
    0xFF81FF70, // RW static mapping: 0x1FF70000
    0xFF81FF78, // RW static mapping: 0x1FF78000
    0xFF91F000, // RO static mapping: 0x1F000000
    0xFF91F600, // RO static mapping: 0x1F600000
    0xFF002101, // extended flags: application memtype + debug access + secondary-core access
    0xFE000200, // handle table size: 0x200
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{KERNEL_CAP_SLOTS, SERVICE_ACCESS_SLOTS};

    #[test]
    fn test_module_title_layout() {
        assert_eq!(module_title(0x15), 0x0004_0130_0000_1502);
        assert_eq!(enhanced_module_title(0x41), 0x0004_0130_2000_4102);
    }

    #[test]
    fn test_templates_fit_their_tables() {
        assert!(SERVICE_ACCESS_TEMPLATE.len() + 2 <= SERVICE_ACCESS_SLOTS);
        assert!(KERNEL_CAP_TEMPLATE.len() <= KERNEL_CAP_SLOTS);
    }

    #[test]
    fn test_service_names_are_unique() {
        for (i, a) in SERVICE_ACCESS_TEMPLATE.iter().enumerate() {
            for b in &SERVICE_ACCESS_TEMPLATE[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_dependencies_are_unique() {
        for (i, a) in DEPENDENCY_TEMPLATE.iter().enumerate() {
            for b in &DEPENDENCY_TEMPLATE[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_service_name_padding() {
        assert_eq!(service_name("pm:app"), *b"pm:app\0\0");
        assert_eq!(service_name("nfc:user"), *b"nfc:user");
    }
}
