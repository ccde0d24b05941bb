//! Bounded target path storage

use std::fmt;
use thiserror::Error;

/// Maximum number of UTF-16 units a target path may hold, excluding the
/// zero terminator.
pub const PATH_MAX: usize = 255;

/// Errors from converting caller-supplied bytes into a [`TargetPath`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathDecodeError {
    /// The input was not valid UTF-8
    #[error("path is not valid UTF-8")]
    InvalidUtf8,

    /// The converted path exceeds [`PATH_MAX`] UTF-16 units
    #[error("path exceeds {PATH_MAX} UTF-16 units")]
    TooLong,
}

/// A bounded, zero-terminated UTF-16 image path
///
/// An empty path means "unset". The slot holding the next image to load is
/// a `TargetPath` owned by the loader service; callers never see partial
/// contents — a failed conversion yields an error and the caller's slot is
/// cleared, never left with stale units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPath {
    units: [u16; PATH_MAX + 1],
    len: usize,
}

impl TargetPath {
    /// Creates an empty (unset) path
    pub const fn empty() -> Self {
        Self {
            units: [0; PATH_MAX + 1],
            len: 0,
        }
    }

    /// Creates a path from a static ASCII string
    ///
    /// Panics at compile time if the string is longer than [`PATH_MAX`] or
    /// contains non-ASCII bytes. Used for baked-in default paths.
    pub const fn from_ascii(path: &str) -> Self {
        let bytes = path.as_bytes();
        assert!(bytes.len() <= PATH_MAX);
        let mut units = [0u16; PATH_MAX + 1];
        let mut i = 0;
        while i < bytes.len() {
            assert!(bytes[i].is_ascii());
            units[i] = bytes[i] as u16;
            i += 1;
        }
        Self {
            units,
            len: bytes.len(),
        }
    }

    /// Converts caller-supplied UTF-8 bytes into a bounded UTF-16 path
    ///
    /// The conversion is capped at [`PATH_MAX`] units; longer input or
    /// invalid UTF-8 is rejected without producing a partial path.
    pub fn from_utf8(bytes: &[u8]) -> Result<Self, PathDecodeError> {
        // Callers hand over the raw static-buffer contents; a trailing NUL
        // terminates the path early.
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let text = std::str::from_utf8(&bytes[..end]).map_err(|_| PathDecodeError::InvalidUtf8)?;

        let mut units = [0u16; PATH_MAX + 1];
        let mut len = 0;
        for unit in text.encode_utf16() {
            if len >= PATH_MAX {
                return Err(PathDecodeError::TooLong);
            }
            units[len] = unit;
            len += 1;
        }
        Ok(Self { units, len })
    }

    /// Returns true if no target is set
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of UTF-16 units, excluding the terminator
    pub fn len(&self) -> usize {
        self.len
    }

    /// The path's UTF-16 units, excluding the terminator
    pub fn units(&self) -> &[u16] {
        &self.units[..self.len]
    }

    /// Resets the path to the unset state
    pub fn clear(&mut self) {
        self.units = [0; PATH_MAX + 1];
        self.len = 0;
    }

    /// Lossy conversion back to a display string
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(self.units())
    }
}

impl Default for TargetPath {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_lossy())
    }
}
