//! Protocol version negotiation
//!
//! Every playlist carries the lowest `EXT-X-VERSION` its features require.
//! Features raise the version as they are used; nothing lowers it except an
//! explicit override by the caller.

use std::fmt;

/// Version written by a playlist that uses no version-gated feature
pub const MIN_VERSION: u8 = 3;

/// `EXT-X-MEDIA` groups on a variant (backward compatible, but older clients
/// may not handle them well)
pub const VERSION_ALTERNATIVES: u8 = 4;

/// `EXTINF` durations forced to whole seconds
pub const VERSION_INTEGER_DURATION: u8 = 3;

/// `KEYFORMAT` / `KEYFORMATVERSIONS` on `EXT-X-KEY`
pub const VERSION_KEYFORMAT: u8 = 5;

/// `EXT-X-MAP` on a media playlist
pub const VERSION_MAP: u8 = 5;

/// `EXT-X-I-FRAMES-ONLY`
pub const VERSION_IFRAMES_ONLY: u8 = 4;

/// `EXT-X-BYTERANGE` on a segment
pub const VERSION_BYTE_RANGE: u8 = 4;

/// Monotonic minimum protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProtocolVersion(u8);

impl ProtocolVersion {
    pub fn new() -> Self {
        Self(MIN_VERSION)
    }

    /// Raise the version to at least `required`. Never lowers it.
    pub fn require(&mut self, required: u8) {
        if self.0 < required {
            tracing::trace!(from = self.0, to = required, "raising protocol version");
            self.0 = required;
        }
    }

    /// Overwrite the version unconditionally.
    pub fn set(&mut self, version: u8) {
        self.0 = version;
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
