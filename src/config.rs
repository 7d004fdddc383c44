//! Playlist configuration
//!
//! Loads playlist defaults from TOML files:
//!
//! ```toml
//! [media]
//! window_size = 6
//! capacity = 30
//! playlist_type = "event"
//!
//! [master]
//! independent_segments = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PlaylistError, Result};
use crate::playlist::types::MediaType;

/// Media playlist configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Number of segments written out (0 writes every live segment)
    pub window_size: usize,

    /// Number of segment slots
    pub capacity: usize,

    /// Write EXTINF durations as whole seconds
    pub duration_as_int: bool,

    /// Emit EXT-X-INDEPENDENT-SEGMENTS
    pub independent_segments: bool,

    /// EXT-X-PLAYLIST-TYPE
    pub playlist_type: Option<MediaType>,

    /// Query string appended to segment URIs
    pub args: Option<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            window_size: 6,
            capacity: 30, // ~2 minutes of 4s segments
            duration_as_int: false,
            independent_segments: false,
            playlist_type: None,
            args: None,
        }
    }
}

/// Master playlist configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterConfig {
    /// Emit EXT-X-INDEPENDENT-SEGMENTS
    pub independent_segments: bool,

    /// Query string appended to variant URIs
    pub args: Option<String>,

    /// Fixed EXT-X-VERSION instead of the negotiated one
    pub version: Option<u8>,
}

/// Playlist configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    /// Media playlist settings
    pub media: MediaConfig,

    /// Master playlist settings
    pub master: MasterConfig,
}

impl PlaylistConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.as_ref().display(), "playlist configuration loaded");
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PlaylistConfig =
            toml::from_str(content).map_err(|e| PlaylistError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PlaylistError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.media.window_size > self.media.capacity {
            return Err(PlaylistError::WindowSizeExceedsCapacity {
                window: self.media.window_size,
                capacity: self.media.capacity,
            });
        }
        Ok(())
    }
}
