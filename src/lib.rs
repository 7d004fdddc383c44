//! HLS playlist model and encoder
//!
//! Builds master and media playlists in memory and renders them as M3U8
//! text. Media playlists keep their segments in a fixed-capacity ring so a
//! live playlist can slide forward as new segments arrive.
//!
//! Playlists are plain values without internal locking; share one between
//! threads through [`SharedMediaPlaylist`] or another lock of your own.

pub(crate) mod config;
pub(crate) mod encode;
pub(crate) mod error;
pub(crate) mod playlist;
pub(crate) mod version;

#[cfg(test)]
pub(crate) mod tests;

pub use config::{MasterConfig, MediaConfig, PlaylistConfig};
pub use encode::{encode_master, encode_media};
pub use error::{PlaylistError, Result};
pub use playlist::*;
pub use version::{ProtocolVersion, MIN_VERSION};
