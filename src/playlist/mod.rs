//! Playlist model module
//!
//! This module holds the in-memory playlists:
//! - Media playlist backed by a fixed-capacity segment ring
//! - Master playlist with variants, alternatives and session data
//! - Value types shared by both (keys, maps, date ranges, SCTE cues)
//! - Custom tag plumbing

pub mod custom;
pub mod master;
pub mod media;
pub(crate) mod ring;
pub mod types;

pub use custom::{CustomTag, CustomTags, SimpleTag};
pub use master::{MasterPlaylist, Variant};
pub use media::{MediaPlaylist, SharedMediaPlaylist};
pub use types::*;
