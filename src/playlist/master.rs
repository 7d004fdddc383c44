//! Master playlist
//!
//! Holds the variants, session data and custom tags of a master playlist.
//! Alternatives and session data are stored as given; duplicates are only
//! filtered when encoding.

use bytes::Bytes;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::custom::{CustomTag, CustomTags};
use super::media::{MediaPlaylist, SharedMediaPlaylist};
use super::types::{SessionData, VariantParams};
use crate::config::MasterConfig;
use crate::encode;
use crate::version::{self, ProtocolVersion};

/// One rendition listed in a master playlist
#[derive(Debug, Clone)]
pub struct Variant {
    pub uri: String,
    /// Media playlist behind `uri`, for the caller's convenience. Never
    /// encoded and never keeps the playlist alive.
    pub chunklist: Option<Weak<RwLock<MediaPlaylist>>>,
    pub params: VariantParams,
}

impl Variant {
    pub fn new(uri: impl Into<String>, params: VariantParams) -> Self {
        Self {
            uri: uri.into(),
            chunklist: None,
            params,
        }
    }

    /// The referenced media playlist, if it is still alive.
    pub fn chunklist(&self) -> Option<SharedMediaPlaylist> {
        self.chunklist.as_ref()?.upgrade()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MasterPlaylist {
    pub(crate) variants: Vec<Variant>,
    pub(crate) session_data: Vec<SessionData>,
    pub(crate) custom: CustomTags,
    pub(crate) independent_segments: bool,
    /// Query string appended to every variant URI
    pub(crate) args: String,
    pub(crate) version: ProtocolVersion,
    cache: Option<Bytes>,
}

impl MasterPlaylist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &MasterConfig) -> Self {
        let mut playlist = Self::new();
        playlist.set_independent_segments(config.independent_segments);
        if let Some(args) = &config.args {
            playlist.set_args(args.clone());
        }
        if let Some(ver) = config.version {
            playlist.set_version(ver);
        }
        playlist
    }

    /// Add a variant. A variant carrying alternatives raises the version to 4.
    pub fn append(&mut self, uri: impl Into<String>, chunklist: Option<&SharedMediaPlaylist>, params: VariantParams) {
        if !params.alternatives.is_empty() {
            self.version.require(version::VERSION_ALTERNATIVES);
        }
        let mut variant = Variant::new(uri, params);
        variant.chunklist = chunklist.map(Arc::downgrade);
        tracing::debug!(
            uri = %variant.uri,
            bandwidth = variant.params.bandwidth,
            alternatives = variant.params.alternatives.len(),
            "appended variant"
        );
        self.variants.push(variant);
        self.reset_cache();
    }

    /// Add or replace a session data entry. Entries with the same data id
    /// and language replace each other.
    pub fn set_session_data(&mut self, data: SessionData) {
        match self
            .session_data
            .iter_mut()
            .find(|d| d.data_id == data.data_id && d.language == data.language)
        {
            Some(slot) => *slot = data,
            None => self.session_data.push(data),
        }
        self.reset_cache();
    }

    pub fn set_custom_tag<T: CustomTag + 'static>(&mut self, tag: T) {
        self.custom.set(Arc::new(tag));
        self.reset_cache();
    }

    /// Query string appended to every variant URI.
    pub fn set_args(&mut self, args: impl Into<String>) {
        self.args = args.into();
        self.reset_cache();
    }

    pub fn set_independent_segments(&mut self, yes: bool) {
        self.independent_segments = yes;
        self.reset_cache();
    }

    /// Override the protocol version. Later variants may raise it again.
    pub fn set_version(&mut self, ver: u8) {
        self.version.set(ver);
        self.reset_cache();
    }

    pub fn version(&self) -> u8 {
        self.version.get()
    }

    pub fn independent_segments(&self) -> bool {
        self.independent_segments
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Mutable access for decoders and bulk edits. Drops the cache.
    pub fn variants_mut(&mut self) -> &mut Vec<Variant> {
        self.reset_cache();
        &mut self.variants
    }

    pub fn session_data(&self) -> &[SessionData] {
        &self.session_data
    }

    /// Mutable access for decoders and bulk edits. Drops the cache.
    pub fn session_data_mut(&mut self) -> &mut Vec<SessionData> {
        self.reset_cache();
        &mut self.session_data
    }

    pub fn custom_tags(&self) -> &CustomTags {
        &self.custom
    }

    pub fn reset_cache(&mut self) {
        self.cache = None;
    }

    /// Encode the playlist, reusing the cached output when nothing changed
    /// since the previous call.
    pub fn encode(&mut self) -> Bytes {
        if let Some(cached) = &self.cache {
            tracing::trace!(len = cached.len(), "master playlist cache hit");
            return cached.clone();
        }
        let output = encode::encode_master(self);
        tracing::trace!(len = output.len(), "master playlist encoded");
        self.cache = Some(output.clone());
        output
    }
}

impl fmt::Display for MasterPlaylist {
    /// Render the current state without touching the cache.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let output = encode::encode_master(self);
        f.write_str(&String::from_utf8_lossy(&output))
    }
}
