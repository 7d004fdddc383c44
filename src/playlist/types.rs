//! Playlist value types
//!
//! Plain data carried by media segments and master playlist variants. These
//! are filled in by the caller (or by a decoder) and trusted as-is by the
//! encoder.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::custom::CustomTags;

/// Encryption key (`EXT-X-KEY`)
///
/// Segments hold keys as `Arc<Key>`. The encoder decides whether a segment
/// switches keys by comparing the `Arc` against the playlist default with
/// `Arc::ptr_eq`, so two keys with equal fields are still two keys.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Key {
    pub method: String,
    pub uri: String,
    pub iv: Option<String>,
    pub keyformat: Option<String>,
    pub keyformat_versions: Option<String>,
}

impl Key {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            ..Default::default()
        }
    }

    pub fn with_iv(mut self, iv: impl Into<String>) -> Self {
        self.iv = Some(iv.into());
        self
    }

    pub fn with_keyformat(
        mut self,
        keyformat: impl Into<String>,
        keyformat_versions: impl Into<String>,
    ) -> Self {
        self.keyformat = Some(keyformat.into()).filter(|s: &String| !s.is_empty());
        self.keyformat_versions = Some(keyformat_versions.into()).filter(|s: &String| !s.is_empty());
        self
    }

    /// `METHOD=NONE` keys carry no other attribute.
    pub fn is_none_method(&self) -> bool {
        self.method == "NONE"
    }

    /// KEYFORMAT and KEYFORMATVERSIONS need protocol version 5.
    pub(crate) fn uses_keyformat(&self) -> bool {
        self.keyformat.is_some() || self.keyformat_versions.is_some()
    }
}

/// Media initialization section (`EXT-X-MAP`)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Map {
    pub uri: String,
    /// Byte length of the section; zero means "the whole resource".
    pub length: u64,
    pub offset: u64,
}

impl Map {
    pub fn new(uri: impl Into<String>, length: u64, offset: u64) -> Self {
        Self {
            uri: uri.into(),
            length,
            offset,
        }
    }
}

/// Sub-range of a segment resource (`EXT-X-BYTERANGE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ByteRange {
    pub length: u64,
    pub offset: u64,
}

/// Phase of an OATCLS-style ad break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CuePhase {
    /// Break starts at this segment (`EXT-X-CUE-OUT`)
    Start,
    /// Segment lies inside the break (`EXT-X-CUE-OUT-CONT`)
    Mid,
    /// Break ends at this segment (`EXT-X-CUE-IN`)
    End,
}

/// SCTE-35 ad insertion marker attached to a segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "syntax", rename_all = "lowercase")]
pub enum Scte {
    /// SCTE 67-2014 `#EXT-SCTE35` tag
    Legacy {
        cue: String,
        id: Option<String>,
        /// Zero means "not set".
        time: f64,
    },
    /// `#EXT-OATCLS-SCTE35` / `#EXT-X-CUE-OUT` family
    Oatcls {
        phase: CuePhase,
        cue: String,
        /// Total break duration in seconds
        duration: f64,
        /// Seconds elapsed since the break started (mid phase only)
        elapsed: f64,
    },
}

/// `EXT-X-DATERANGE` metadata interval
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub id: String,
    pub class: Option<String>,
    pub start_date: Option<DateTime<FixedOffset>>,
    pub end_date: Option<DateTime<FixedOffset>>,
    pub duration: Option<f64>,
    pub planned_duration: Option<f64>,
    pub scte35_cmd: Option<String>,
    pub scte35_in: Option<String>,
    pub scte35_out: Option<String>,
    pub end_on_next: bool,
    /// Interstitial `X-RESUME-OFFSET` in seconds
    pub resume_offset: Option<f64>,
    /// Interstitial `X-PLAYOUT-LIMIT` in seconds
    pub playout_limit: Option<f64>,
    /// Interstitial `X-SNAP`, e.g. `IN,OUT`
    pub snap: Option<String>,
    /// Interstitial `X-RESTRICT`, e.g. `SKIP,JUMP`
    pub restrict: Option<String>,
    pub asset_uri: Option<String>,
    pub asset_list: Option<String>,
    /// Other `X-` client attributes, written quoted in key order.
    pub extensions: BTreeMap<String, String>,
}

impl DateRange {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Value of `EXT-X-PLAYLIST-TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Vod,
    Event,
}

/// Widevine vendor metadata (`#WV-*` tags). Zero and empty fields are
/// not written.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WvInfo {
    pub audio_channels: u32,
    pub audio_format: u32,
    pub audio_profile_idc: u32,
    pub audio_sample_size: u32,
    pub audio_sampling_frequency: u32,
    pub cypher_version: String,
    pub ecm: String,
    pub video_format: u32,
    pub video_frame_rate: u32,
    pub video_level_idc: u32,
    pub video_profile_idc: u32,
    pub video_resolution: String,
    pub video_sar: String,
}

/// One media segment of a media playlist
#[derive(Debug, Clone, Default)]
pub struct MediaSegment {
    /// Media sequence number, assigned by the playlist on insertion.
    pub seq_id: u64,
    pub uri: String,
    /// Duration in seconds
    pub duration: f64,
    pub title: String,
    /// Key override; see [`Key`] for how changes are detected.
    pub key: Option<Arc<Key>>,
    /// Map override; ignored when the playlist has a default map.
    pub map: Option<Map>,
    pub scte: Option<Scte>,
    pub date_ranges: Vec<DateRange>,
    pub discontinuity: bool,
    pub gap: bool,
    pub program_date_time: Option<DateTime<FixedOffset>>,
    pub byte_range: Option<ByteRange>,
    pub custom: CustomTags,
}

impl MediaSegment {
    pub fn new(uri: impl Into<String>, duration: f64, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            duration,
            title: title.into(),
            ..Default::default()
        }
    }
}

/// `TYPE` attribute of `EXT-X-MEDIA`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenditionType {
    Audio,
    Video,
    Subtitles,
    ClosedCaptions,
}

impl fmt::Display for RenditionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            RenditionType::Audio => "AUDIO",
            RenditionType::Video => "VIDEO",
            RenditionType::Subtitles => "SUBTITLES",
            RenditionType::ClosedCaptions => "CLOSED-CAPTIONS",
        })
    }
}

/// Alternative rendition (`EXT-X-MEDIA`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub kind: RenditionType,
    pub group_id: String,
    pub name: String,
    pub default: bool,
    pub autoselect: Option<bool>,
    pub language: Option<String>,
    pub forced: Option<bool>,
    pub characteristics: Option<String>,
    pub subtitles: Option<String>,
    pub uri: Option<String>,
    pub instream_id: Option<String>,
    pub channels: Option<String>,
}

impl Alternative {
    pub fn new(kind: RenditionType, group_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            group_id: group_id.into(),
            name: name.into(),
            default: false,
            autoselect: None,
            language: None,
            forced: None,
            characteristics: None,
            subtitles: None,
            uri: None,
            instream_id: None,
            channels: None,
        }
    }
}

/// `EXT-X-SESSION-DATA` entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionData {
    pub data_id: String,
    /// Written in preference to `uri` when both are set.
    pub value: Option<String>,
    pub uri: Option<String>,
    pub language: Option<String>,
}

/// `RESOLUTION` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// `CLOSED-CAPTIONS` attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosedCaptions {
    /// Written unquoted as `NONE`
    None,
    GroupId(String),
}

/// Attributes of a master playlist variant
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VariantParams {
    pub program_id: u32,
    pub bandwidth: u64,
    pub average_bandwidth: Option<u64>,
    pub codecs: Option<String>,
    pub resolution: Option<Resolution>,
    pub audio: Option<String>,
    pub video: Option<String>,
    pub subtitles: Option<String>,
    pub captions: Option<ClosedCaptions>,
    /// Display name (`NAME`)
    pub name: Option<String>,
    pub frame_rate: Option<f64>,
    pub video_range: Option<String>,
    pub hdcp_level: Option<String>,
    /// Written as `EXT-X-I-FRAME-STREAM-INF` when set.
    pub iframe: bool,
    pub alternatives: Vec<Alternative>,
}
