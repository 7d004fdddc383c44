//! Media playlist
//!
//! Owns the segment ring plus the playlist-wide attributes, raises the
//! protocol version as features are used and keeps the encoded output cached
//! until the next mutation.
//!
//! Mutators are all-or-nothing: a call that returns an error has changed
//! nothing, the cache included.

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, FixedOffset};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use super::custom::{CustomTag, CustomTags};
use super::ring::SegmentRing;
use super::types::{ByteRange, DateRange, Key, Map, MediaSegment, MediaType, Scte, WvInfo};
use crate::config::MediaConfig;
use crate::encode;
use crate::error::{PlaylistError, Result};
use crate::version::{self, ProtocolVersion};

/// A media playlist shared between a writer and the variants that point at
/// it. Hosts take the lock around every mutation and encode.
pub type SharedMediaPlaylist = Arc<RwLock<MediaPlaylist>>;

const END_LIST: &str = "#EXT-X-ENDLIST\n";

#[derive(Debug, Clone)]
pub struct MediaPlaylist {
    pub(crate) segments: SegmentRing,
    pub(crate) window_size: usize,
    /// Media sequence number of the head segment
    pub(crate) seq_no: u64,
    pub(crate) target_duration: f64,
    pub(crate) closed: bool,
    pub(crate) media_type: Option<MediaType>,
    pub(crate) start_time: f64,
    pub(crate) start_time_precise: bool,
    pub(crate) discontinuity_seq: u64,
    pub(crate) iframe: bool,
    pub(crate) duration_as_int: bool,
    pub(crate) independent_segments: bool,
    pub(crate) default_key: Option<Arc<Key>>,
    pub(crate) default_map: Option<Map>,
    pub(crate) wv: Option<WvInfo>,
    pub(crate) custom: CustomTags,
    /// Query string appended to every segment URI
    pub(crate) args: String,
    pub(crate) version: ProtocolVersion,
    cache: Option<Bytes>,
}

impl MediaPlaylist {
    /// Create an empty playlist with `capacity` segment slots of which at
    /// most `window_size` are written out (0 writes them all).
    pub fn new(window_size: usize, capacity: usize) -> Result<Self> {
        let mut playlist = Self {
            segments: SegmentRing::new(capacity),
            window_size: 0,
            seq_no: 0,
            target_duration: 0.0,
            closed: false,
            media_type: None,
            start_time: 0.0,
            start_time_precise: false,
            discontinuity_seq: 0,
            iframe: false,
            duration_as_int: false,
            independent_segments: false,
            default_key: None,
            default_map: None,
            wv: None,
            custom: CustomTags::new(),
            args: String::new(),
            version: ProtocolVersion::new(),
            cache: None,
        };
        playlist.set_window_size(window_size)?;
        Ok(playlist)
    }

    /// Create a playlist from configuration.
    pub fn from_config(config: &MediaConfig) -> Result<Self> {
        let mut playlist = Self::new(config.window_size, config.capacity)?;
        playlist.duration_as_int(config.duration_as_int);
        playlist.set_independent_segments(config.independent_segments);
        if let Some(media_type) = config.playlist_type {
            playlist.set_media_type(media_type);
        }
        if let Some(args) = &config.args {
            playlist.set_args(args.clone());
        }
        Ok(playlist)
    }

    /// Wrap the playlist for sharing with master playlist variants.
    pub fn into_shared(self) -> SharedMediaPlaylist {
        Arc::new(RwLock::new(self))
    }

    // ── Segment list ────────────────────────────────────────────────────────

    /// Append a new segment at the tail.
    pub fn append(&mut self, uri: impl Into<String>, duration: f64, title: impl Into<String>) -> Result<()> {
        self.append_segment(MediaSegment::new(uri, duration, title))
    }

    /// Append a prepared segment at the tail. Its `seq_id` is overwritten.
    pub fn append_segment(&mut self, segment: MediaSegment) -> Result<()> {
        let duration = segment.duration;
        let required = segment_version(&segment);
        let seq_id = self.segments.push(segment, self.seq_no)?;
        self.version.require(required);
        self.raise_target_duration(duration);
        tracing::trace!(seq_id, duration, "appended media segment");
        self.reset_cache();
        Ok(())
    }

    /// Insert segments in bulk.
    ///
    /// `at_seq_id` of 0, or one not below the live count, appends at the
    /// end; otherwise the segments go in front of position `at_seq_id - 1`.
    /// The inserted run is renumbered from its index + 1 and everything after
    /// it is moved up by the inserted length.
    pub fn insert_segments(&mut self, segments: Vec<MediaSegment>, at_seq_id: u64) -> Result<()> {
        let max_duration = segments.iter().map(|s| s.duration).fold(0.0_f64, f64::max);
        let required = segments.iter().map(segment_version).fold(version::MIN_VERSION, u8::max);
        let added = segments.len();
        let index = self.segments.insert(segments, at_seq_id)?;
        self.version.require(required);
        self.raise_target_duration(max_duration);
        tracing::debug!(
            index,
            added,
            capacity = self.segments.capacity(),
            "inserted media segments"
        );
        self.reset_cache();
        Ok(())
    }

    /// Replace every segment with `segments`.
    ///
    /// Capacity becomes the list length and the segments keep their
    /// sequence ids. A window larger than the new capacity is clamped.
    pub fn set_segments(&mut self, segments: Vec<MediaSegment>) {
        let max_duration = segments.iter().map(|s| s.duration).fold(0.0_f64, f64::max);
        let required = segments.iter().map(segment_version).fold(version::MIN_VERSION, u8::max);
        self.segments.replace(segments);
        self.version.require(required);
        if self.window_size > self.segments.capacity() {
            tracing::warn!(
                window_size = self.window_size,
                capacity = self.segments.capacity(),
                "window size clamped to new segment count"
            );
            self.window_size = self.segments.capacity();
        }
        self.raise_target_duration(max_duration);
        tracing::debug!(count = self.segments.len(), "replaced media segments");
        self.reset_cache();
    }

    /// Drop the oldest segment. While the playlist is open the media
    /// sequence number moves along with it.
    pub fn remove(&mut self) -> Result<()> {
        let removed = self.segments.pop_front()?;
        if !self.closed {
            self.seq_no += 1;
        }
        tracing::trace!(seq_id = removed.seq_id, "removed media segment");
        self.reset_cache();
        Ok(())
    }

    /// Append a segment, first evicting the oldest one when an open
    /// playlist has filled its window.
    pub fn slide(&mut self, uri: impl Into<String>, duration: f64, title: impl Into<String>) -> Result<()> {
        let segment = MediaSegment::new(uri, duration, title);
        let evict = !self.closed && !self.segments.is_empty() && self.segments.len() >= self.window_size;
        if !evict && self.segments.is_full() {
            return Err(PlaylistError::PlaylistFull);
        }
        if evict {
            self.remove()?;
        }
        self.append_segment(segment)
    }

    /// Mark the playlist as finished. A cached encoding gets the end marker
    /// appended instead of being rebuilt.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(cached) = self.cache.take() {
            let mut buf = BytesMut::with_capacity(cached.len() + END_LIST.len());
            buf.extend_from_slice(&cached);
            buf.extend_from_slice(END_LIST.as_bytes());
            self.cache = Some(buf.freeze());
        }
        tracing::debug!(count = self.segments.len(), "closed media playlist");
    }

    // ── Playlist-wide attributes ────────────────────────────────────────────

    pub fn set_window_size(&mut self, window_size: usize) -> Result<()> {
        let capacity = self.segments.capacity();
        if window_size > capacity {
            return Err(PlaylistError::WindowSizeExceedsCapacity {
                window: window_size,
                capacity,
            });
        }
        self.window_size = window_size;
        tracing::debug!(window_size, "media playlist window size set");
        self.reset_cache();
        Ok(())
    }

    /// Write `EXTINF` durations as whole seconds (rounded up).
    pub fn duration_as_int(&mut self, yes: bool) {
        if yes {
            self.version.require(version::VERSION_INTEGER_DURATION);
        }
        self.duration_as_int = yes;
        self.reset_cache();
    }

    /// Set the key written once in the playlist header.
    ///
    /// Pass a clone of the returned handle to [`MediaPlaylist::set_key`] to
    /// mark a segment as using the default key without repeating the tag.
    pub fn set_default_key(&mut self, key: impl Into<Arc<Key>>) -> Arc<Key> {
        let key = key.into();
        if key.uses_keyformat() {
            self.version.require(version::VERSION_KEYFORMAT);
        }
        self.default_key = Some(Arc::clone(&key));
        self.reset_cache();
        key
    }

    /// Set the initialization section used by every segment.
    pub fn set_default_map(&mut self, map: Map) {
        self.version.require(version::VERSION_MAP);
        self.default_map = Some(map);
        self.reset_cache();
    }

    pub fn set_iframe_only(&mut self) {
        self.version.require(version::VERSION_IFRAMES_ONLY);
        self.iframe = true;
        self.reset_cache();
    }

    pub fn set_media_type(&mut self, media_type: MediaType) {
        self.media_type = Some(media_type);
        self.reset_cache();
    }

    /// `EXT-X-START` offset in seconds; zero leaves the tag out.
    pub fn set_start_time(&mut self, offset: f64, precise: bool) {
        self.start_time = offset;
        self.start_time_precise = precise;
        self.reset_cache();
    }

    pub fn set_discontinuity_sequence(&mut self, seq: u64) {
        self.discontinuity_seq = seq;
        self.reset_cache();
    }

    pub fn set_widevine(&mut self, wv: WvInfo) {
        self.wv = Some(wv);
        self.reset_cache();
    }

    /// Query string appended (after `?`) to every segment URI.
    pub fn set_args(&mut self, args: impl Into<String>) {
        self.args = args.into();
        self.reset_cache();
    }

    pub fn set_independent_segments(&mut self, yes: bool) {
        self.independent_segments = yes;
        self.reset_cache();
    }

    /// Override the protocol version. Later features may raise it again.
    pub fn set_version(&mut self, ver: u8) {
        self.version.set(ver);
        self.reset_cache();
    }

    pub fn set_custom_tag<T: CustomTag + 'static>(&mut self, tag: T) {
        self.custom.set(Arc::new(tag));
        self.reset_cache();
    }

    // ── Current segment ─────────────────────────────────────────────────────

    fn current_segment(&mut self) -> Result<&mut MediaSegment> {
        self.segments.last_mut().ok_or(PlaylistError::PlaylistEmpty)
    }

    /// Set the key of the most recent segment. A handle obtained from
    /// [`MediaPlaylist::set_default_key`] counts as "no key change"; any
    /// other key is written out, even one with identical fields.
    pub fn set_key(&mut self, key: impl Into<Arc<Key>>) -> Result<()> {
        let key = key.into();
        let uses_keyformat = key.uses_keyformat();
        self.current_segment()?.key = Some(key);
        if uses_keyformat {
            self.version.require(version::VERSION_KEYFORMAT);
        }
        self.reset_cache();
        Ok(())
    }

    pub fn set_map(&mut self, map: Map) -> Result<()> {
        self.current_segment()?.map = Some(map);
        self.version.require(version::VERSION_MAP);
        self.reset_cache();
        Ok(())
    }

    /// Set the byte range of the most recent segment.
    pub fn set_byte_range(&mut self, length: u64, offset: u64) -> Result<()> {
        self.current_segment()?.byte_range = Some(ByteRange { length, offset });
        self.version.require(version::VERSION_BYTE_RANGE);
        self.reset_cache();
        Ok(())
    }

    /// Attach a SCTE 67-2014 cue to the most recent segment.
    pub fn set_scte(&mut self, cue: impl Into<String>, id: Option<String>, time: f64) -> Result<()> {
        self.set_scte35(Scte::Legacy {
            cue: cue.into(),
            id,
            time,
        })
    }

    pub fn set_scte35(&mut self, scte: Scte) -> Result<()> {
        self.current_segment()?.scte = Some(scte);
        self.reset_cache();
        Ok(())
    }

    /// Replace the date ranges of the most recent segment.
    pub fn set_date_range(&mut self, date_ranges: Vec<DateRange>) -> Result<()> {
        if self.segments.is_empty() {
            return Err(PlaylistError::PlaylistEmpty);
        }
        if date_ranges.iter().any(|dr| dr.id.is_empty()) {
            return Err(PlaylistError::MissingDateRangeId);
        }
        self.current_segment()?.date_ranges = date_ranges;
        self.reset_cache();
        Ok(())
    }

    pub fn append_date_range(&mut self, date_range: DateRange) -> Result<()> {
        if self.segments.is_empty() {
            return Err(PlaylistError::PlaylistEmpty);
        }
        if date_range.id.is_empty() {
            return Err(PlaylistError::MissingDateRangeId);
        }
        self.current_segment()?.date_ranges.push(date_range);
        self.reset_cache();
        Ok(())
    }

    pub fn set_discontinuity(&mut self) -> Result<()> {
        self.current_segment()?.discontinuity = true;
        self.reset_cache();
        Ok(())
    }

    /// Mark the most recent segment as having no media data.
    pub fn set_gap(&mut self) -> Result<()> {
        self.current_segment()?.gap = true;
        self.reset_cache();
        Ok(())
    }

    pub fn set_program_date_time(&mut self, value: DateTime<FixedOffset>) -> Result<()> {
        self.current_segment()?.program_date_time = Some(value);
        self.reset_cache();
        Ok(())
    }

    pub fn set_custom_segment_tag<T: CustomTag + 'static>(&mut self, tag: T) -> Result<()> {
        self.current_segment()?.custom.set(Arc::new(tag));
        self.reset_cache();
        Ok(())
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    /// Number of live segments
    pub fn count(&self) -> usize {
        self.segments.len()
    }

    pub fn capacity(&self) -> usize {
        self.segments.capacity()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn media_sequence(&self) -> u64 {
        self.seq_no
    }

    pub fn target_duration(&self) -> f64 {
        self.target_duration
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn version(&self) -> u8 {
        self.version.get()
    }

    pub fn independent_segments(&self) -> bool {
        self.independent_segments
    }

    pub fn default_key(&self) -> Option<&Arc<Key>> {
        self.default_key.as_ref()
    }

    pub fn default_map(&self) -> Option<&Map> {
        self.default_map.as_ref()
    }

    pub fn custom_tags(&self) -> &CustomTags {
        &self.custom
    }

    /// Live segments, oldest first.
    pub fn segments(&self) -> impl Iterator<Item = &MediaSegment> + '_ {
        self.segments.iter()
    }

    /// The most recently appended segment.
    pub fn last_segment(&self) -> Option<&MediaSegment> {
        self.segments.last()
    }

    // ── Encoding ────────────────────────────────────────────────────────────

    /// Drop the cached encoding; the next `encode` rebuilds it.
    pub fn reset_cache(&mut self) {
        self.cache = None;
    }

    /// Encode the playlist, reusing the cached output when nothing changed
    /// since the previous call. The returned `Bytes` shares the cached
    /// allocation.
    pub fn encode(&mut self) -> Bytes {
        if let Some(cached) = &self.cache {
            tracing::trace!(len = cached.len(), "media playlist cache hit");
            return cached.clone();
        }
        let output = encode::encode_media(self);
        tracing::trace!(len = output.len(), "media playlist encoded");
        self.cache = Some(output.clone());
        output
    }

    fn raise_target_duration(&mut self, duration: f64) {
        let ceiled = duration.ceil();
        if ceiled > self.target_duration {
            self.target_duration = ceiled;
        }
    }
}

/// Lowest version able to carry the per-segment features `segment` uses.
fn segment_version(segment: &MediaSegment) -> u8 {
    let mut required = version::MIN_VERSION;
    if segment.byte_range.is_some() {
        required = required.max(version::VERSION_BYTE_RANGE);
    }
    if segment.map.is_some() {
        required = required.max(version::VERSION_MAP);
    }
    if segment.key.as_ref().map_or(false, |key| key.uses_keyformat()) {
        required = required.max(version::VERSION_KEYFORMAT);
    }
    required
}

impl fmt::Display for MediaPlaylist {
    /// Render the current state without touching the cache.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let output = encode::encode_media(self);
        f.write_str(&String::from_utf8_lossy(&output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::custom::SimpleTag;

    fn live(window: usize, capacity: usize) -> MediaPlaylist {
        MediaPlaylist::new(window, capacity).unwrap()
    }

    #[test]
    fn test_window_larger_than_capacity() {
        let err = MediaPlaylist::new(5, 3).unwrap_err();
        assert!(matches!(
            err,
            PlaylistError::WindowSizeExceedsCapacity {
                window: 5,
                capacity: 3
            }
        ));

        let mut p = live(2, 3);
        assert!(p.set_window_size(4).is_err());
        assert_eq!(p.window_size(), 2);
    }

    #[test]
    fn test_append_until_full() {
        let mut p = live(3, 3);
        for i in 0..3 {
            p.append(format!("{}.ts", i), 4.0, "").unwrap();
        }
        assert!(matches!(p.append("3.ts", 4.0, ""), Err(PlaylistError::PlaylistFull)));
        let ids: Vec<u64> = p.segments().map(|s| s.seq_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_remove_advances_sequence_only_while_open() {
        let mut p = live(3, 3);
        assert!(matches!(p.remove(), Err(PlaylistError::PlaylistEmpty)));

        p.append("a.ts", 4.0, "").unwrap();
        p.append("b.ts", 4.0, "").unwrap();
        p.remove().unwrap();
        assert_eq!(p.media_sequence(), 1);

        p.close();
        p.remove().unwrap();
        assert_eq!(p.media_sequence(), 1);
        assert_eq!(p.count(), 0);
    }

    #[test]
    fn test_empty_after_removing_everything_then_append() {
        let mut p = live(0, 2);
        p.append("a.ts", 4.0, "").unwrap();
        p.append("b.ts", 4.0, "").unwrap();
        p.remove().unwrap();
        p.remove().unwrap();
        assert_eq!(p.count(), 0);

        p.append("c.ts", 4.0, "").unwrap();
        assert_eq!(p.last_segment().unwrap().seq_id, 2);
    }

    #[test]
    fn test_slide_keeps_window() {
        let mut p = live(3, 5);
        for i in 0..10 {
            p.slide(format!("{}.ts", i), 2.0, "").unwrap();
            assert!(p.count() <= 3);
        }
        assert_eq!(p.count(), 3);
        assert_eq!(p.media_sequence(), 7);
        let uris: Vec<&str> = p.segments().map(|s| s.uri.as_str()).collect();
        assert_eq!(uris, vec!["7.ts", "8.ts", "9.ts"]);
    }

    #[test]
    fn test_slide_with_zero_window_keeps_one() {
        let mut p = live(0, 2);
        for i in 0..4 {
            p.slide(format!("{}.ts", i), 2.0, "").unwrap();
        }
        assert_eq!(p.count(), 1);
    }

    #[test]
    fn test_slide_on_full_closed_playlist_fails_untouched() {
        let mut p = live(1, 1);
        p.append("a.ts", 2.0, "").unwrap();
        p.close();
        let before = p.encode();
        assert!(matches!(p.slide("b.ts", 2.0, ""), Err(PlaylistError::PlaylistFull)));
        assert_eq!(p.count(), 1);
        assert_eq!(p.encode().as_ptr(), before.as_ptr());
    }

    #[test]
    fn test_target_duration_never_decreases() {
        let mut p = live(3, 3);
        p.append("a.ts", 9.2, "").unwrap();
        p.append("b.ts", 4.0, "").unwrap();
        assert_eq!(p.target_duration(), 10.0);
        p.remove().unwrap();
        assert_eq!(p.target_duration(), 10.0);
        p.append("c.ts", 3.0, "").unwrap();
        assert_eq!(p.target_duration(), 10.0);
    }

    #[test]
    fn test_segment_setters_need_a_segment() {
        let mut p = live(3, 3);
        assert!(matches!(p.set_key(Key::new("AES-128", "k")), Err(PlaylistError::PlaylistEmpty)));
        assert!(matches!(p.set_map(Map::new("init.mp4", 0, 0)), Err(PlaylistError::PlaylistEmpty)));
        assert!(matches!(p.set_byte_range(10, 0), Err(PlaylistError::PlaylistEmpty)));
        assert!(matches!(p.set_scte("cue", None, 0.0), Err(PlaylistError::PlaylistEmpty)));
        assert!(matches!(p.set_discontinuity(), Err(PlaylistError::PlaylistEmpty)));
        assert!(matches!(p.set_gap(), Err(PlaylistError::PlaylistEmpty)));
        assert!(matches!(
            p.append_date_range(DateRange::new("x")),
            Err(PlaylistError::PlaylistEmpty)
        ));
        assert!(matches!(
            p.set_custom_segment_tag(SimpleTag::new("#X", None)),
            Err(PlaylistError::PlaylistEmpty)
        ));
        // Failed setters raise nothing.
        assert_eq!(p.version(), version::MIN_VERSION);
    }

    #[test]
    fn test_date_range_requires_id() {
        let mut p = live(3, 3);
        p.append("a.ts", 4.0, "").unwrap();
        p.append_date_range(DateRange::new("ok")).unwrap();

        let before = p.encode();
        let result = p.set_date_range(vec![DateRange::new("x"), DateRange::default()]);
        assert!(matches!(result, Err(PlaylistError::MissingDateRangeId)));
        assert_eq!(p.last_segment().unwrap().date_ranges.len(), 1);
        assert_eq!(p.encode().as_ptr(), before.as_ptr());

        assert!(matches!(
            p.append_date_range(DateRange::default()),
            Err(PlaylistError::MissingDateRangeId)
        ));
    }

    #[test]
    fn test_version_features() {
        let mut p = live(3, 3);
        p.duration_as_int(true);
        assert_eq!(p.version(), 3);

        p.set_iframe_only();
        assert_eq!(p.version(), 4);

        p.set_default_key(Key::new("AES-128", "key.bin"));
        assert_eq!(p.version(), 4);
        p.set_default_key(Key::new("SAMPLE-AES", "skd://k").with_keyformat("com.apple.streamingkeydelivery", "1"));
        assert_eq!(p.version(), 5);

        let mut q = live(3, 3);
        q.append("a.ts", 4.0, "").unwrap();
        q.set_byte_range(100, 0).unwrap();
        assert_eq!(q.version(), 4);
        q.set_map(Map::new("init.mp4", 0, 0)).unwrap();
        assert_eq!(q.version(), 5);

        let mut r = live(3, 3);
        r.set_default_map(Map::new("init.mp4", 720, 0));
        assert_eq!(r.version(), 5);
    }

    #[test]
    fn test_prepared_segments_raise_version() {
        let mut p = live(3, 3);
        let mut seg = MediaSegment::new("a.ts", 4.0, "");
        seg.byte_range = Some(ByteRange { length: 100, offset: 0 });
        p.append_segment(seg).unwrap();
        assert_eq!(p.version(), 4);

        let mut seg = MediaSegment::new("b.ts", 4.0, "");
        seg.map = Some(Map::new("init.mp4", 0, 0));
        seg.key = Some(Arc::new(
            Key::new("SAMPLE-AES", "skd://k").with_keyformat("com.apple.streamingkeydelivery", "1"),
        ));
        p.append_segment(seg).unwrap();
        assert_eq!(p.version(), 5);
        assert!(p.encode().starts_with(b"#EXTM3U\n#EXT-X-VERSION:5\n"));

        let mut q = live(0, 2);
        let mut seg = MediaSegment::new("c.ts", 4.0, "");
        seg.byte_range = Some(ByteRange { length: 10, offset: 0 });
        q.insert_segments(vec![seg], 0).unwrap();
        assert_eq!(q.version(), 4);

        let mut r = live(0, 2);
        let mut seg = MediaSegment::new("d.ts", 4.0, "");
        seg.map = Some(Map::new("init.mp4", 0, 0));
        r.set_segments(vec![seg]);
        assert_eq!(r.version(), 5);

        // A rejected segment leaves the version alone.
        let mut full = live(0, 0);
        let mut seg = MediaSegment::new("e.ts", 4.0, "");
        seg.map = Some(Map::new("init.mp4", 0, 0));
        assert!(matches!(full.append_segment(seg), Err(PlaylistError::PlaylistFull)));
        assert_eq!(full.version(), 3);
    }

    #[test]
    fn test_encode_is_cached_until_mutation() {
        let mut p = live(3, 3);
        p.append("a.ts", 4.0, "").unwrap();
        let first = p.encode();
        let second = p.encode();
        assert_eq!(first.as_ptr(), second.as_ptr());

        p.append("b.ts", 4.0, "").unwrap();
        let third = p.encode();
        assert_ne!(first, third);
    }

    #[test]
    fn test_close_appends_to_cache() {
        let mut p = live(3, 3);
        p.append("a.ts", 4.0, "").unwrap();
        let open = p.encode();
        p.close();
        let closed = p.encode();
        assert!(closed.starts_with(&open));
        assert!(closed.ends_with(b"#EXT-X-ENDLIST\n"));

        p.close();
        let text = String::from_utf8(p.encode().to_vec()).unwrap();
        assert_eq!(text.matches("#EXT-X-ENDLIST").count(), 1);

        p.reset_cache();
        assert_eq!(p.encode(), closed);
    }

    #[test]
    fn test_set_segments_replaces_buffer() {
        let mut p = live(4, 8);
        p.append("old.ts", 4.0, "").unwrap();

        let mut a = MediaSegment::new("a.ts", 6.5, "");
        a.seq_id = 20;
        let mut b = MediaSegment::new("b.ts", 6.0, "");
        b.seq_id = 21;
        p.set_segments(vec![a, b]);

        assert_eq!(p.count(), 2);
        assert_eq!(p.capacity(), 2);
        assert_eq!(p.window_size(), 2);
        assert_eq!(p.target_duration(), 7.0);
        assert!(matches!(p.append("c.ts", 1.0, ""), Err(PlaylistError::PlaylistFull)));
        assert_eq!(p.last_segment().unwrap().uri, "b.ts");
    }

    #[test]
    fn test_insert_numbers_from_position_after_removals() {
        let mut p = live(0, 4);
        for uri in ["a.ts", "b.ts", "c.ts"] {
            p.append(uri, 4.0, "").unwrap();
        }
        p.remove().unwrap();
        p.remove().unwrap();
        p.append("d.ts", 4.0, "").unwrap();
        assert_eq!(p.media_sequence(), 2);
        assert_eq!(p.segments().map(|s| s.seq_id).collect::<Vec<_>>(), vec![2, 3]);

        // Inserted ids follow the live position, not the media sequence.
        p.insert_segments(vec![MediaSegment::new("x.ts", 4.0, "")], 0).unwrap();
        let ids: Vec<u64> = p.segments().map(|s| s.seq_id).collect();
        assert_eq!(ids, vec![2, 3, 3]);
        assert_eq!(p.last_segment().map(|s| s.uri.as_str()), Some("x.ts"));
    }

    #[test]
    fn test_insert_segments_at_zero_appends() {
        let mut p = live(0, 3);
        for uri in ["a.ts", "b.ts", "c.ts"] {
            p.append(uri, 4.0, "").unwrap();
        }
        p.insert_segments(vec![MediaSegment::new("x.ts", 12.5, "")], 0).unwrap();

        let got: Vec<(String, u64)> = p.segments().map(|s| (s.uri.clone(), s.seq_id)).collect();
        assert_eq!(got[..3], [("a.ts".to_string(), 0), ("b.ts".to_string(), 1), ("c.ts".to_string(), 2)]);
        assert_eq!(got[3], ("x.ts".to_string(), 4));
        assert_eq!(p.capacity(), 4);
        assert_eq!(p.target_duration(), 13.0);
        assert!(matches!(p.insert_segments(Vec::new(), 0), Err(PlaylistError::PlaylistEmpty)));
    }
}
