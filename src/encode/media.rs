//! Media playlist encoder

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;

use super::{format_datetime, format_float, push_plain, push_quoted, push_uri, write_key, write_map};
use crate::playlist::media::MediaPlaylist;
use crate::playlist::types::{CuePhase, DateRange, MediaSegment, MediaType, Scte, WvInfo};

/// Encode a media playlist.
///
/// Writes the header, then the newest `window_size` live segments (all of
/// them when the window is 0), then `#EXT-X-ENDLIST` for closed playlists.
pub fn encode_media(playlist: &MediaPlaylist) -> Bytes {
    let mut output = String::new();

    output.push_str("#EXTM3U\n");
    output.push_str(&format!("#EXT-X-VERSION:{}\n", playlist.version));

    if playlist.independent_segments {
        output.push_str("#EXT-X-INDEPENDENT-SEGMENTS\n");
    }

    playlist.custom.write_to(&mut output);

    if let Some(key) = &playlist.default_key {
        write_key(&mut output, key);
    }
    if let Some(map) = &playlist.default_map {
        write_map(&mut output, map);
    }

    match playlist.media_type {
        Some(MediaType::Event) => {
            output.push_str("#EXT-X-PLAYLIST-TYPE:EVENT\n");
            // Legacy clients otherwise cache a growing event playlist.
            output.push_str("#EXT-X-ALLOW-CACHE:NO\n");
        }
        Some(MediaType::Vod) => output.push_str("#EXT-X-PLAYLIST-TYPE:VOD\n"),
        None => {}
    }

    output.push_str(&format!("#EXT-X-MEDIA-SEQUENCE:{}\n", playlist.seq_no));
    // EXT-X-TARGETDURATION must be an integer.
    output.push_str(&format!(
        "#EXT-X-TARGETDURATION:{}\n",
        playlist.target_duration.ceil() as i64
    ));

    if playlist.start_time > 0.0 {
        output.push_str(&format!(
            "#EXT-X-START:TIME-OFFSET={}",
            format_float(playlist.start_time)
        ));
        if playlist.start_time_precise {
            output.push_str(",PRECISE=YES");
        }
        output.push('\n');
    }
    if playlist.discontinuity_seq != 0 {
        output.push_str(&format!(
            "#EXT-X-DISCONTINUITY-SEQUENCE:{}\n",
            playlist.discontinuity_seq
        ));
    }
    if playlist.iframe {
        output.push_str("#EXT-X-I-FRAMES-ONLY\n");
    }
    if let Some(wv) = &playlist.wv {
        write_widevine(&mut output, wv);
    }

    let count = playlist.segments.len();
    let skip = if playlist.window_size > 0 && count > playlist.window_size {
        count - playlist.window_size
    } else {
        0
    };

    let mut durations: HashMap<u64, String> = HashMap::new();
    for segment in playlist.segments.iter().skip(skip) {
        write_segment(&mut output, playlist, segment, &mut durations);
    }

    if playlist.closed {
        output.push_str("#EXT-X-ENDLIST\n");
    }

    Bytes::from(output)
}

fn write_segment(
    output: &mut String,
    playlist: &MediaPlaylist,
    segment: &MediaSegment,
    durations: &mut HashMap<u64, String>,
) {
    if let Some(scte) = &segment.scte {
        write_scte(output, scte);
    }

    // A key is "changed" unless it is the very same handle as the default.
    if let Some(key) = &segment.key {
        let is_default = playlist
            .default_key
            .as_ref()
            .map_or(false, |default| Arc::ptr_eq(default, key));
        if !is_default {
            write_key(output, key);
        }
    }

    for date_range in &segment.date_ranges {
        write_date_range(output, date_range);
    }

    if segment.discontinuity {
        output.push_str("#EXT-X-DISCONTINUITY\n");
    }
    if segment.gap {
        output.push_str("#EXT-X-GAP\n");
    }

    // A playlist-wide map overrides per-segment maps.
    if playlist.default_map.is_none() {
        if let Some(map) = &segment.map {
            write_map(output, map);
        }
    }

    if let Some(pdt) = &segment.program_date_time {
        output.push_str(&format!("#EXT-X-PROGRAM-DATE-TIME:{}\n", format_datetime(pdt)));
    }

    if let Some(range) = &segment.byte_range {
        if range.length > 0 {
            output.push_str(&format!("#EXT-X-BYTERANGE:{}@{}\n", range.length, range.offset));
        }
    }

    segment.custom.write_to(output);

    let duration = durations
        .entry(segment.duration.to_bits())
        .or_insert_with(|| format_extinf(segment.duration, playlist.duration_as_int));
    output.push_str("#EXTINF:");
    output.push_str(duration);
    output.push(',');
    output.push_str(&segment.title);
    output.push('\n');

    push_uri(output, &segment.uri, &playlist.args, false);
}

/// Whole seconds for old players, three decimals otherwise.
fn format_extinf(duration: f64, as_int: bool) -> String {
    if as_int {
        format!("{}", duration.ceil() as i64)
    } else {
        format!("{:.3}", duration as f32)
    }
}

fn write_scte(output: &mut String, scte: &Scte) {
    match scte {
        Scte::Legacy { cue, id, time } => {
            output.push_str(&format!("#EXT-SCTE35:CUE=\"{}\"", cue));
            if let Some(id) = id {
                push_quoted(output, "ID", id);
            }
            if *time != 0.0 {
                push_plain(output, "TIME", &format_float(*time));
            }
            output.push('\n');
        }
        Scte::Oatcls {
            phase,
            cue,
            duration,
            elapsed,
        } => match phase {
            CuePhase::Start => {
                if !cue.is_empty() {
                    output.push_str(&format!("#EXT-OATCLS-SCTE35:{}\n", cue));
                }
                output.push_str(&format!("#EXT-X-CUE-OUT:{}\n", format_float(*duration)));
            }
            CuePhase::Mid => {
                output.push_str(&format!(
                    "#EXT-X-CUE-OUT-CONT:ElapsedTime={},Duration={},SCTE35={}\n",
                    format_float(*elapsed),
                    format_float(*duration),
                    cue
                ));
            }
            CuePhase::End => output.push_str("#EXT-X-CUE-IN\n"),
        },
    }
}

fn write_date_range(output: &mut String, dr: &DateRange) {
    output.push_str(&format!("#EXT-X-DATERANGE:ID=\"{}\"", dr.id));
    if let Some(class) = &dr.class {
        push_quoted(output, "CLASS", class);
    }
    if let Some(start) = &dr.start_date {
        push_quoted(output, "START-DATE", &format_datetime(start));
    }
    if let Some(end) = &dr.end_date {
        push_quoted(output, "END-DATE", &format_datetime(end));
    }
    if let Some(duration) = dr.duration {
        push_plain(output, "DURATION", &format_float(duration));
    }
    if let Some(planned) = dr.planned_duration {
        push_plain(output, "PLANNED-DURATION", &format_float(planned));
    }
    if let Some(cmd) = &dr.scte35_cmd {
        push_plain(output, "SCTE35-CMD", cmd);
    }
    if let Some(scte_in) = &dr.scte35_in {
        push_plain(output, "SCTE35-IN", scte_in);
    }
    if let Some(scte_out) = &dr.scte35_out {
        push_plain(output, "SCTE35-OUT", scte_out);
    }
    if dr.end_on_next {
        output.push_str(",END-ON-NEXT=YES");
    }
    if let Some(offset) = dr.resume_offset {
        push_plain(output, "X-RESUME-OFFSET", &format_float(offset));
    }
    if let Some(limit) = dr.playout_limit {
        push_plain(output, "X-PLAYOUT-LIMIT", &format_float(limit));
    }
    if let Some(snap) = &dr.snap {
        push_quoted(output, "X-SNAP", snap);
    }
    if let Some(restrict) = &dr.restrict {
        push_quoted(output, "X-RESTRICT", restrict);
    }
    if let Some(uri) = &dr.asset_uri {
        push_quoted(output, "X-ASSET-URI", uri);
    }
    if let Some(list) = &dr.asset_list {
        push_quoted(output, "X-ASSET-LIST", list);
    }
    for (name, value) in &dr.extensions {
        push_quoted(output, name, value);
    }
    output.push('\n');
}

fn write_widevine(output: &mut String, wv: &WvInfo) {
    let numeric = [
        ("#WV-AUDIO-CHANNELS", wv.audio_channels),
        ("#WV-AUDIO-FORMAT", wv.audio_format),
        ("#WV-AUDIO-PROFILE-IDC", wv.audio_profile_idc),
        ("#WV-AUDIO-SAMPLE-SIZE", wv.audio_sample_size),
        ("#WV-AUDIO-SAMPLING-FREQUENCY", wv.audio_sampling_frequency),
    ];
    for (tag, value) in numeric {
        if value != 0 {
            output.push_str(&format!("{} {}\n", tag, value));
        }
    }
    if !wv.cypher_version.is_empty() {
        output.push_str(&format!("#WV-CYPHER-VERSION {}\n", wv.cypher_version));
    }
    if !wv.ecm.is_empty() {
        output.push_str(&format!("#WV-ECM {}\n", wv.ecm));
    }
    let numeric = [
        ("#WV-VIDEO-FORMAT", wv.video_format),
        ("#WV-VIDEO-FRAME-RATE", wv.video_frame_rate),
        ("#WV-VIDEO-LEVEL-IDC", wv.video_level_idc),
        ("#WV-VIDEO-PROFILE-IDC", wv.video_profile_idc),
    ];
    for (tag, value) in numeric {
        if value != 0 {
            output.push_str(&format!("{} {}\n", tag, value));
        }
    }
    if !wv.video_resolution.is_empty() {
        output.push_str(&format!("#WV-VIDEO-RESOLUTION {}\n", wv.video_resolution));
    }
    if !wv.video_sar.is_empty() {
        output.push_str(&format!("#WV-VIDEO-SAR {}\n", wv.video_sar));
    }
}
