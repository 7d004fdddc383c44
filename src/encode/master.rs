//! Master playlist encoder

use bytes::Bytes;
use std::collections::HashSet;

use super::{format_fixed3, push_plain, push_quoted, push_uri};
use crate::playlist::master::{MasterPlaylist, Variant};
use crate::playlist::types::{Alternative, ClosedCaptions, RenditionType, SessionData};

/// Encode a master playlist.
///
/// Session data and `EXT-X-MEDIA` entries are written once per unique key;
/// later duplicates are dropped from the output only.
pub fn encode_master(playlist: &MasterPlaylist) -> Bytes {
    let mut output = String::new();

    output.push_str("#EXTM3U\n");
    output.push_str(&format!("#EXT-X-VERSION:{}\n", playlist.version));

    if playlist.independent_segments {
        output.push_str("#EXT-X-INDEPENDENT-SEGMENTS\n");
    }

    playlist.custom.write_to(&mut output);

    let mut languages_written: HashSet<(String, String)> = HashSet::new();
    for data in &playlist.session_data {
        // Entries without a language are never treated as duplicates.
        if let Some(language) = &data.language {
            let key = (data.data_id.to_lowercase(), language.to_lowercase());
            if !languages_written.insert(key) {
                continue;
            }
        }
        write_session_data(&mut output, data);
    }

    let mut alternatives_written: HashSet<(RenditionType, &str, &str, Option<&str>)> = HashSet::new();
    for variant in &playlist.variants {
        for alt in &variant.params.alternatives {
            let key = (alt.kind, alt.group_id.as_str(), alt.name.as_str(), alt.language.as_deref());
            if alternatives_written.insert(key) {
                write_alternative(&mut output, alt);
            }
        }
    }

    for variant in &playlist.variants {
        if variant.params.iframe {
            write_iframe_stream(&mut output, variant);
        } else {
            write_stream(&mut output, variant, &playlist.args);
        }
    }

    Bytes::from(output)
}

fn write_session_data(output: &mut String, data: &SessionData) {
    output.push_str(&format!("#EXT-X-SESSION-DATA:DATA-ID=\"{}\"", data.data_id));
    // VALUE and URI are exclusive; VALUE wins.
    match (&data.value, &data.uri) {
        (Some(value), _) => push_quoted(output, "VALUE", value),
        (None, Some(uri)) => push_quoted(output, "URI", uri),
        (None, None) => {}
    }
    if let Some(language) = &data.language {
        push_quoted(output, "LANGUAGE", language);
    }
    output.push('\n');
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "YES"
    } else {
        "NO"
    }
}

fn write_alternative(output: &mut String, alt: &Alternative) {
    output.push_str(&format!("#EXT-X-MEDIA:TYPE={}", alt.kind));
    if !alt.group_id.is_empty() {
        push_quoted(output, "GROUP-ID", &alt.group_id);
    }
    if !alt.name.is_empty() {
        push_quoted(output, "NAME", &alt.name);
    }
    push_plain(output, "DEFAULT", yes_no(alt.default));
    if let Some(autoselect) = alt.autoselect {
        push_plain(output, "AUTOSELECT", yes_no(autoselect));
    }
    if let Some(language) = &alt.language {
        push_quoted(output, "LANGUAGE", language);
    }
    if let Some(forced) = alt.forced {
        push_plain(output, "FORCED", yes_no(forced));
    }
    if let Some(characteristics) = &alt.characteristics {
        push_quoted(output, "CHARACTERISTICS", characteristics);
    }
    if let Some(subtitles) = &alt.subtitles {
        push_quoted(output, "SUBTITLES", subtitles);
    }
    if let Some(uri) = &alt.uri {
        push_quoted(output, "URI", uri);
    }
    if let Some(instream_id) = &alt.instream_id {
        push_quoted(output, "INSTREAM-ID", instream_id);
    }
    if let Some(channels) = &alt.channels {
        push_quoted(output, "CHANNELS", channels);
    }
    output.push('\n');
}

/// `#EXT-X-I-FRAME-STREAM-INF`: attributes only, the URI is one of them.
fn write_iframe_stream(output: &mut String, variant: &Variant) {
    let params = &variant.params;
    output.push_str(&format!(
        "#EXT-X-I-FRAME-STREAM-INF:PROGRAM-ID={},BANDWIDTH={}",
        params.program_id, params.bandwidth
    ));
    if let Some(average) = params.average_bandwidth.filter(|b| *b != 0) {
        push_plain(output, "AVERAGE-BANDWIDTH", &average.to_string());
    }
    if let Some(codecs) = &params.codecs {
        push_quoted(output, "CODECS", codecs);
    }
    if let Some(resolution) = &params.resolution {
        push_plain(output, "RESOLUTION", &resolution.to_string());
    }
    if let Some(video) = &params.video {
        push_quoted(output, "VIDEO", video);
    }
    if let Some(range) = &params.video_range {
        push_plain(output, "VIDEO-RANGE", range);
    }
    if let Some(hdcp) = &params.hdcp_level {
        push_plain(output, "HDCP-LEVEL", hdcp);
    }
    if !variant.uri.is_empty() {
        push_quoted(output, "URI", &variant.uri);
    }
    output.push('\n');
}

/// `#EXT-X-STREAM-INF` followed by the variant URI line.
fn write_stream(output: &mut String, variant: &Variant, args: &str) {
    let params = &variant.params;
    output.push_str(&format!(
        "#EXT-X-STREAM-INF:PROGRAM-ID={},BANDWIDTH={}",
        params.program_id, params.bandwidth
    ));
    if let Some(average) = params.average_bandwidth.filter(|b| *b != 0) {
        push_plain(output, "AVERAGE-BANDWIDTH", &average.to_string());
    }
    if let Some(codecs) = &params.codecs {
        push_quoted(output, "CODECS", codecs);
    }
    if let Some(resolution) = &params.resolution {
        push_plain(output, "RESOLUTION", &resolution.to_string());
    }
    if let Some(audio) = &params.audio {
        push_quoted(output, "AUDIO", audio);
    }
    if let Some(video) = &params.video {
        push_quoted(output, "VIDEO", video);
    }
    match &params.captions {
        Some(ClosedCaptions::None) => push_plain(output, "CLOSED-CAPTIONS", "NONE"),
        Some(ClosedCaptions::GroupId(group)) => push_quoted(output, "CLOSED-CAPTIONS", group),
        None => {}
    }
    if let Some(subtitles) = &params.subtitles {
        push_quoted(output, "SUBTITLES", subtitles);
    }
    if let Some(name) = &params.name {
        push_quoted(output, "NAME", name);
    }
    if let Some(rate) = params.frame_rate.filter(|r| *r != 0.0) {
        push_plain(output, "FRAME-RATE", &format_fixed3(rate));
    }
    if let Some(range) = &params.video_range {
        push_plain(output, "VIDEO-RANGE", range);
    }
    if let Some(hdcp) = &params.hdcp_level {
        push_plain(output, "HDCP-LEVEL", hdcp);
    }
    output.push('\n');
    push_uri(output, &variant.uri, args, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::custom::SimpleTag;
    use crate::playlist::types::{RenditionType, Resolution, VariantParams};

    fn body(playlist: &MasterPlaylist) -> String {
        String::from_utf8(encode_master(playlist).to_vec()).unwrap()
    }

    fn english_audio() -> Alternative {
        let mut alt = Alternative::new(RenditionType::Audio, "aac", "English");
        alt.default = true;
        alt.autoselect = Some(true);
        alt.language = Some("en".to_string());
        alt.uri = Some("audio/en.m3u8".to_string());
        alt
    }

    #[test]
    fn test_full_master() {
        let mut p = MasterPlaylist::new();
        p.set_independent_segments(true);
        p.set_custom_tag(SimpleTag::new("#X-MASTER", Some("1".to_string())));
        p.set_args("session=7");
        p.set_session_data(SessionData {
            data_id: "com.example.title".to_string(),
            value: Some("Movie".to_string()),
            uri: Some("ignored.json".to_string()),
            language: Some("en".to_string()),
        });
        p.append(
            "hi/index.m3u8",
            None,
            VariantParams {
                program_id: 1,
                bandwidth: 5_000_000,
                average_bandwidth: Some(4_000_000),
                codecs: Some("avc1.640028,mp4a.40.2".to_string()),
                resolution: Some(Resolution {
                    width: 1920,
                    height: 1080,
                }),
                audio: Some("aac".to_string()),
                captions: Some(ClosedCaptions::None),
                name: Some("1080p".to_string()),
                frame_rate: Some(29.97),
                video_range: Some("SDR".to_string()),
                alternatives: vec![english_audio()],
                ..Default::default()
            },
        );
        p.append(
            "hi/iframe.m3u8",
            None,
            VariantParams {
                program_id: 1,
                bandwidth: 500_000,
                resolution: Some(Resolution {
                    width: 1920,
                    height: 1080,
                }),
                hdcp_level: Some("NONE".to_string()),
                iframe: true,
                ..Default::default()
            },
        );

        assert_eq!(
            body(&p),
            "#EXTM3U\n\
             #EXT-X-VERSION:4\n\
             #EXT-X-INDEPENDENT-SEGMENTS\n\
             #X-MASTER:1\n\
             #EXT-X-SESSION-DATA:DATA-ID=\"com.example.title\",VALUE=\"Movie\",LANGUAGE=\"en\"\n\
             #EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aac\",NAME=\"English\",DEFAULT=YES,AUTOSELECT=YES,LANGUAGE=\"en\",URI=\"audio/en.m3u8\"\n\
             #EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=5000000,AVERAGE-BANDWIDTH=4000000,CODECS=\"avc1.640028,mp4a.40.2\",RESOLUTION=1920x1080,AUDIO=\"aac\",CLOSED-CAPTIONS=NONE,NAME=\"1080p\",FRAME-RATE=29.970,VIDEO-RANGE=SDR\n\
             hi/index.m3u8?session=7\n\
             #EXT-X-I-FRAME-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=500000,RESOLUTION=1920x1080,HDCP-LEVEL=NONE,URI=\"hi/iframe.m3u8\"\n"
        );
    }

    #[test]
    fn test_shared_alternative_written_once() {
        let mut p = MasterPlaylist::new();
        for (uri, bandwidth) in [("low.m3u8", 800_000), ("high.m3u8", 3_000_000)] {
            p.append(
                uri,
                None,
                VariantParams {
                    bandwidth,
                    audio: Some("aac".to_string()),
                    alternatives: vec![english_audio()],
                    ..Default::default()
                },
            );
        }

        let text = body(&p);
        assert_eq!(text.matches("#EXT-X-MEDIA:").count(), 1);
        assert_eq!(text.matches("#EXT-X-STREAM-INF:").count(), 2);
        assert_eq!(p.version(), 4);
    }

    #[test]
    fn test_alternatives_with_dashes_stay_distinct() {
        let mut p = MasterPlaylist::new();
        for (uri, group, name) in [("a.m3u8", "aac-hi", "en"), ("b.m3u8", "aac", "hi-en")] {
            p.append(
                uri,
                None,
                VariantParams {
                    alternatives: vec![Alternative::new(RenditionType::Audio, group, name)],
                    ..Default::default()
                },
            );
        }

        let text = body(&p);
        assert_eq!(text.matches("#EXT-X-MEDIA:").count(), 2);
        assert!(text.contains("GROUP-ID=\"aac-hi\",NAME=\"en\""));
        assert!(text.contains("GROUP-ID=\"aac\",NAME=\"hi-en\""));
    }

    #[test]
    fn test_session_data_dedup_is_case_insensitive() {
        let mut p = MasterPlaylist::new();
        let data = |id: &str, lang: Option<&str>, value: &str| SessionData {
            data_id: id.to_string(),
            value: Some(value.to_string()),
            uri: None,
            language: lang.map(str::to_string),
        };
        p.set_session_data(data("com.example.t", Some("en"), "first"));
        p.set_session_data(data("COM.EXAMPLE.T", Some("EN"), "second"));
        p.set_session_data(data("com.example.x", None, "a"));
        p.session_data_mut().push(data("com.example.x", None, "b"));

        let text = body(&p);
        assert!(text.contains("VALUE=\"first\""));
        assert!(!text.contains("VALUE=\"second\""));
        assert_eq!(text.matches("DATA-ID=\"com.example.x\"").count(), 2);
        assert_eq!(p.session_data().len(), 4);
    }

    #[test]
    fn test_session_data_uri_only() {
        let mut p = MasterPlaylist::new();
        p.set_session_data(SessionData {
            data_id: "com.example.lyrics".to_string(),
            uri: Some("lyrics.json".to_string()),
            ..Default::default()
        });
        assert!(body(&p).contains("#EXT-X-SESSION-DATA:DATA-ID=\"com.example.lyrics\",URI=\"lyrics.json\"\n"));
    }

    #[test]
    fn test_args_join_existing_query() {
        let mut p = MasterPlaylist::new();
        p.set_args("token=1");
        p.append("a.m3u8?x=y", None, VariantParams::default());
        let text = body(&p);
        assert!(text.contains("\na.m3u8?x=y&token=1\n"));
    }

    #[test]
    fn test_closed_captions_group_is_quoted() {
        let mut p = MasterPlaylist::new();
        p.append(
            "a.m3u8",
            None,
            VariantParams {
                captions: Some(ClosedCaptions::GroupId("cc".to_string())),
                subtitles: Some("subs".to_string()),
                ..Default::default()
            },
        );
        assert!(body(&p).contains(",CLOSED-CAPTIONS=\"cc\",SUBTITLES=\"subs\""));
    }
}
