//! Master playlist parser.

use tracing::{debug, trace, warn};
use url::Url;

use crate::attributes::parse_attribute_list;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::key::XKey;
use crate::line::{Line, Tag};
use crate::model::{MasterPlaylist, MediaPlaylist};
use crate::observer::ManifestObserver;
use crate::source::{LineSource, ScopedSource, StringSource};

/// State threaded through the lines of one master playlist.
#[derive(Debug, Default)]
struct MasterParseState {
    pending: Option<MediaPlaylist>,
}

impl MasterParseState {
    fn consume<O>(
        &mut self,
        line_no: usize,
        raw: &str,
        master: &mut MasterPlaylist,
        observer: &mut O,
    ) where
        O: ManifestObserver + ?Sized,
    {
        match Line::classify(raw) {
            Line::Blank | Line::Comment(_) => {}
            Line::Tag(Tag::StreamInf(value)) => {
                if self.pending.is_some() {
                    debug!(line = line_no, "#EXT-X-STREAM-INF replaces a variant that never got a URI");
                }
                self.pending = Some(variant_from_stream_inf(value));
            }
            Line::Tag(Tag::SessionKey(value)) => {
                if let Some(key) = XKey::parse(value) {
                    master.session_keys.push(key.clone());
                    master.key = Some(key);
                }
            }
            Line::Tag(Tag::Unknown { name, .. }) => trace!(tag = name, "Ignoring tag"),
            Line::Tag(
                Tag::ExtM3u
                | Tag::Version(_)
                | Tag::TargetDuration(_)
                | Tag::MediaSequence(_)
                | Tag::Inf(_)
                | Tag::ByteRange(_)
                | Tag::Discontinuity
                | Tag::Key(_),
            ) => {}
            Line::Uri(path) => {
                let Some(mut variant) = self.pending.take() else {
                    debug!(line = line_no, path, "Ignoring URI without #EXT-X-STREAM-INF");
                    return;
                };
                variant.index = Some(master.playlists.len());
                variant.path = Some(path.to_string());
                trace!(bandwidth = variant.bandwidth, path, "Variant");
                master.playlists.push(variant);
                if let Some(variant) = master.playlists.last() {
                    observer.on_media_playlist(variant);
                }
            }
        }
    }
}

fn variant_from_stream_inf(value: &str) -> MediaPlaylist {
    let attributes = parse_attribute_list(value);
    for (name, value) in attributes.iter() {
        if !matches!(name, "PROGRAM-ID" | "BANDWIDTH" | "CODECS") {
            trace!(name, value, "Ignoring #EXT-X-STREAM-INF attribute");
        }
    }
    MediaPlaylist {
        program_id: attributes.get_u64("PROGRAM-ID").unwrap_or(0),
        bandwidth: attributes.get_u64("BANDWIDTH").unwrap_or(0),
        codec: attributes.get("CODECS").map(str::to_string),
        ..MediaPlaylist::new()
    }
}

/// Parse a master playlist from `source`.
///
/// The returned variants are stubs: their attributes and path are set but no
/// segments are parsed. `location` is recorded as the master's origin and is
/// what relative variant paths resolve against.
pub fn parse_master_playlist<S, O>(
    source: &mut S,
    location: Option<Url>,
    observer: &mut O,
) -> MasterPlaylist
where
    S: LineSource + ?Sized,
    O: ManifestObserver + ?Sized,
{
    let mut master = MasterPlaylist::new(location);
    let mut state = MasterParseState::default();
    for (idx, line) in ScopedSource::new(source).enumerate() {
        match line {
            Ok(raw) => state.consume(idx + 1, &raw, &mut master, observer),
            Err(e) => {
                let diagnostic = Diagnostic::new(idx + 1, "", DiagnosticKind::from_read_error(&e));
                warn!(%diagnostic, "Skipping unreadable master playlist line");
                observer.on_diagnostic(&diagnostic);
                master.diagnostics.push(diagnostic);
            }
        }
    }
    debug!(
        variants = master.playlists.len(),
        has_session_key = master.key.is_some(),
        "Parsed master playlist"
    );
    master
}

/// Parse an in-memory master playlist.
pub fn parse_master_playlist_str<O>(input: &str, observer: &mut O) -> MasterPlaylist
where
    O: ManifestObserver + ?Sized,
{
    parse_master_playlist(&mut StringSource::new(input), None, observer)
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;
    use crate::observer::OnPlaylist;
    use crate::source::tests::CountingSource;
    use crate::test_utils::init_test_tracing;

    fn parse(input: &str) -> MasterPlaylist {
        init_test_tracing!();
        parse_master_playlist_str(input, &mut ())
    }

    #[test]
    fn test_single_variant() {
        let master = parse("#EXTM3U\n#EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=200000\nlow/index.m3u8\n");
        assert_eq!(master.playlists().len(), 1);
        let variant = &master.playlists()[0];
        assert_eq!(variant.program_id, 1);
        assert_eq!(variant.bandwidth, 200_000);
        assert_eq!(variant.path.as_deref(), Some("low/index.m3u8"));
        assert_eq!(variant.codec, None);
        assert_eq!(variant.master_index(), Some(0));
        assert!(variant.segments().is_empty());
        assert_eq!(master.location, None);
    }

    #[test]
    fn test_variants_keep_manifest_order() {
        let master = parse(concat!(
            "#EXTM3U\n",
            "#EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH=1280000,CODECS=\"avc1.4d401f,mp4a.40.2\"\n",
            "mid/index.m3u8\n",
            "\n",
            "# a comment between variants\n",
            "#EXT-X-STREAM-INF:BANDWIDTH=137954,CODECS=\"mp4a.40.2\"\n",
            "http://cdn/audio/index.m3u8\n",
            "#EXT-X-STREAM-INF:BANDWIDTH=2560000\n",
            "high/index.m3u8\n",
        ));
        let paths: Vec<&str> = master
            .playlists()
            .iter()
            .filter_map(|p| p.path.as_deref())
            .collect();
        assert_eq!(
            paths,
            vec!["mid/index.m3u8", "http://cdn/audio/index.m3u8", "high/index.m3u8"]
        );

        let first = &master.playlists()[0];
        assert_eq!(first.codec.as_deref(), Some("avc1.4d401f,mp4a.40.2"));
        assert_eq!(first.bandwidth, 1_280_000);

        let second = &master.playlists()[1];
        assert_eq!(second.program_id, 0);
        assert_eq!(second.codec.as_deref(), Some("mp4a.40.2"));

        let indexes: Vec<Option<usize>> =
            master.playlists().iter().map(|p| p.master_index()).collect();
        assert_eq!(indexes, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn test_unparsable_numbers_default_to_zero() {
        let master = parse("#EXTM3U\n#EXT-X-STREAM-INF:PROGRAM-ID=one,BANDWIDTH=,FOO=bar\nv.m3u8\n");
        let variant = &master.playlists()[0];
        assert_eq!(variant.program_id, 0);
        assert_eq!(variant.bandwidth, 0);
    }

    #[test]
    fn test_uri_without_stream_inf_is_ignored() {
        let master = parse("#EXTM3U\norphan.m3u8\n#EXT-X-STREAM-INF:BANDWIDTH=1\nv.m3u8\nextra.m3u8\n");
        assert_eq!(master.playlists().len(), 1);
        assert_eq!(master.playlists()[0].path.as_deref(), Some("v.m3u8"));
        assert!(master.diagnostics().is_empty());
    }

    #[test]
    fn test_session_keys_last_wins() {
        let master = parse(concat!(
            "#EXTM3U\n",
            "#EXT-X-SESSION-KEY:METHOD=SAMPLE-AES,URI=\"skd://twelve\",KEYFORMAT=\"com.apple.streamingkeydelivery\",KEYFORMATVERSIONS=\"1\"\n",
            "#EXT-X-SESSION-KEY:METHOD=SAMPLE-AES,URI=\"data:text/plain;base64,AAAA\",KEYFORMAT=\"urn:uuid:edef8ba9-79d6-4ace-a3c8-27dcd51d21ed\"\n",
            "#EXT-X-SESSION-KEY:KEYFORMAT=\"broken\"\n",
            "#EXT-X-STREAM-INF:BANDWIDTH=1\n",
            "v.m3u8\n",
        ));
        let key = master.key.as_ref().unwrap();
        assert_eq!(key.uri, "data:text/plain;base64,AAAA");
        assert_eq!(master.session_keys.len(), 2);
        assert_eq!(master.session_keys[0].uri, "skd://twelve");
        assert_eq!(
            master.session_keys[0].key_format.as_deref(),
            Some("com.apple.streamingkeydelivery")
        );
    }

    #[test]
    fn test_observer_sees_variants_in_order() {
        let mut seen = Vec::new();
        parse_master_playlist_str(
            "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1\na.m3u8\n#EXT-X-STREAM-INF:BANDWIDTH=2\nb.m3u8\n",
            &mut OnPlaylist(|p: &MediaPlaylist| seen.push((p.bandwidth, p.path.clone()))),
        );
        assert_eq!(
            seen,
            vec![
                (1, Some("a.m3u8".to_string())),
                (2, Some("b.m3u8".to_string()))
            ]
        );
    }

    #[test]
    fn test_location_and_close() {
        let mut source = CountingSource {
            inner: StringSource::new("#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1\nsub/v.m3u8\n"),
            closed: 0,
        };
        let location = Url::parse("http://host/path/master.m3u8").unwrap();
        let master = parse_master_playlist(&mut source, Some(location), &mut ());
        assert_eq!(source.closed, 1);
        assert_eq!(
            master
                .playlist_location(&master.playlists()[0])
                .unwrap()
                .as_str(),
            "http://host/path/sub/v.m3u8"
        );
    }

    #[test]
    fn test_invalid_utf8_line_is_reported_and_skipped() {
        init_test_tracing!();
        let mut source = crate::source::BytesSource::new(
            "http://host/master.m3u8",
            b"#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1\n\xfe.m3u8\nv.m3u8\n".to_vec(),
        );
        let master = parse_master_playlist(&mut source, None, &mut ());
        assert_eq!(master.playlists().len(), 1);
        assert_eq!(master.playlists()[0].path.as_deref(), Some("v.m3u8"));
        assert_eq!(
            master.diagnostics(),
            &[Diagnostic::new(3, "", DiagnosticKind::InvalidUtf8)]
        );
    }

    #[test]
    fn test_media_tags_in_master_are_ignored() {
        let master = parse(concat!(
            "#EXTM3U\n",
            "#EXT-X-VERSION:3\n",
            "#EXT-X-TARGETDURATION:10\n",
            "#EXT-X-MEDIA-SEQUENCE:4\n",
            "#EXT-X-KEY:METHOD=AES-128,URI=\"k.bin\"\n",
            "#EXT-X-STREAM-INF:BANDWIDTH=9,RESOLUTION=640x360\n",
            "#EXTINF:1,\n",
            "#EXT-X-BYTERANGE:10@0\n",
            "#EXT-X-DISCONTINUITY\n",
            "v.m3u8\n",
        ));
        assert_eq!(master.playlists().len(), 1);
        let variant = &master.playlists()[0];
        assert_eq!(variant.bandwidth, 9);
        assert_eq!(variant.path.as_deref(), Some("v.m3u8"));
        assert!(variant.segments().is_empty());
        assert_eq!(master.key, None);
        assert!(master.diagnostics().is_empty());
    }
}
