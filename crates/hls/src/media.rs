//! Media playlist parser.

use tracing::{debug, trace, warn};

use crate::error::{Diagnostic, DiagnosticKind};
use crate::key::XKey;
use crate::line::{Line, Tag, int_value};
use crate::model::{MediaPlaylist, MediaSegment};
use crate::observer::ManifestObserver;
use crate::source::{LineSource, ScopedSource, StringSource};

/// A segment whose `#EXTINF` has been read but whose URI has not.
#[derive(Debug, Default)]
struct SegmentDraft {
    duration: Option<f64>,
    title: Option<String>,
    subrange_length: Option<u64>,
    subrange_start: Option<u64>,
    discontinuity: bool,
}

/// State threaded through the lines of one media playlist.
#[derive(Debug)]
struct MediaParseState {
    pending: Option<SegmentDraft>,
    current_key: Option<XKey>,
    /// Sequence number of the next segment; `None` once `u64::MAX` is used.
    sequence: Option<u64>,
}

impl Default for MediaParseState {
    fn default() -> Self {
        Self {
            pending: None,
            current_key: None,
            sequence: Some(0),
        }
    }
}

impl MediaParseState {
    fn consume<O>(
        &mut self,
        line_no: usize,
        raw: &str,
        playlist: &mut MediaPlaylist,
        observer: &mut O,
    ) where
        O: ManifestObserver + ?Sized,
    {
        match Line::classify(raw) {
            Line::Blank | Line::Comment(_) => {}
            Line::Tag(tag) => self.consume_tag(line_no, raw, tag, playlist, observer),
            Line::Uri(path) => {
                let Some(draft) = self.pending.take() else {
                    report(playlist, observer, line_no, raw, DiagnosticKind::OrphanedUri);
                    return;
                };
                let Some(sequence) = self.sequence else {
                    let kind = DiagnosticKind::SequenceExhausted { last: u64::MAX };
                    report(playlist, observer, line_no, raw, kind);
                    return;
                };
                let segment = MediaSegment {
                    playlist: playlist.index,
                    path: Some(path.to_string()),
                    duration: draft.duration,
                    sequence,
                    subrange_length: draft.subrange_length,
                    subrange_start: draft.subrange_start,
                    title: draft.title,
                    discontinuity: draft.discontinuity,
                    key: self.current_key.clone(),
                };
                self.sequence = sequence.checked_add(1);
                trace!(sequence = segment.sequence, path, "Segment");
                playlist.segments.push(segment);
                if let Some(segment) = playlist.segments.last() {
                    observer.on_media_segment(segment);
                }
            }
        }
    }

    fn consume_tag<O>(
        &mut self,
        line_no: usize,
        raw: &str,
        tag: Tag<'_>,
        playlist: &mut MediaPlaylist,
        observer: &mut O,
    ) where
        O: ManifestObserver + ?Sized,
    {
        match tag {
            Tag::Version(value) => {
                if let Some(version) = int_value(value) {
                    playlist.version = Some(version);
                }
            }
            Tag::TargetDuration(value) => {
                if let Some(target) = int_value(value) {
                    playlist.target_duration = Some(target);
                }
            }
            Tag::MediaSequence(value) => {
                if let Some(sequence) = int_value(value) {
                    playlist.media_sequence = Some(sequence);
                    self.sequence = Some(sequence);
                }
            }
            Tag::Inf(value) => {
                if self.pending.is_some() {
                    debug!(line = line_no, "#EXTINF replaces a segment that never got a URI");
                }
                let (duration, title) = value.split_once(',').unwrap_or((value, ""));
                let title = title.trim();
                self.pending = Some(SegmentDraft {
                    duration: parse_duration(duration),
                    title: (!title.is_empty()).then(|| title.to_string()),
                    ..Default::default()
                });
            }
            Tag::ByteRange(value) => {
                let Some(draft) = self.pending.as_mut() else {
                    report(playlist, observer, line_no, raw, DiagnosticKind::OrphanedByteRange);
                    return;
                };
                let (length, start) = match value.split_once('@') {
                    Some((length, start)) => (length, Some(start)),
                    None => (value, None),
                };
                if let Some(length) = int_value(length) {
                    draft.subrange_length = Some(length);
                }
                draft.subrange_start = start.and_then(int_value);
            }
            Tag::Discontinuity => {
                let Some(draft) = self.pending.as_mut() else {
                    report(
                        playlist,
                        observer,
                        line_no,
                        raw,
                        DiagnosticKind::OrphanedDiscontinuity,
                    );
                    return;
                };
                draft.discontinuity = true;
            }
            Tag::Key(value) => {
                self.current_key = XKey::parse(value);
            }
            Tag::ExtM3u | Tag::StreamInf(_) | Tag::SessionKey(_) => {}
            Tag::Unknown { name, .. } => trace!(tag = name, "Ignoring tag"),
        }
    }
}

/// Segment duration in seconds. `NaN`, infinities and negative values are
/// treated as unparsable.
fn parse_duration(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
}

fn report<O>(
    playlist: &mut MediaPlaylist,
    observer: &mut O,
    line_no: usize,
    raw: &str,
    kind: DiagnosticKind,
) where
    O: ManifestObserver + ?Sized,
{
    let diagnostic = Diagnostic::new(line_no, raw.trim(), kind);
    warn!(%diagnostic, "Skipping malformed media playlist line");
    observer.on_diagnostic(&diagnostic);
    playlist.diagnostics.push(diagnostic);
}

/// Parse a media playlist from `source` into `playlist`.
///
/// Segments are appended in manifest order and handed to `observer` as each
/// one is completed. `source` is closed before this returns.
pub fn parse_media_playlist<S, O>(source: &mut S, playlist: &mut MediaPlaylist, observer: &mut O)
where
    S: LineSource + ?Sized,
    O: ManifestObserver + ?Sized,
{
    let mut state = MediaParseState::default();
    for (idx, line) in ScopedSource::new(source).enumerate() {
        match line {
            Ok(raw) => state.consume(idx + 1, &raw, playlist, observer),
            Err(e) => {
                let kind = DiagnosticKind::from_read_error(&e);
                report(playlist, observer, idx + 1, "", kind);
            }
        }
    }
    debug!(
        segments = playlist.segments.len(),
        diagnostics = playlist.diagnostics.len(),
        "Parsed media playlist"
    );
}

/// Parse an in-memory media playlist.
pub fn parse_media_playlist_str<O>(input: &str, playlist: &mut MediaPlaylist, observer: &mut O)
where
    O: ManifestObserver + ?Sized,
{
    parse_media_playlist(&mut StringSource::new(input), playlist, observer);
}
