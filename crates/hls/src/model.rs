//! The parsed manifest graph.
//!
//! A [`MasterPlaylist`] owns its [`MediaPlaylist`]s, which own their
//! [`MediaSegment`]s. Children refer back to their owner only through an
//! index handle; lookups go through the owner.

use url::Url;

use crate::error::Diagnostic;
use crate::key::XKey;
use crate::resolve;

/// A byte range within a segment's resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub length: u64,
    pub offset: Option<u64>,
}

/// A top-level manifest listing variant streams.
#[derive(Debug, Clone, Default)]
pub struct MasterPlaylist {
    /// Where the manifest was loaded from, when known.
    pub location: Option<Url>,
    /// The last `#EXT-X-SESSION-KEY` declaration.
    pub key: Option<XKey>,
    /// Every `#EXT-X-SESSION-KEY` declaration, in manifest order.
    pub session_keys: Vec<XKey>,
    pub(crate) playlists: Vec<MediaPlaylist>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl MasterPlaylist {
    pub fn new(location: Option<Url>) -> Self {
        Self {
            location,
            ..Default::default()
        }
    }

    /// Variant playlists in the order they appear in the manifest.
    pub fn playlists(&self) -> &[MediaPlaylist] {
        &self.playlists
    }

    /// Mutable access to the variants, e.g. to populate one with a media parse.
    pub fn playlists_mut(&mut self) -> &mut [MediaPlaylist] {
        &mut self.playlists
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The variant that owns `segment`.
    pub fn playlist_of(&self, segment: &MediaSegment) -> Option<&MediaPlaylist> {
        segment.playlist.and_then(|index| self.playlists.get(index))
    }

    /// Absolute location of a variant playlist of this master.
    pub fn playlist_location(&self, playlist: &MediaPlaylist) -> Option<Url> {
        resolve::resolve(self.location.as_ref(), playlist.path.as_deref()?)
    }

    /// Absolute location of a segment of one of this master's variants.
    ///
    /// `None` when the master location, the playlist path or the segment path
    /// is missing, unless the segment path is itself absolute.
    pub fn segment_location(&self, segment: &MediaSegment) -> Option<Url> {
        let playlist_path = self
            .playlist_of(segment)
            .and_then(|playlist| playlist.path.as_deref());
        resolve::segment_location(
            self.location.as_ref(),
            playlist_path,
            segment.path.as_deref(),
        )
    }
}

/// A variant manifest listing the segments of one rendition.
#[derive(Debug, Clone, Default)]
pub struct MediaPlaylist {
    pub(crate) index: Option<usize>,
    pub program_id: u64,
    pub bandwidth: u64,
    pub codec: Option<String>,
    pub version: Option<u64>,
    pub target_duration: Option<u64>,
    pub media_sequence: Option<u64>,
    /// The URI line recorded in the master playlist.
    pub path: Option<String>,
    pub(crate) segments: Vec<MediaSegment>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl MediaPlaylist {
    /// A playlist that does not belong to any master.
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of this playlist in its master, `None` when standalone.
    pub fn master_index(&self) -> Option<usize> {
        self.index
    }

    pub fn segments(&self) -> &[MediaSegment] {
        &self.segments
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Segment with media sequence number `sequence`.
    pub fn segment(&self, sequence: u64) -> Option<&MediaSegment> {
        let first = self.segments.first()?.sequence;
        let offset = usize::try_from(sequence.checked_sub(first)?).ok()?;
        self.segments.get(offset)
    }

    /// Total duration in seconds. Segments without a duration count as zero.
    pub fn duration(&self) -> f64 {
        self.segments.iter().filter_map(|s| s.duration).sum()
    }

    /// Absolute location of `segment` given this playlist's own location.
    pub fn segment_location(&self, playlist_location: &Url, segment: &MediaSegment) -> Option<Url> {
        resolve::resolve(Some(playlist_location), segment.path.as_deref()?)
    }
}

/// One media segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaSegment {
    pub(crate) playlist: Option<usize>,
    /// The URI line recorded in the media playlist.
    pub path: Option<String>,
    /// Duration in seconds, absent if `#EXTINF` did not carry a number.
    pub duration: Option<f64>,
    pub sequence: u64,
    pub subrange_length: Option<u64>,
    pub subrange_start: Option<u64>,
    pub title: Option<String>,
    pub discontinuity: bool,
    /// The key in effect for this segment.
    pub key: Option<XKey>,
}

impl MediaSegment {
    /// Index of the owning playlist within its master, `None` when the
    /// playlist is standalone.
    pub fn playlist_index(&self) -> Option<usize> {
        self.playlist
    }

    pub fn byte_range(&self) -> Option<ByteRange> {
        self.subrange_length.map(|length| ByteRange {
            length,
            offset: self.subrange_start,
        })
    }
}
