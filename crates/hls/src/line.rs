//! Classification of manifest lines.
//!
//! Each line is classified once into a [`Line`]; the parsers then dispatch
//! on it with an exhaustive `match`.

/// A single manifest line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    /// A line starting with `#EXT`.
    Tag(Tag<'a>),
    /// Any other line starting with `#`.
    Comment(&'a str),
    /// A URI or path line.
    Uri(&'a str),
}

/// The tags the parsers understand. Payloads are the text after the colon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag<'a> {
    ExtM3u,
    Version(&'a str),
    TargetDuration(&'a str),
    MediaSequence(&'a str),
    Inf(&'a str),
    ByteRange(&'a str),
    Discontinuity,
    Key(&'a str),
    StreamInf(&'a str),
    SessionKey(&'a str),
    Unknown { name: &'a str, value: &'a str },
}

impl<'a> Line<'a> {
    pub fn classify(raw: &'a str) -> Self {
        let line = raw.trim();
        if line.is_empty() {
            Line::Blank
        } else if line.starts_with("#EXT") {
            Line::Tag(Tag::classify(line))
        } else if line.starts_with('#') {
            Line::Comment(line)
        } else {
            Line::Uri(line)
        }
    }
}

impl<'a> Tag<'a> {
    fn classify(line: &'a str) -> Self {
        let (name, value) = line.split_once(':').unwrap_or((line, ""));
        match name {
            "#EXTM3U" => Tag::ExtM3u,
            "#EXT-X-VERSION" => Tag::Version(value),
            "#EXT-X-TARGETDURATION" => Tag::TargetDuration(value),
            "#EXT-X-MEDIA-SEQUENCE" => Tag::MediaSequence(value),
            "#EXTINF" => Tag::Inf(value),
            "#EXT-X-BYTERANGE" => Tag::ByteRange(value),
            "#EXT-X-DISCONTINUITY" => Tag::Discontinuity,
            "#EXT-X-KEY" => Tag::Key(value),
            "#EXT-X-STREAM-INF" => Tag::StreamInf(value),
            "#EXT-X-SESSION-KEY" => Tag::SessionKey(value),
            _ => Tag::Unknown { name, value },
        }
    }
}

/// Integer payload of a tag such as `#EXT-X-VERSION:3`.
pub(crate) fn int_value(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}
