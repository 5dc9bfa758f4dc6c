use std::fmt;
use std::path::PathBuf;

use reqwest::StatusCode;

/// Failures that stop a parse call before any line is consumed.
///
/// Everything that goes wrong *inside* a manifest is reported as a
/// [`Diagnostic`] instead; only acquiring the line source is fatal.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned status code {status} for {url}")]
    HttpStatus { url: String, status: StatusCode },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Manifest at {location} is not valid UTF-8")]
    NotUtf8 { location: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ManifestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::Io {
            path: path.into(),
            source,
        }
    }
}

/// The kind of recoverable problem found while consuming a manifest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosticKind {
    #[error("#EXT-X-BYTERANGE without a preceding #EXTINF")]
    OrphanedByteRange,

    #[error("#EXT-X-DISCONTINUITY without a preceding #EXTINF")]
    OrphanedDiscontinuity,

    #[error("segment URI without a preceding #EXTINF")]
    OrphanedUri,

    #[error("segment after media sequence number {last} cannot be numbered")]
    SequenceExhausted { last: u64 },

    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    #[error("reading the manifest failed: {reason}")]
    ReadFailed { reason: String },

    #[error("variant playlist {url} could not be loaded: {reason}")]
    UnreachableVariant { url: String, reason: String },
}

impl DiagnosticKind {
    /// Classify an error returned by a line source mid-parse.
    pub(crate) fn from_read_error(error: &ManifestError) -> Self {
        match error {
            ManifestError::NotUtf8 { .. } => DiagnosticKind::InvalidUtf8,
            other => DiagnosticKind::ReadFailed {
                reason: other.to_string(),
            },
        }
    }
}

/// A recoverable manifest problem, tied to the offending line.
///
/// `line` is 1-based. Diagnostics that are not tied to a line of the
/// manifest being parsed (an unreachable variant) use `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub text: String,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(line: usize, text: impl Into<String>, kind: DiagnosticKind) -> Self {
        Self {
            line,
            text: text.into(),
            kind,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "line {}: {} ({:?})", self.line, self.kind, self.text)
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let cases = [
            (
                Diagnostic::new(3, "#EXT-X-BYTERANGE:100", DiagnosticKind::OrphanedByteRange),
                "line 3: #EXT-X-BYTERANGE without a preceding #EXTINF (\"#EXT-X-BYTERANGE:100\")",
            ),
            (
                Diagnostic::new(7, "seg.ts", DiagnosticKind::OrphanedUri),
                "line 7: segment URI without a preceding #EXTINF (\"seg.ts\")",
            ),
            (
                Diagnostic::new(
                    0,
                    "low.m3u8",
                    DiagnosticKind::UnreachableVariant {
                        url: "http://host/low.m3u8".to_string(),
                        reason: "HTTP 404".to_string(),
                    },
                ),
                "variant playlist http://host/low.m3u8 could not be loaded: HTTP 404",
            ),
        ];

        for (diagnostic, expected) in cases {
            assert_eq!(diagnostic.to_string(), expected);
        }
    }

    #[test]
    fn test_manifest_error_display() {
        let err = ManifestError::io(
            "/tmp/missing.m3u8",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.to_string(), "I/O error reading /tmp/missing.m3u8: not found");

        let err = ManifestError::HttpStatus {
            url: "http://host/master.m3u8".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        assert_eq!(
            err.to_string(),
            "Server returned status code 404 Not Found for http://host/master.m3u8"
        );
    }

    #[test]
    fn test_read_error_classification() {
        let not_utf8 = ManifestError::NotUtf8 {
            location: "/tmp/a.m3u8".to_string(),
        };
        assert_eq!(
            DiagnosticKind::from_read_error(&not_utf8),
            DiagnosticKind::InvalidUtf8
        );

        let io = ManifestError::io(
            "/tmp/a.m3u8",
            std::io::Error::new(std::io::ErrorKind::Other, "disk gone"),
        );
        assert_eq!(
            DiagnosticKind::from_read_error(&io),
            DiagnosticKind::ReadFailed {
                reason: "I/O error reading /tmp/a.m3u8: disk gone".to_string()
            }
        );
    }
}
