//! HLS (HTTP Live Streaming) manifest parser.
//!
//! Parses master playlists into their variant streams and media playlists
//! into ordered segments. A master can be parsed on its own, yielding variant
//! stubs, or recursively through [`ManifestBuilder::parse`], which fetches
//! and populates every variant in manifest order.
//!
//! Malformed lines never abort a parse. They are skipped and recorded as
//! [`Diagnostic`]s on the playlist being parsed and reported to the
//! [`ManifestObserver`]. Only failing to acquire a manifest is an error.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

pub mod attributes;
pub mod builder;
pub mod config;
pub mod error;
pub mod key;
pub mod line;
pub mod loader;
pub mod master;
pub mod media;
pub mod model;
pub mod observer;
pub mod resolve;
pub mod source;

#[cfg(test)]
mod test_utils;

pub use attributes::{AttributeList, parse_attribute_list, unescape};
pub use builder::ManifestBuilder;
pub use config::{ManifestConfig, ManifestConfigBuilder};
pub use error::{Diagnostic, DiagnosticKind, ManifestError};
pub use key::{KeyMethod, XKey};
pub use loader::{DefaultLoader, ManifestLoader, create_client};
pub use master::{parse_master_playlist, parse_master_playlist_str};
pub use media::{parse_media_playlist, parse_media_playlist_str};
pub use model::{ByteRange, MasterPlaylist, MediaPlaylist, MediaSegment};
pub use observer::{ManifestObserver, OnPlaylist, OnSegment};
pub use source::{BytesSource, FileSource, LineSource, StringSource};
