//! Location resolution for variant playlists and segments.
//!
//! Recorded paths are resolved against the location of the manifest that
//! referenced them: a relative path replaces the last path component of its
//! parent's location. A path that carries its own scheme (`http:`, `https:`,
//! `file:`, `skd:` ...) is already absolute and is used as is.

use url::Url;

/// Resolve `path` against the location of its parent manifest.
///
/// A path is absolute when it parses as a URL on its own, i.e. starts with a
/// `scheme:` prefix. Absolute paths resolve to themselves even without a
/// parent; relative paths need one.
pub fn resolve(parent: Option<&Url>, path: &str) -> Option<Url> {
    if let Ok(url) = Url::parse(path) {
        return Some(url);
    }
    parent?.join(path).ok()
}

/// Compose a segment's absolute location from the master location, the
/// playlist path recorded in the master, and the segment path recorded in the
/// playlist.
pub fn segment_location(
    master: Option<&Url>,
    playlist_path: Option<&str>,
    segment_path: Option<&str>,
) -> Option<Url> {
    let segment_path = segment_path?;
    if let Ok(url) = Url::parse(segment_path) {
        return Some(url);
    }
    let playlist_location = resolve(master, playlist_path?)?;
    playlist_location.join(segment_path).ok()
}
