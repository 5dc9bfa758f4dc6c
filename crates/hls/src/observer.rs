//! Synchronous callbacks for entities discovered during a parse.
//!
//! Callbacks fire on the parsing call stack, in manifest order, right after
//! the entity has been appended to its owner.

use crate::error::Diagnostic;
use crate::model::{MediaPlaylist, MediaSegment};

pub trait ManifestObserver {
    /// A variant was read from a master playlist. Its segments are not parsed yet.
    fn on_media_playlist(&mut self, _playlist: &MediaPlaylist) {}

    fn on_media_segment(&mut self, _segment: &MediaSegment) {}

    fn on_diagnostic(&mut self, _diagnostic: &Diagnostic) {}
}

/// Observes nothing.
impl ManifestObserver for () {}

impl<T: ManifestObserver + ?Sized> ManifestObserver for &mut T {
    fn on_media_playlist(&mut self, playlist: &MediaPlaylist) {
        (**self).on_media_playlist(playlist)
    }

    fn on_media_segment(&mut self, segment: &MediaSegment) {
        (**self).on_media_segment(segment)
    }

    fn on_diagnostic(&mut self, diagnostic: &Diagnostic) {
        (**self).on_diagnostic(diagnostic)
    }
}

/// Adapts a closure into an observer of variant playlists.
pub struct OnPlaylist<F>(pub F);

impl<F: FnMut(&MediaPlaylist)> ManifestObserver for OnPlaylist<F> {
    fn on_media_playlist(&mut self, playlist: &MediaPlaylist) {
        (self.0)(playlist)
    }
}

/// Adapts a closure into an observer of media segments.
pub struct OnSegment<F>(pub F);

impl<F: FnMut(&MediaSegment)> ManifestObserver for OnSegment<F> {
    fn on_media_segment(&mut self, segment: &MediaSegment) {
        (self.0)(segment)
    }
}
