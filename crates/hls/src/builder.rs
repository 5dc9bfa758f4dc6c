//! Entry points for parsing manifests from strings, files and URLs.
//!
//! ```no_run
//! # async fn run() -> Result<(), hls_manifest::ManifestError> {
//! use hls_manifest::{ManifestBuilder, OnSegment};
//! use url::Url;
//!
//! let builder = ManifestBuilder::new()?;
//! let url = Url::parse("https://example.com/live/master.m3u8").unwrap();
//! let master = builder
//!     .parse(&url, &mut OnSegment(|segment: &hls_manifest::MediaSegment| {
//!         println!("segment {} -> {:?}", segment.sequence, segment.path);
//!     }))
//!     .await?;
//!
//! for playlist in master.playlists() {
//!     println!("{} bps: {} segments", playlist.bandwidth, playlist.segments().len());
//! }
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use tracing::{debug, info, warn};
use url::Url;

use crate::config::ManifestConfig;
use crate::error::{Diagnostic, DiagnosticKind, ManifestError};
use crate::loader::{DefaultLoader, ManifestLoader};
use crate::master::{parse_master_playlist, parse_master_playlist_str};
use crate::media::{parse_media_playlist, parse_media_playlist_str};
use crate::model::{MasterPlaylist, MediaPlaylist};
use crate::observer::ManifestObserver;
use crate::resolve;
use crate::source::FileSource;

/// Parses master and media playlists, fetching referenced variants one at a time.
pub struct ManifestBuilder<L = DefaultLoader> {
    loader: L,
    config: ManifestConfig,
}

impl ManifestBuilder<DefaultLoader> {
    /// Builder with the default configuration and HTTP client.
    pub fn new() -> Result<Self, ManifestError> {
        Self::with_config(ManifestConfig::default())
    }

    pub fn with_config(config: ManifestConfig) -> Result<Self, ManifestError> {
        let loader = DefaultLoader::from_config(&config)?;
        Ok(Self { loader, config })
    }
}

impl<L: ManifestLoader> ManifestBuilder<L> {
    /// Builder that acquires manifests through a custom loader.
    pub fn with_loader(loader: L, config: ManifestConfig) -> Self {
        Self { loader, config }
    }

    pub fn config(&self) -> &ManifestConfig {
        &self.config
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Parse a master playlist held in memory. The result has no location.
    pub fn master_from_str<O>(&self, input: &str, observer: &mut O) -> MasterPlaylist
    where
        O: ManifestObserver + ?Sized,
    {
        parse_master_playlist_str(input, observer)
    }

    /// Parse a master playlist from a local file. The file's absolute path
    /// becomes the master location.
    pub fn master_from_file<O>(
        &self,
        path: impl AsRef<Path>,
        observer: &mut O,
    ) -> Result<MasterPlaylist, ManifestError>
    where
        O: ManifestObserver + ?Sized,
    {
        let path = path.as_ref();
        let mut source = FileSource::open(path)?;
        let location = std::path::absolute(path)
            .ok()
            .and_then(|absolute| Url::from_file_path(absolute).ok());
        Ok(parse_master_playlist(&mut source, location, observer))
    }

    /// Fetch and parse a master playlist. Variants are returned as stubs.
    pub async fn master_from_url<O>(
        &self,
        url: &Url,
        observer: &mut O,
    ) -> Result<MasterPlaylist, ManifestError>
    where
        O: ManifestObserver + ?Sized,
    {
        let mut source = self.loader.open(url).await?;
        Ok(parse_master_playlist(
            source.as_mut(),
            Some(url.clone()),
            observer,
        ))
    }

    pub fn media_from_str<O>(&self, input: &str, playlist: &mut MediaPlaylist, observer: &mut O)
    where
        O: ManifestObserver + ?Sized,
    {
        parse_media_playlist_str(input, playlist, observer)
    }

    pub fn media_from_file<O>(
        &self,
        path: impl AsRef<Path>,
        playlist: &mut MediaPlaylist,
        observer: &mut O,
    ) -> Result<(), ManifestError>
    where
        O: ManifestObserver + ?Sized,
    {
        let mut source = FileSource::open(path)?;
        parse_media_playlist(&mut source, playlist, observer);
        Ok(())
    }

    /// Fetch and parse a media playlist into `playlist`.
    pub async fn media_from_url<O>(
        &self,
        url: &Url,
        playlist: &mut MediaPlaylist,
        observer: &mut O,
    ) -> Result<(), ManifestError>
    where
        O: ManifestObserver + ?Sized,
    {
        let mut source = self.loader.open(url).await?;
        parse_media_playlist(source.as_mut(), playlist, observer);
        Ok(())
    }

    /// Parse the master playlist at `url` and then every variant it references.
    ///
    /// Variants are fetched sequentially, in manifest order, and populated in
    /// place. A variant that cannot be loaded fails the whole parse unless
    /// [`ManifestConfig::skip_unreachable_variants`] is set, in which case it
    /// is recorded as a diagnostic on the master and left without segments.
    pub async fn parse<O>(&self, url: &Url, observer: &mut O) -> Result<MasterPlaylist, ManifestError>
    where
        O: ManifestObserver + ?Sized,
    {
        let mut master = self.master_from_url(url, observer).await?;
        info!(%url, variants = master.playlists.len(), "Parsing variant playlists");

        for index in 0..master.playlists.len() {
            let Some(path) = master.playlists[index].path.clone() else {
                continue;
            };

            let loaded = match resolve::resolve(master.location.as_ref(), &path) {
                Some(variant_url) => {
                    debug!(%variant_url, "Loading variant playlist");
                    match self.loader.open(&variant_url).await {
                        Ok(source) => Ok((variant_url, source)),
                        Err(e) => Err((variant_url.to_string(), e)),
                    }
                }
                None => Err((
                    path.clone(),
                    ManifestError::InvalidUrl(format!(
                        "Could not resolve variant path {path} against {url}"
                    )),
                )),
            };

            match loaded {
                Ok((variant_url, mut source)) => {
                    let playlist = &mut master.playlists[index];
                    parse_media_playlist(source.as_mut(), playlist, observer);
                    debug!(
                        %variant_url,
                        segments = playlist.segments.len(),
                        "Parsed variant playlist"
                    );
                }
                Err((variant_url, e)) if self.config.skip_unreachable_variants => {
                    warn!(%variant_url, error = %e, "Skipping unreachable variant playlist");
                    let diagnostic = Diagnostic::new(
                        0,
                        path,
                        DiagnosticKind::UnreachableVariant {
                            url: variant_url,
                            reason: e.to_string(),
                        },
                    );
                    observer.on_diagnostic(&diagnostic);
                    master.diagnostics.push(diagnostic);
                }
                Err((_, e)) => return Err(e),
            }
        }

        Ok(master)
    }
}
