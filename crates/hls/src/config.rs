//! Configuration for loading manifests.
//!
//! ```
//! use std::time::Duration;
//! use hls_manifest::ManifestConfig;
//!
//! let config = ManifestConfig::builder()
//!     .with_timeout(Duration::from_secs(10))
//!     .with_user_agent("MyPlayer/1.0")
//!     .with_header("Referer", "https://example.com/")
//!     .with_skip_unreachable_variants(true)
//!     .build();
//! assert!(config.skip_unreachable_variants);
//! ```

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

const DEFAULT_USER_AGENT: &str = concat!("hls-manifest/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ManifestConfig {
    /// Overall timeout for fetching one manifest
    pub timeout: Duration,

    /// Connection timeout (time to establish initial connection)
    pub connect_timeout: Duration,

    /// User agent string
    pub user_agent: String,

    /// Custom HTTP headers for requests
    pub headers: HeaderMap,

    /// Whether to follow redirects
    pub follow_redirects: bool,

    /// Record variants that fail to load as diagnostics instead of failing
    /// the whole parse
    pub skip_unreachable_variants: bool,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            headers: ManifestConfig::get_default_headers(),
            follow_redirects: true,
            skip_unreachable_variants: false,
        }
    }
}

impl ManifestConfig {
    pub fn builder() -> ManifestConfigBuilder {
        ManifestConfigBuilder::new()
    }

    pub fn get_default_headers() -> HeaderMap {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static(
                "application/vnd.apple.mpegurl,application/x-mpegurl,audio/mpegurl,*/*;q=0.8",
            ),
        );
        default_headers
    }
}

/// Builder for [`ManifestConfig`] with a fluent API
#[derive(Debug, Clone)]
pub struct ManifestConfigBuilder {
    config: ManifestConfig,
}

impl ManifestConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ManifestConfig::default(),
        }
    }

    /// Set the overall timeout for fetching one manifest
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Add a custom HTTP header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.as_ref().parse::<HeaderName>(),
            HeaderValue::from_str(value.as_ref()),
        ) {
            self.config.headers.insert(name, value);
        }
        self
    }

    /// Replace all headers, including the defaults
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.config.headers = headers;
        self
    }

    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.config.follow_redirects = follow;
        self
    }

    pub fn with_skip_unreachable_variants(mut self, skip: bool) -> Self {
        self.config.skip_unreachable_variants = skip;
        self
    }

    pub fn build(self) -> ManifestConfig {
        self.config
    }
}

impl Default for ManifestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
