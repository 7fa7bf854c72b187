//! Resolution and allow-listing of CMS asset URLs.
//!
//! The CMS returns upload URLs relative to its own host (`/uploads/x.jpg`)
//! unless a CDN provider is configured. Page renderers only load images from
//! allow-listed hosts, so covers pointing anywhere else are dropped during
//! normalization instead of rendering as broken images.

use url::Url;

/// Where assets live and which hosts may serve them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPolicy {
    base: Url,
    allowed_hosts: Vec<String>,
}

impl AssetPolicy {
    /// Policy resolving against `base` that allows every host.
    pub fn new(base: Url) -> Self {
        Self {
            base,
            allowed_hosts: Vec::new(),
        }
    }

    /// Restricts images to the given host patterns.
    ///
    /// A pattern is either an exact host (`cms.example.edu`) or a wildcard
    /// suffix (`*.cloudfront.net`). An empty list allows every host.
    pub fn with_allowed_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_hosts = hosts
            .into_iter()
            .map(|h| h.into().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }

    /// Returns true if `host` matches the allow-list.
    pub fn is_allowed_host(&self, host: &str) -> bool {
        if self.allowed_hosts.is_empty() {
            return true;
        }
        let host = host.to_ascii_lowercase();
        self.allowed_hosts.iter().any(|pattern| {
            match pattern.strip_prefix("*.") {
                Some(suffix) => host
                    .strip_suffix(suffix)
                    .is_some_and(|rest| rest.ends_with('.') && rest.len() > 1),
                None => *pattern == host,
            }
        })
    }

    /// Resolves a raw asset URL to an absolute, allowed URL.
    ///
    /// Returns `None` when the URL cannot be parsed, is not http(s), or its
    /// host is not allowed.
    pub fn resolve(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let url = self.base.join(raw).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }

        let host = url.host_str()?;
        if !self.is_allowed_host(host) {
            tracing::debug!(host, "asset host not allow-listed");
            return None;
        }

        Some(url.to_string())
    }
}
