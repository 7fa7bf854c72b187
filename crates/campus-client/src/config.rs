//! CMS client configuration from environment variables.

use std::env;
use std::time::Duration;

use campus_core::AssetPolicy;
use url::Url;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where a request is issued from, which decides the URL/token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionContext {
    /// Page rendering on the server; uses the secret token.
    #[default]
    Server,
    /// Code running for a visitor; uses the public, read-only token.
    Browser,
}

impl std::str::FromStr for ExecutionContext {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" => Ok(Self::Server),
            "browser" | "client" | "public" => Ok(Self::Browser),
            other => Err(ConfigError::InvalidValue {
                name: "context".to_string(),
                reason: format!("expected server or browser, got {other}"),
            }),
        }
    }
}

/// Base URL and token for one execution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmsEndpoint {
    pub base_url: Url,
    pub token: Option<String>,
}

/// CMS client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Endpoint used when rendering on the server.
    pub server: CmsEndpoint,
    /// Endpoint used from the browser.
    pub browser: CmsEndpoint,
    /// Base for relative asset URLs.
    pub asset_base: Option<Url>,
    /// Host patterns images may be loaded from.
    pub asset_hosts: Vec<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Configuration with a single endpoint for both contexts.
    pub fn new(base_url: Url, token: Option<String>) -> Self {
        let endpoint = CmsEndpoint { base_url, token };
        Self {
            server: endpoint.clone(),
            browser: endpoint,
            asset_base: None,
            asset_hosts: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `CMS_URL`: CMS base URL used on the server
    ///
    /// Optional:
    /// - `CMS_API_TOKEN`: secret token for server-side requests
    /// - `CMS_PUBLIC_URL`: CMS base URL for browser requests (default: `CMS_URL`)
    /// - `CMS_PUBLIC_TOKEN`: public token for browser requests
    /// - `CMS_ASSET_URL`: base for relative asset URLs (default: the endpoint URL)
    /// - `CMS_ASSET_HOSTS`: comma-separated image host allow-list
    /// - `CMS_TIMEOUT_SECS`: request timeout (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let base_url = var("CMS_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("CMS_URL".to_string()))
            .and_then(|v| parse_url("CMS_URL", &v))?;

        let public_url = match var("CMS_PUBLIC_URL") {
            Some(v) => parse_url("CMS_PUBLIC_URL", &v)?,
            None => base_url.clone(),
        };

        let asset_base = var("CMS_ASSET_URL")
            .map(|v| parse_url("CMS_ASSET_URL", &v))
            .transpose()?;

        let asset_hosts = var("CMS_ASSET_HOSTS")
            .map(|v| {
                v.split(',')
                    .map(|h| h.trim().to_string())
                    .filter(|h| !h.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let timeout_secs = match var("CMS_TIMEOUT_SECS") {
            Some(v) => v.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                name: "CMS_TIMEOUT_SECS".to_string(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            server: CmsEndpoint {
                base_url,
                token: var("CMS_API_TOKEN"),
            },
            browser: CmsEndpoint {
                base_url: public_url,
                token: var("CMS_PUBLIC_TOKEN"),
            },
            asset_base,
            asset_hosts,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Endpoint for the given execution context.
    pub fn endpoint(&self, context: ExecutionContext) -> &CmsEndpoint {
        match context {
            ExecutionContext::Server => &self.server,
            ExecutionContext::Browser => &self.browser,
        }
    }

    /// Asset policy for the given execution context.
    pub fn asset_policy(&self, context: ExecutionContext) -> AssetPolicy {
        let base = self
            .asset_base
            .clone()
            .unwrap_or_else(|| self.endpoint(context).base_url.clone());
        AssetPolicy::new(base).with_allowed_hosts(self.asset_hosts.iter().cloned())
    }
}

fn parse_url(name: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = ClientConfig::from_lookup(lookup(&[("CMS_URL", "https://cms.example.edu")]))
            .unwrap();

        assert_eq!(config.server.base_url.as_str(), "https://cms.example.edu/");
        assert_eq!(config.browser.base_url, config.server.base_url);
        assert_eq!(config.server.token, None);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.asset_hosts.is_empty());
    }

    #[test]
    fn test_context_selects_token() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("CMS_URL", "http://cms.internal:1337"),
            ("CMS_API_TOKEN", "secret"),
            ("CMS_PUBLIC_URL", "https://cms.example.edu"),
            ("CMS_PUBLIC_TOKEN", "public"),
        ]))
        .unwrap();

        let server = config.endpoint(ExecutionContext::Server);
        assert_eq!(server.token.as_deref(), Some("secret"));
        assert_eq!(server.base_url.host_str(), Some("cms.internal"));

        let browser = config.endpoint(ExecutionContext::Browser);
        assert_eq!(browser.token.as_deref(), Some("public"));
        assert_eq!(browser.base_url.host_str(), Some("cms.example.edu"));
    }

    #[test]
    fn test_missing_url() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(name) if name == "CMS_URL"));
    }

    #[test]
    fn test_invalid_values() {
        let err = ClientConfig::from_lookup(lookup(&[("CMS_URL", "ftp://cms")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = ClientConfig::from_lookup(lookup(&[
            ("CMS_URL", "https://cms.example.edu"),
            ("CMS_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name, .. } if name == "CMS_TIMEOUT_SECS"));
    }

    #[test]
    fn test_asset_policy() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("CMS_URL", "https://cms.example.edu"),
            ("CMS_ASSET_HOSTS", "cms.example.edu, *.cloudfront.net ,"),
        ]))
        .unwrap();

        assert_eq!(config.asset_hosts, vec!["cms.example.edu", "*.cloudfront.net"]);
        let policy = config.asset_policy(ExecutionContext::Server);
        assert_eq!(
            policy.resolve("/uploads/a.png").as_deref(),
            Some("https://cms.example.edu/uploads/a.png")
        );
    }

    #[test]
    fn test_context_parsing() {
        assert_eq!("server".parse::<ExecutionContext>().unwrap(), ExecutionContext::Server);
        assert_eq!("Browser".parse::<ExecutionContext>().unwrap(), ExecutionContext::Browser);
        assert!("edge".parse::<ExecutionContext>().is_err());
    }
}
