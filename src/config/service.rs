//! Service-level configuration, from code or from the environment.

use std::fmt;
use std::time::Duration;

use url::Url;

use super::{PollConfig, TlsConfig};
use crate::Error;

/// Default Privileged Access Manager endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://privilegedaccessmanager.googleapis.com/";

/// Largest page size the backend accepts for grant listings.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Environment variable names read by [`ServiceConfig::from_env`].
pub mod env {
    /// Backend base URL.
    pub const ENDPOINT: &str = "PAM_ENDPOINT";
    /// Per-request timeout in seconds.
    pub const REQUEST_TIMEOUT_SECS: &str = "PAM_REQUEST_TIMEOUT_SECS";
    /// Connect timeout in seconds.
    pub const CONNECT_TIMEOUT_SECS: &str = "PAM_CONNECT_TIMEOUT_SECS";
    /// Page size for grant listings.
    pub const LIST_PAGE_SIZE: &str = "PAM_LIST_PAGE_SIZE";
    /// Static ambient token. Without it the metadata server is used.
    pub const AMBIENT_TOKEN: &str = "PAM_AMBIENT_TOKEN";
    /// First operation poll delay in milliseconds.
    pub const POLL_INITIAL_DELAY_MS: &str = "PAM_POLL_INITIAL_DELAY_MS";
    /// Maximum operation poll delay in milliseconds.
    pub const POLL_MAX_DELAY_MS: &str = "PAM_POLL_MAX_DELAY_MS";
}

/// Configuration for talking to the privileged-access backend.
///
/// ```rust
/// use pam_grants::ServiceConfig;
/// use std::time::Duration;
///
/// let config = ServiceConfig::new()
///     .with_endpoint("http://localhost:8085/")?
///     .with_request_timeout(Duration::from_secs(5))
///     .with_page_size(100)?;
/// assert_eq!(config.endpoint.as_str(), "http://localhost:8085/");
/// # Ok::<(), pam_grants::Error>(())
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// Backend base URL. Always ends with `/`.
    pub endpoint: Url,

    /// Timeout for each backend request.
    pub request_timeout: Duration,

    /// Timeout for establishing connections.
    pub connect_timeout: Duration,

    /// Page size requested when listing grants. `None` lets the backend decide.
    pub page_size: Option<u32>,

    /// Static ambient token; `None` selects the metadata server.
    pub ambient_token: Option<String>,

    /// TLS settings.
    pub tls: TlsConfig,

    /// Operation polling schedule.
    pub poll: PollConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            page_size: None,
            ambient_token: None,
            tls: TlsConfig::default(),
            poll: PollConfig::default(),
        }
    }
}

#[allow(clippy::expect_used)]
fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL")
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("page_size", &self.page_size)
            .field("ambient_token", &self.ambient_token.as_ref().map(|_| "[REDACTED]"))
            .field("tls", &self.tls)
            .field("poll", &self.poll)
            .finish()
    }
}

impl ServiceConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the configuration from `PAM_*` environment variables.
    ///
    /// Unset variables keep their defaults. Unparsable values fail with
    /// [`ErrorKind::Configuration`](crate::ErrorKind::Configuration).
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(endpoint) = get(env::ENDPOINT) {
            config = config.with_endpoint(&endpoint)?;
        }
        if let Some(secs) = get(env::REQUEST_TIMEOUT_SECS) {
            config.request_timeout = Duration::from_secs(parse_number(env::REQUEST_TIMEOUT_SECS, &secs)?);
        }
        if let Some(secs) = get(env::CONNECT_TIMEOUT_SECS) {
            config.connect_timeout = Duration::from_secs(parse_number(env::CONNECT_TIMEOUT_SECS, &secs)?);
        }
        if let Some(size) = get(env::LIST_PAGE_SIZE) {
            let size = parse_number(env::LIST_PAGE_SIZE, &size)?;
            let size = u32::try_from(size).map_err(|_| {
                Error::configuration(format!("{} must be at most {}", env::LIST_PAGE_SIZE, MAX_PAGE_SIZE))
            })?;
            config = config.with_page_size(size)?;
        }
        if let Some(token) = lookup(env::AMBIENT_TOKEN).filter(|t| !t.trim().is_empty()) {
            config.ambient_token = Some(token.trim().to_string());
        }
        if let Some(ms) = get(env::POLL_INITIAL_DELAY_MS) {
            config.poll.initial_delay = Duration::from_millis(parse_number(env::POLL_INITIAL_DELAY_MS, &ms)?);
        }
        if let Some(ms) = get(env::POLL_MAX_DELAY_MS) {
            config.poll.max_delay = Duration::from_millis(parse_number(env::POLL_MAX_DELAY_MS, &ms)?);
        }

        Ok(config)
    }

    /// Sets the backend base URL. A trailing `/` is added when missing so
    /// relative API paths resolve beneath it.
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self, Error> {
        let mut endpoint = Url::parse(endpoint)?;
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        self.endpoint = endpoint;
        Ok(self)
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the listing page size (`1..=1000`).
    pub fn with_page_size(mut self, page_size: u32) -> Result<Self, Error> {
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(Error::configuration(format!(
                "page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, page_size
            )));
        }
        self.page_size = Some(page_size);
        Ok(self)
    }

    /// Uses a static ambient token instead of the metadata server.
    #[must_use]
    pub fn with_ambient_token(mut self, token: impl Into<String>) -> Self {
        self.ambient_token = Some(token.into());
        self
    }

    /// Sets the TLS configuration.
    #[must_use]
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    /// Sets the operation polling schedule.
    #[must_use]
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, Error> {
    value.parse::<u64>().map_err(|e| {
        Error::configuration(format!("{} must be a non-negative integer, got {:?}", key, value))
            .with_source(e)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::ErrorKind;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.page_size.is_none());
        assert!(config.ambient_token.is_none());
    }

    #[test]
    fn test_from_empty_lookup_is_default() {
        let config = ServiceConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.poll, PollConfig::default());
    }

    #[test]
    fn test_from_lookup_reads_every_variable() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (env::ENDPOINT, "http://localhost:9000/pam"),
            (env::REQUEST_TIMEOUT_SECS, "5"),
            (env::CONNECT_TIMEOUT_SECS, "2"),
            (env::LIST_PAGE_SIZE, "50"),
            (env::AMBIENT_TOKEN, " svc-token "),
            (env::POLL_INITIAL_DELAY_MS, "10"),
            (env::POLL_MAX_DELAY_MS, "100"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint.as_str(), "http://localhost:9000/pam/");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.page_size, Some(50));
        assert_eq!(config.ambient_token.as_deref(), Some("svc-token"));
        assert_eq!(config.poll.initial_delay, Duration::from_millis(10));
        assert_eq!(config.poll.max_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_unparsable_value_is_configuration_error() {
        let err = ServiceConfig::from_lookup(lookup(&[(env::REQUEST_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.message().contains(env::REQUEST_TIMEOUT_SECS));
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = ServiceConfig::from_lookup(lookup(&[(env::ENDPOINT, "not a url")])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(ServiceConfig::new().with_page_size(0).is_err());
        assert!(ServiceConfig::new().with_page_size(1001).is_err());
        assert_eq!(ServiceConfig::new().with_page_size(1000).unwrap().page_size, Some(1000));
        let err = ServiceConfig::from_lookup(lookup(&[(env::LIST_PAGE_SIZE, "99999999999")]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_debug_redacts_ambient_token() {
        let config = ServiceConfig::new().with_ambient_token("svc-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("svc-secret"));
        assert!(debug.contains("REDACTED"));
    }
}
