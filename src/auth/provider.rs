//! Providers for the service's own (ambient) credential.

use std::{future::Future, pin::Pin, sync::Arc};

use crate::Error;

/// A type alias for the boxed future returned by credentials providers.
pub type CredentialsFuture<'a> = Pin<Box<dyn Future<Output = Result<String, Error>> + Send + 'a>>;

/// Source of the ambient access token used when no delegated identity is
/// present.
///
/// The connector calls [`get_token`](CredentialsProvider::get_token) once per
/// backend client it builds. Failures surface as
/// [`ErrorKind::ClientInitialization`](crate::ErrorKind::ClientInitialization).
///
/// This trait is object-safe and can be used as `Arc<dyn CredentialsProvider>`.
///
/// ## Example: Environment Variable Provider
///
/// ```rust
/// use pam_grants::CredentialsProvider;
/// use pam_grants::auth::CredentialsFuture;
///
/// struct EnvCredentialsProvider {
///     env_var: String,
/// }
///
/// impl CredentialsProvider for EnvCredentialsProvider {
///     fn get_token(&self) -> CredentialsFuture<'_> {
///         let env_var = self.env_var.clone();
///         Box::pin(async move {
///             std::env::var(&env_var).map_err(|_| {
///                 pam_grants::Error::client_initialization(format!(
///                     "environment variable {} not set",
///                     env_var
///                 ))
///             })
///         })
///     }
/// }
/// ```
pub trait CredentialsProvider: Send + Sync {
    /// Returns a future that resolves to a bearer token.
    fn get_token(&self) -> CredentialsFuture<'_>;

    /// Short name for log fields.
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<T: CredentialsProvider + ?Sized> CredentialsProvider for Arc<T> {
    fn get_token(&self) -> CredentialsFuture<'_> {
        (**self).get_token()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<T: CredentialsProvider + ?Sized> CredentialsProvider for Box<T> {
    fn get_token(&self) -> CredentialsFuture<'_> {
        (**self).get_token()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// A provider that always returns the same token.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: Arc<zeroize::Zeroizing<String>>,
}

impl StaticTokenProvider {
    /// Creates a new static token provider.
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: Arc::new(zeroize::Zeroizing::new(token.into())) }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider").field("token", &"[REDACTED]").finish()
    }
}

impl CredentialsProvider for StaticTokenProvider {
    fn get_token(&self) -> CredentialsFuture<'_> {
        let token = self.token.as_str().to_string();
        Box::pin(async move { Ok(token) })
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[cfg(feature = "rest")]
pub use metadata::MetadataServerProvider;

#[cfg(feature = "rest")]
mod metadata {
    use std::time::Duration;

    use serde::Deserialize;

    use super::{CredentialsFuture, CredentialsProvider};
    use crate::Error;

    /// Default token endpoint of the compute metadata server.
    pub const DEFAULT_METADATA_TOKEN_URL: &str =
        "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

    #[derive(Deserialize)]
    struct TokenResponse {
        access_token: String,
    }

    /// Fetches the attached service account's token from the compute
    /// metadata server.
    ///
    /// Tokens are fetched on every call and never cached.
    #[derive(Debug, Clone)]
    pub struct MetadataServerProvider {
        http: reqwest::Client,
        token_url: String,
    }

    impl MetadataServerProvider {
        /// Creates a provider for the default metadata server.
        pub fn new() -> Result<Self, Error> {
            Self::with_token_url(DEFAULT_METADATA_TOKEN_URL)
        }

        /// Creates a provider for a custom token URL (emulators, tests).
        pub fn with_token_url(token_url: impl Into<String>) -> Result<Self, Error> {
            let http = reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .map_err(|e| {
                    Error::client_initialization(format!(
                        "failed to create metadata server client: {}",
                        e
                    ))
                    .with_source(e)
                })?;
            Ok(Self { http, token_url: token_url.into() })
        }

        async fn fetch(&self) -> Result<String, Error> {
            let response = self
                .http
                .get(&self.token_url)
                .header("Metadata-Flavor", "Google")
                .send()
                .await
                .map_err(|e| {
                    Error::client_initialization(format!(
                        "failed to reach metadata server: {}",
                        e
                    ))
                    .with_source(e)
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(Error::client_initialization(format!(
                    "metadata server returned HTTP {}",
                    status.as_u16()
                )));
            }

            let body: TokenResponse = response.json().await.map_err(|e| {
                Error::client_initialization(format!("malformed metadata token response: {}", e))
                    .with_source(e)
            })?;
            Ok(body.access_token)
        }
    }

    impl CredentialsProvider for MetadataServerProvider {
        fn get_token(&self) -> CredentialsFuture<'_> {
            Box::pin(self.fetch())
        }

        fn name(&self) -> &'static str {
            "metadata_server"
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token_provider() {
        let provider = StaticTokenProvider::new("test_token");
        let token = provider.get_token().await.unwrap();
        assert_eq!(token, "test_token");
        assert_eq!(provider.name(), "static");
    }

    #[test]
    fn test_static_token_provider_debug_redacted() {
        let provider = StaticTokenProvider::new("very_secret");
        let debug = format!("{:?}", provider);
        assert!(debug.contains("StaticTokenProvider"));
        assert!(!debug.contains("very_secret"));
    }

    #[tokio::test]
    async fn test_arc_provider() {
        let provider: Arc<dyn CredentialsProvider> =
            Arc::new(StaticTokenProvider::new("arc_token"));
        assert_eq!(provider.get_token().await.unwrap(), "arc_token");
        assert_eq!(provider.name(), "static");
    }

    struct CountingProvider {
        counter: std::sync::atomic::AtomicU32,
    }

    impl CredentialsProvider for CountingProvider {
        fn get_token(&self) -> CredentialsFuture<'_> {
            let count = self.counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Box::pin(async move { Ok(format!("token_{}", count)) })
        }
    }

    #[tokio::test]
    async fn test_box_provider_delegates() {
        let provider: Box<dyn CredentialsProvider> =
            Box::new(CountingProvider { counter: std::sync::atomic::AtomicU32::new(0) });
        assert_eq!(provider.name(), "custom");
        assert_eq!(provider.get_token().await.unwrap(), "token_0");
        assert_eq!(provider.get_token().await.unwrap(), "token_1");
    }
}
