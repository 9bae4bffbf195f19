//! Connector for the REST transport.

use std::sync::Arc;
use std::time::Duration;

use url::Url;
use zeroize::Zeroizing;

use super::BackendConnector;
use crate::auth::{
    BEARER_TOKEN_TYPE, CredentialsProvider, Identity, MetadataServerProvider, StaticTokenProvider,
};
use crate::config::{DEFAULT_ENDPOINT, ServiceConfig, TlsConfig};
use crate::transport::rest::{authorization_header, build_http_client};
use crate::transport::{GrantTransport, RestTransport};
use crate::Error;

/// Builds [`RestTransport`]s scoped to one identity each.
///
/// The HTTP connection pool is shared between all transports and carries
/// no identity. Delegated identities are attached as-is; the ambient
/// identity's token is fetched from the configured
/// [`CredentialsProvider`] on every connect.
#[derive(Clone)]
pub struct RestConnector {
    http: reqwest::Client,
    base_url: Url,
    ambient: Arc<dyn CredentialsProvider>,
}

impl std::fmt::Debug for RestConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestConnector")
            .field("base_url", &self.base_url.as_str())
            .field("ambient", &self.ambient.name())
            .finish_non_exhaustive()
    }
}

impl RestConnector {
    /// Creates a new connector builder.
    pub fn builder() -> RestConnectorBuilder {
        RestConnectorBuilder::new()
    }

    /// Creates a connector from service configuration.
    ///
    /// A configured ambient token selects [`StaticTokenProvider`]; otherwise
    /// the metadata server is used.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, Error> {
        let mut builder = Self::builder()
            .base_url(config.endpoint.as_str())?
            .request_timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .tls_config(config.tls.clone());
        if let Some(ref token) = config.ambient_token {
            builder = builder.ambient_credentials(StaticTokenProvider::new(token.clone()));
        }
        builder.build()
    }

    /// Returns the backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn authorization_for(&self, identity: &Identity) -> Result<Zeroizing<String>, Error> {
        match identity {
            Identity::Delegated(credential) => Ok(credential.authorization_value()),
            Identity::Ambient => {
                let token = self.ambient.get_token().await.map_err(|e| {
                    Error::client_initialization(format!(
                        "failed to obtain ambient credential from {} provider: {}",
                        self.ambient.name(),
                        e.message()
                    ))
                    .with_source(e)
                })?;
                Ok(Zeroizing::new(format!("{} {}", BEARER_TOKEN_TYPE, token)))
            }
        }
    }
}

#[async_trait::async_trait]
impl BackendConnector for RestConnector {
    async fn connect(&self, identity: &Identity) -> Result<Arc<dyn GrantTransport>, Error> {
        let value = self.authorization_for(identity).await?;
        let header = authorization_header(&value)?;
        tracing::debug!(identity = identity.mode(), base_url = %self.base_url, "connected backend client");
        Ok(Arc::new(RestTransport::new(self.http.clone(), self.base_url.clone(), header)))
    }
}

/// Builder for [`RestConnector`].
pub struct RestConnectorBuilder {
    base_url: Option<Url>,
    tls_config: TlsConfig,
    request_timeout: Duration,
    connect_timeout: Duration,
    ambient: Option<Arc<dyn CredentialsProvider>>,
}

impl RestConnectorBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            tls_config: TlsConfig::default(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            ambient: None,
        }
    }

    /// Sets the base URL. Defaults to the public Privileged Access Manager
    /// endpoint.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self, Error> {
        let config = ServiceConfig::new().with_endpoint(url.as_ref())?;
        self.base_url = Some(config.endpoint);
        Ok(self)
    }

    /// Sets the TLS configuration.
    pub fn tls_config(mut self, config: TlsConfig) -> Self {
        self.tls_config = config;
        self
    }

    /// Sets the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the provider of the ambient credential.
    pub fn ambient_credentials(mut self, provider: impl CredentialsProvider + 'static) -> Self {
        self.ambient = Some(Arc::new(provider));
        self
    }

    /// Builds the connector.
    pub fn build(self) -> Result<RestConnector, Error> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_ENDPOINT)?,
        };
        let http = build_http_client(&self.tls_config, self.request_timeout, self.connect_timeout)?;
        let ambient: Arc<dyn CredentialsProvider> = match self.ambient {
            Some(provider) => provider,
            None => Arc::new(MetadataServerProvider::new()?),
        };
        Ok(RestConnector { http, base_url, ambient })
    }
}
