//! Per-request backend client construction.
//!
//! A [`BackendConnector`] turns an [`Identity`] into a backend client scoped
//! to that identity. There is no process-wide client: every request connects
//! with the identity it runs as, and the client is dropped with the request.
//!
//! ```rust,no_run
//! # #[cfg(feature = "rest")]
//! # async fn example() -> Result<(), pam_grants::Error> {
//! use pam_grants::client::{BackendConnector, RestConnector};
//! use pam_grants::{IdentityBroker, ServiceConfig};
//!
//! let connector = RestConnector::from_config(&ServiceConfig::from_env()?)?;
//! let credential = IdentityBroker::from_authorization_header("Bearer user-token");
//! let transport = connector.connect(&credential.into()).await?;
//! # let _ = transport;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "rest")]
mod rest;

use std::sync::Arc;

use crate::auth::Identity;
use crate::transport::GrantTransport;
use crate::Error;

#[cfg(feature = "rest")]
pub use rest::{RestConnector, RestConnectorBuilder};

/// Factory for identity-scoped backend clients.
///
/// Construction failures (credential fetch, header or HTTP client setup)
/// must be reported with class
/// [`ClientInitializationFailed`](crate::ErrorClass::ClientInitializationFailed).
#[async_trait::async_trait]
pub trait BackendConnector: Send + Sync {
    /// Builds a backend client that runs every call as `identity`.
    async fn connect(&self, identity: &Identity) -> Result<Arc<dyn GrantTransport>, Error>;
}

#[async_trait::async_trait]
impl<T: BackendConnector + ?Sized> BackendConnector for Arc<T> {
    async fn connect(&self, identity: &Identity) -> Result<Arc<dyn GrantTransport>, Error> {
        (**self).connect(identity).await
    }
}
