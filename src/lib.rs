//! # pam-grants
//!
//! Grant lifecycle client for Google Cloud Privileged Access Manager.
//!
//! A grant is a time-bounded elevation of privilege on an entitlement. This
//! crate lists, requests, approves and revokes grants, running every backend
//! call as the identity of the request it serves.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pam_grants::client::RestConnector;
//! use pam_grants::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> pam_grants::Result<()> {
//!     let config = ServiceConfig::from_env()?;
//!     let connector = Arc::new(RestConnector::from_config(&config)?);
//!
//!     // The caller's bearer token, taken from the inbound request.
//!     let credential = IdentityBroker::from_authorization_header("Bearer ya29.example");
//!     let manager = GrantLifecycleManager::from_config(connector, Some(credential), &config);
//!
//!     let grant = manager.request_grant("my-project", "prod-admin", "incident 4711", 3600).await?;
//!     println!("{} is {}", grant.id(), grant.state());
//!     Ok(())
//! }
//! ```
//!
//! ## Key Concepts
//!
//! - **Identity per call**: a [`GrantLifecycleManager`] built with a
//!   [`DelegatedCredential`] acts as that user; without one, listing and
//!   revocation fall back to the service's ambient identity
//! - **Mutations need a user**: requesting and approving without a delegated
//!   credential fails with [`ErrorKind::MissingIdentity`]
//! - **Revocation is long-running**: [`GrantLifecycleManager::revoke_grant`]
//!   polls the backend operation until it finishes
//! - **Errors are classified**: every [`Error`] carries an [`ErrorClass`] for
//!   mapping onto outward status codes
//!
//! ## Features
//!
//! - `rest` (default): REST transport via reqwest
//! - `rustls` (default): Use rustls for TLS
//! - `native-tls`: Use native TLS (OpenSSL on Linux, Secure Transport on macOS)

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

// Core modules
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod grants;
pub mod types;

// Transport layer
pub mod transport;

// Testing utilities
pub mod testing;

// Prelude for convenient imports
pub mod prelude;

#[cfg(feature = "rest")]
mod user_agent;

// Re-export main types at crate root for convenience
pub use error::{Error, ErrorClass, ErrorKind, Result};
pub use grants::{DEFAULT_REVOKE_REASON, GrantLifecycleManager, GrantStream, RevokeOperation};
pub use types::{Grant, GrantState};

// Re-export auth types
pub use auth::{CredentialsProvider, DelegatedCredential, Identity, IdentityBroker, StaticTokenProvider};

// Re-export config types
pub use config::{PollConfig, ServiceConfig, TlsConfig};
