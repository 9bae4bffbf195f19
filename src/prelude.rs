//! Prelude module for convenient imports.
//!
//! ```rust
//! use pam_grants::prelude::*;
//! ```
//!
//! This provides access to:
//! - The grant lifecycle manager
//! - Error types
//! - Identity types
//! - Grant data types

pub use crate::{
    auth::{CredentialsProvider, DelegatedCredential, Identity, IdentityBroker, StaticTokenProvider},
    client::BackendConnector,
    config::{PollConfig, ServiceConfig, TlsConfig},
    error::{Error, ErrorClass, ErrorKind, Result},
    grants::{GrantLifecycleManager, GrantStream, RevokeOperation},
    types::{Grant, GrantState},
};
