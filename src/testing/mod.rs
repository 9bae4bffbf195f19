//! Testing utilities.
//!
//! [`MockBackend`] is an in-memory privileged-access backend that plugs into
//! [`GrantLifecycleManager`](crate::GrantLifecycleManager) as its
//! [`BackendConnector`](crate::client::BackendConnector).
//!
//! ## Quick Start
//!
//! ```rust
//! # async fn example() -> Result<(), pam_grants::Error> {
//! use std::sync::Arc;
//!
//! use pam_grants::testing::MockBackend;
//! use pam_grants::{GrantLifecycleManager, IdentityBroker};
//!
//! let backend = Arc::new(MockBackend::new());
//! let requester = GrantLifecycleManager::new(
//!     backend.clone(),
//!     Some(IdentityBroker::wrap_bearer_token("requester-token")),
//! );
//! let approver = GrantLifecycleManager::new(
//!     backend.clone(),
//!     Some(IdentityBroker::wrap_bearer_token("approver-token")),
//! );
//!
//! let grant = requester.request_grant("proj1", "ent1", "deploy", 3600).await?;
//! approver.approve_grant(grant.id(), "proj1", "ent1", "ok").await?;
//! assert_eq!(backend.connect_count(), 2);
//! # Ok(())
//! # }
//! ```

mod mock_backend;

pub use mock_backend::MockBackend;
