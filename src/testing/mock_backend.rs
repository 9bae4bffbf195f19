//! MockBackend: an in-memory privileged-access backend.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::auth::Identity;
use crate::client::BackendConnector;
use crate::transport::GrantTransport;
use crate::transport::mock::{MockState, MockTransport};
use crate::types::GrantResource;
use crate::Error;

/// An in-memory backend that records which identities connected to it.
///
/// Grants live in shared state, so a grant requested by one manager can be
/// approved by another. Revocations resolve after a configurable number of
/// operation polls.
///
/// ## Example
///
/// ```rust
/// use pam_grants::testing::MockBackend;
/// use pam_grants::types::GrantResource;
///
/// let backend = MockBackend::new();
/// backend.insert_grant(GrantResource {
///     name: "projects/p/locations/global/entitlements/e/grants/g1".to_string(),
///     state: Some("ACTIVE".to_string()),
///     ..Default::default()
/// });
/// backend.set_revoke_polls(2);
/// assert_eq!(backend.grants().len(), 1);
/// ```
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<MockState>,
    connections: Arc<Mutex<Vec<Identity>>>,
    connect_failure: Arc<Mutex<Option<Error>>>,
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBackend")
            .field("grants", &self.state.grants().len())
            .field("connections", &self.connections.lock().len())
            .field("requests", &self.state.request_count())
            .finish()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self {
            state: Arc::new(MockState::new()),
            connections: Arc::new(Mutex::new(Vec::new())),
            connect_failure: Arc::new(Mutex::new(None)),
        }
    }

    /// Inserts a grant, replacing any grant with the same name.
    pub fn insert_grant(&self, grant: GrantResource) {
        self.state.insert_grant(grant);
    }

    /// Returns the stored grant with the given resource name.
    pub fn grant(&self, name: &str) -> Option<GrantResource> {
        self.state.grant(name)
    }

    /// Returns every stored grant in insertion order.
    pub fn grants(&self) -> Vec<GrantResource> {
        self.state.grants()
    }

    /// Records `principal` as the requester for grants created with `token`.
    pub fn set_principal(&self, token: impl Into<String>, principal: impl Into<String>) {
        self.state.set_principal(token.into(), principal.into());
    }

    /// Caps listing pages at `page_size` grants when the caller sets none.
    pub fn set_page_size(&self, page_size: usize) {
        self.state.set_page_size(Some(page_size));
    }

    /// Number of operation polls before a revocation completes.
    ///
    /// Zero (the default) completes revocations immediately.
    pub fn set_revoke_polls(&self, polls: u32) {
        self.state.set_revoke_polls(polls);
    }

    /// Fails the next backend request with `error`.
    pub fn set_failure(&self, error: Error) {
        self.state.set_failure(error);
    }

    /// Clears a pending request failure.
    pub fn clear_failure(&self) {
        self.state.clear_failure();
        *self.connect_failure.lock() = None;
    }

    /// Fails the next connect with `error`.
    pub fn fail_connect(&self, error: Error) {
        *self.connect_failure.lock() = Some(error);
    }

    /// Returns the identities of every connect, in order.
    pub fn connections(&self) -> Vec<Identity> {
        self.connections.lock().clone()
    }

    /// Returns the number of connects, including failed ones.
    pub fn connect_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Returns the identity of the most recent connect.
    pub fn last_identity(&self) -> Option<Identity> {
        self.connections.lock().last().cloned()
    }

    /// Returns the number of backend requests served.
    pub fn request_count(&self) -> u64 {
        self.state.request_count()
    }
}

#[async_trait::async_trait]
impl BackendConnector for MockBackend {
    async fn connect(&self, identity: &Identity) -> Result<Arc<dyn GrantTransport>, Error> {
        self.connections.lock().push(identity.clone());
        if let Some(error) = self.connect_failure.lock().take() {
            return Err(error);
        }
        Ok(Arc::new(MockTransport::new(Arc::clone(&self.state), identity.clone())))
    }
}
