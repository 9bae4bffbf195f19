//! Transport trait definitions and request/response types.

use crate::types::{GrantResource, Operation};
use crate::Error;

/// Available transport implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// JSON over HTTPS.
    Http,
    /// In-memory backend for tests.
    Mock,
}

impl Transport {
    /// Returns `true` if this is HTTP/REST transport.
    pub fn is_http(&self) -> bool {
        matches!(self, Transport::Http)
    }

    /// Returns `true` if this is mock transport.
    pub fn is_mock(&self) -> bool {
        matches!(self, Transport::Mock)
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Http => write!(f, "HTTP/REST"),
            Transport::Mock => write!(f, "Mock"),
        }
    }
}

/// Request for one page of grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListGrantsRequest {
    /// Entitlement resource name.
    pub parent: String,
    /// Maximum grants per page; `None` lets the backend decide.
    pub page_size: Option<u32>,
    /// Token from the previous page.
    pub page_token: Option<String>,
}

/// One page of grants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListGrantsResponse {
    /// Grants on this page.
    pub grants: Vec<GrantResource>,
    /// Token for the next page; `None` when the listing is exhausted.
    pub next_page_token: Option<String>,
}

/// Request to create a grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGrantRequest {
    /// Entitlement resource name.
    pub parent: String,
    /// Free-text justification.
    pub justification: String,
    /// Requested duration in seconds.
    pub requested_duration_secs: i64,
}

/// Request to move a grant to a new state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantTransitionRequest {
    /// Grant resource name.
    pub name: String,
    /// Reason recorded with the transition.
    pub reason: String,
}

/// Backend client scoped to exactly one identity.
///
/// Each method issues a single RPC. Implementations never retry.
#[async_trait::async_trait]
pub trait GrantTransport: Send + Sync {
    /// Fetches one page of grants.
    async fn list_grants(&self, request: ListGrantsRequest) -> Result<ListGrantsResponse, Error>;

    /// Creates a grant.
    async fn create_grant(&self, request: CreateGrantRequest) -> Result<GrantResource, Error>;

    /// Approves a pending grant.
    async fn approve_grant(&self, request: GrantTransitionRequest) -> Result<GrantResource, Error>;

    /// Starts revoking a grant and returns the operation handle.
    async fn revoke_grant(&self, request: GrantTransitionRequest) -> Result<Operation, Error>;

    /// Fetches the current state of a long-running operation.
    async fn get_operation(&self, name: &str) -> Result<Operation, Error>;

    /// Returns the transport type.
    fn transport_type(&self) -> Transport;
}
