//! In-memory backend used by [`MockBackend`](crate::testing::MockBackend).
//!
//! [`MockState`] is the shared backend; each [`MockTransport`] is a view of
//! it bound to the identity it was connected with.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use parking_lot::RwLock;

use super::traits::{
    CreateGrantRequest, GrantTransitionRequest, GrantTransport, ListGrantsRequest,
    ListGrantsResponse, Transport,
};
use crate::auth::Identity;
use crate::types::{
    GLOBAL_LOCATION, GrantResource, GrantState, Justification, Operation, Status,
    format_duration_secs,
};
use crate::Error;

/// Requester recorded for grants created with the ambient identity.
pub(crate) const AMBIENT_PRINCIPAL: &str = "service-account";

/// Requester recorded for delegated tokens with no registered principal.
pub(crate) const UNKNOWN_PRINCIPAL: &str = "unknown-user";

const FAILED_PRECONDITION: i32 = 9;

struct PendingOperation {
    grant_name: String,
    remaining_polls: u32,
    outcome: Result<(), Status>,
}

/// Shared state of the in-memory backend.
pub(crate) struct MockState {
    grants: RwLock<Vec<GrantResource>>,
    operations: RwLock<HashMap<String, PendingOperation>>,
    principals: RwLock<HashMap<String, String>>,
    request_count: AtomicU64,
    next_id: AtomicU64,
    revoke_polls: AtomicU32,
    page_size: RwLock<Option<usize>>,
    simulate_failure: RwLock<Option<Error>>,
}

impl MockState {
    pub(crate) fn new() -> Self {
        Self {
            grants: RwLock::new(Vec::new()),
            operations: RwLock::new(HashMap::new()),
            principals: RwLock::new(HashMap::new()),
            request_count: AtomicU64::new(0),
            next_id: AtomicU64::new(1),
            revoke_polls: AtomicU32::new(0),
            page_size: RwLock::new(None),
            simulate_failure: RwLock::new(None),
        }
    }

    pub(crate) fn insert_grant(&self, grant: GrantResource) {
        let mut grants = self.grants.write();
        match grants.iter_mut().find(|g| g.name == grant.name) {
            Some(existing) => *existing = grant,
            None => grants.push(grant),
        }
    }

    pub(crate) fn grant(&self, name: &str) -> Option<GrantResource> {
        self.grants.read().iter().find(|g| g.name == name).cloned()
    }

    pub(crate) fn grants(&self) -> Vec<GrantResource> {
        self.grants.read().clone()
    }

    pub(crate) fn set_principal(&self, token: String, principal: String) {
        self.principals.write().insert(token, principal);
    }

    pub(crate) fn set_page_size(&self, page_size: Option<usize>) {
        *self.page_size.write() = page_size.filter(|n| *n > 0);
    }

    pub(crate) fn set_revoke_polls(&self, polls: u32) {
        self.revoke_polls.store(polls, Ordering::Relaxed);
    }

    /// Sets a failure returned by the next request.
    pub(crate) fn set_failure(&self, error: Error) {
        *self.simulate_failure.write() = Some(error);
    }

    pub(crate) fn clear_failure(&self) {
        *self.simulate_failure.write() = None;
    }

    pub(crate) fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    fn begin_request(&self, identity: &Identity) -> Result<(), Error> {
        self.request_count.fetch_add(1, Ordering::Relaxed);

        if let Some(error) = self.simulate_failure.write().take() {
            return Err(error);
        }

        match identity {
            Identity::Delegated(credential) if credential.is_empty() => {
                Err(Error::unauthorized("request had invalid authentication credentials")
                    .with_backend_status("UNAUTHENTICATED"))
            }
            _ => Ok(()),
        }
    }

    fn principal_for(&self, identity: &Identity) -> String {
        match identity {
            Identity::Ambient => AMBIENT_PRINCIPAL.to_string(),
            Identity::Delegated(credential) => self
                .principals
                .read()
                .get(credential.access_token())
                .cloned()
                .unwrap_or_else(|| UNKNOWN_PRINCIPAL.to_string()),
        }
    }

    fn update_state(&self, name: &str, state: GrantState) -> Option<GrantResource> {
        let mut grants = self.grants.write();
        let grant = grants.iter_mut().find(|g| g.name == name)?;
        grant.state = Some(state.as_str().to_string());
        Some(grant.clone())
    }

    fn finish_operation(&self, name: &str, op: &PendingOperation) -> Operation {
        match &op.outcome {
            Ok(()) => Operation {
                name: name.to_string(),
                done: true,
                error: None,
                response: self.update_state(&op.grant_name, GrantState::Revoked),
            },
            Err(status) => Operation {
                name: name.to_string(),
                done: true,
                error: Some(status.clone()),
                response: None,
            },
        }
    }
}

fn not_found(what: &str, name: &str) -> Error {
    Error::not_found(format!("{} {} not found", what, name)).with_backend_status("NOT_FOUND")
}

/// A view of [`MockState`] bound to one identity.
pub(crate) struct MockTransport {
    state: Arc<MockState>,
    identity: Identity,
}

impl MockTransport {
    pub(crate) fn new(state: Arc<MockState>, identity: Identity) -> Self {
        Self { state, identity }
    }
}

#[async_trait::async_trait]
impl GrantTransport for MockTransport {
    async fn list_grants(&self, request: ListGrantsRequest) -> Result<ListGrantsResponse, Error> {
        self.state.begin_request(&self.identity)?;

        let prefix = format!("{}/grants/", request.parent);
        let matching: Vec<GrantResource> = self
            .state
            .grants
            .read()
            .iter()
            .filter(|g| g.name.starts_with(&prefix))
            .cloned()
            .collect();

        let offset = match request.page_token.as_deref() {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| Error::new(crate::ErrorKind::InvalidArgument, "invalid page token"))?,
        };
        let page_size = request
            .page_size
            .map(|n| n as usize)
            .or(*self.state.page_size.read())
            .unwrap_or(usize::MAX);

        let end = offset.saturating_add(page_size).min(matching.len());
        let grants = matching.get(offset..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_page_token = (end < matching.len()).then(|| end.to_string());

        Ok(ListGrantsResponse { grants, next_page_token })
    }

    async fn create_grant(&self, request: CreateGrantRequest) -> Result<GrantResource, Error> {
        self.state.begin_request(&self.identity)?;

        let id = self.state.next_id.fetch_add(1, Ordering::Relaxed);
        let grant = GrantResource {
            name: format!("{}/grants/g{}", request.parent, id),
            requester: self.state.principal_for(&self.identity),
            requested_duration: Some(format_duration_secs(request.requested_duration_secs)),
            justification: Some(Justification::unstructured(request.justification)),
            state: Some(GrantState::PendingApproval.as_str().to_string()),
            ..Default::default()
        };
        self.state.grants.write().push(grant.clone());
        Ok(grant)
    }

    async fn approve_grant(&self, request: GrantTransitionRequest) -> Result<GrantResource, Error> {
        self.state.begin_request(&self.identity)?;

        let grant = self.state.grant(&request.name).ok_or_else(|| not_found("grant", &request.name))?;
        let state = grant.state.as_deref().map(GrantState::parse).unwrap_or_default();
        if !state.is_pending() {
            return Err(Error::failed_precondition(format!(
                "grant {} is in state {} and cannot be approved",
                request.name, state
            ))
            .with_backend_status("FAILED_PRECONDITION"));
        }

        self.state
            .update_state(&request.name, GrantState::Approved)
            .ok_or_else(|| not_found("grant", &request.name))
    }

    async fn revoke_grant(&self, request: GrantTransitionRequest) -> Result<Operation, Error> {
        self.state.begin_request(&self.identity)?;

        let grant = self.state.grant(&request.name).ok_or_else(|| not_found("grant", &request.name))?;
        let state = grant.state.as_deref().map(GrantState::parse).unwrap_or_default();
        let outcome = if state.is_terminal() {
            Err(Status {
                code: FAILED_PRECONDITION,
                message: format!("grant {} is already {}", request.name, state),
                status: None,
            })
        } else {
            Ok(())
        };

        let project = request.name.split('/').nth(1).unwrap_or_default();
        let id = self.state.next_id.fetch_add(1, Ordering::Relaxed);
        let name = format!("projects/{}/locations/{}/operations/op{}", project, GLOBAL_LOCATION, id);
        let pending = PendingOperation {
            grant_name: request.name,
            remaining_polls: self.state.revoke_polls.load(Ordering::Relaxed),
            outcome,
        };

        if pending.remaining_polls == 0 {
            return Ok(self.state.finish_operation(&name, &pending));
        }
        self.state.operations.write().insert(name.clone(), pending);
        Ok(Operation { name, done: false, error: None, response: None })
    }

    async fn get_operation(&self, name: &str) -> Result<Operation, Error> {
        self.state.begin_request(&self.identity)?;

        let finished = {
            let mut operations = self.state.operations.write();
            let op = operations.get_mut(name).ok_or_else(|| not_found("operation", name))?;
            op.remaining_polls = op.remaining_polls.saturating_sub(1);
            if op.remaining_polls > 0 {
                None
            } else {
                operations.remove(name)
            }
        };

        match finished {
            Some(op) => Ok(self.state.finish_operation(name, &op)),
            None => Ok(Operation { name: name.to_string(), done: false, error: None, response: None }),
        }
    }

    fn transport_type(&self) -> Transport {
        Transport::Mock
    }
}
