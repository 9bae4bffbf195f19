//! The grant lifecycle manager.

use std::sync::Arc;

use futures::TryStreamExt;
use tracing::Instrument;

use super::list::{GrantStream, grant_stream};
use super::operation::RevokeOperation;
use super::validate;
use crate::auth::{DelegatedCredential, Identity};
use crate::client::BackendConnector;
use crate::config::{PollConfig, ServiceConfig};
use crate::transport::{CreateGrantRequest, GrantTransitionRequest, GrantTransport};
use crate::types::{Grant, entitlement_name, grant_name};
use crate::{Error, ErrorClass};

/// Reason recorded when a revocation is submitted without one.
pub const DEFAULT_REVOKE_REASON: &str = "Access revoked by the grant lifecycle manager";

/// Runs grant operations against the privileged-access backend as one
/// identity.
///
/// Build one per request. With a [`DelegatedCredential`] every call runs as
/// that user; without one, [`list_grants`](Self::list_grants) and
/// [`revoke_grant`](Self::revoke_grant) run as the service's ambient
/// identity, while [`request_grant`](Self::request_grant) and
/// [`approve_grant`](Self::approve_grant) fail with
/// [`ErrorKind::MissingIdentity`](crate::ErrorKind::MissingIdentity) before
/// any backend contact.
///
/// Each operation connects a fresh backend client through the connector,
/// issues its calls and drops the client. Nothing is retried.
///
/// ```rust
/// # async fn example() -> Result<(), pam_grants::Error> {
/// use std::sync::Arc;
///
/// use pam_grants::testing::MockBackend;
/// use pam_grants::{GrantLifecycleManager, GrantState, IdentityBroker};
///
/// let backend = Arc::new(MockBackend::new());
/// let credential = IdentityBroker::from_authorization_header("Bearer user-token");
/// let manager = GrantLifecycleManager::new(backend, Some(credential));
///
/// let grant = manager.request_grant("proj1", "ent1", "incident 42", 3600).await?;
/// assert_eq!(grant.state(), &GrantState::PendingApproval);
/// # Ok(())
/// # }
/// ```
pub struct GrantLifecycleManager {
    connector: Arc<dyn BackendConnector>,
    identity: Identity,
    page_size: Option<u32>,
    poll: PollConfig,
}

impl std::fmt::Debug for GrantLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrantLifecycleManager")
            .field("identity", &self.identity.mode())
            .field("page_size", &self.page_size)
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}

impl GrantLifecycleManager {
    /// Creates a manager for one request.
    pub fn new(connector: Arc<dyn BackendConnector>, credential: Option<DelegatedCredential>) -> Self {
        Self {
            connector,
            identity: Identity::from(credential),
            page_size: None,
            poll: PollConfig::default(),
        }
    }

    /// Creates a manager with the page size and polling schedule from `config`.
    pub fn from_config(
        connector: Arc<dyn BackendConnector>,
        credential: Option<DelegatedCredential>,
        config: &ServiceConfig,
    ) -> Self {
        Self::new(connector, credential)
            .with_page_size(config.page_size)
            .with_poll_config(config.poll.clone())
    }

    /// Sets the listing page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the polling schedule for revocations.
    #[must_use]
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Returns the identity calls run as.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    fn require_delegated(&self, operation: &str) -> Result<(), Error> {
        if self.identity.is_delegated() {
            Ok(())
        } else {
            Err(Error::missing_identity(operation))
        }
    }

    async fn connect(&self) -> Result<Arc<dyn GrantTransport>, Error> {
        self.connector.connect(&self.identity).await.map_err(|e| {
            tracing::warn!(error = %e, "backend client construction failed");
            if e.class() == ErrorClass::ClientInitializationFailed {
                e
            } else {
                Error::client_initialization(format!(
                    "failed to construct backend client: {}",
                    e.message()
                ))
                .with_source(e)
            }
        })
    }

    /// Lists every grant of an entitlement as a lazy stream.
    ///
    /// Inputs are checked and the backend client is built before this
    /// returns; pages are fetched as the stream is polled.
    pub async fn list_grants(&self, project: &str, entitlement: &str) -> Result<GrantStream, Error> {
        let project = validate::identifier("project", project)?;
        let entitlement = validate::identifier("entitlement", entitlement)?;

        let span = tracing::info_span!(
            "grant.list",
            project,
            entitlement,
            identity = self.identity.mode()
        );
        async {
            let transport = self.connect().await?;
            Ok(grant_stream(transport, entitlement_name(project, entitlement), self.page_size))
        }
        .instrument(span)
        .await
    }

    /// Lists every grant of an entitlement.
    ///
    /// Returns all grants or the first error; never a partial result.
    pub async fn list_all_grants(&self, project: &str, entitlement: &str) -> Result<Vec<Grant>, Error> {
        let grants: Vec<Grant> = self.list_grants(project, entitlement).await?.try_collect().await?;
        tracing::debug!(project, entitlement, count = grants.len(), "listed grants");
        Ok(grants)
    }

    /// Requests a new grant as the delegated identity.
    pub async fn request_grant(
        &self,
        project: &str,
        entitlement: &str,
        justification: &str,
        duration_secs: i64,
    ) -> Result<Grant, Error> {
        self.require_delegated("request_grant")?;
        let project = validate::identifier("project", project)?;
        let entitlement = validate::identifier("entitlement", entitlement)?;
        let duration_secs = validate::duration_secs(duration_secs)?;

        let span = tracing::info_span!(
            "grant.request",
            project,
            entitlement,
            duration_secs,
            identity = self.identity.mode()
        );
        async {
            let transport = self.connect().await?;
            let resource = transport
                .create_grant(CreateGrantRequest {
                    parent: entitlement_name(project, entitlement),
                    justification: justification.to_string(),
                    requested_duration_secs: duration_secs,
                })
                .await?;
            let grant = Grant::from(resource);
            tracing::info!(grant = grant.id(), state = %grant.state(), "grant requested");
            Ok(grant)
        }
        .instrument(span)
        .await
    }

    /// Approves a pending grant as the delegated identity (the approver).
    ///
    /// Whether the transition is allowed is decided by the backend; a grant
    /// that is not pending typically fails with
    /// [`ErrorKind::FailedPrecondition`](crate::ErrorKind::FailedPrecondition).
    pub async fn approve_grant(
        &self,
        grant_id: &str,
        project: &str,
        entitlement: &str,
        reason: &str,
    ) -> Result<Grant, Error> {
        self.require_delegated("approve_grant")?;
        let grant_id = validate::identifier("grant_id", grant_id)?;
        let project = validate::identifier("project", project)?;
        let entitlement = validate::identifier("entitlement", entitlement)?;

        let span = tracing::info_span!(
            "grant.approve",
            project,
            entitlement,
            grant = grant_id,
            identity = self.identity.mode()
        );
        async {
            let transport = self.connect().await?;
            let resource = transport
                .approve_grant(GrantTransitionRequest {
                    name: grant_name(project, entitlement, grant_id),
                    reason: reason.to_string(),
                })
                .await?;
            let grant = Grant::from(resource);
            tracing::info!(state = %grant.state(), "grant approved");
            Ok(grant)
        }
        .instrument(span)
        .await
    }

    /// Submits a revocation and returns the operation to wait on.
    ///
    /// An empty `reason` is replaced with [`DEFAULT_REVOKE_REASON`].
    pub async fn begin_revoke(
        &self,
        grant_id: &str,
        project: &str,
        entitlement: &str,
        reason: &str,
    ) -> Result<RevokeOperation, Error> {
        let grant_id = validate::identifier("grant_id", grant_id)?;
        let project = validate::identifier("project", project)?;
        let entitlement = validate::identifier("entitlement", entitlement)?;
        let reason = if reason.trim().is_empty() { DEFAULT_REVOKE_REASON } else { reason };

        let span = tracing::info_span!(
            "grant.revoke",
            project,
            entitlement,
            grant = grant_id,
            identity = self.identity.mode()
        );
        async {
            let transport = self.connect().await?;
            let operation = transport
                .revoke_grant(GrantTransitionRequest {
                    name: grant_name(project, entitlement, grant_id),
                    reason: reason.to_string(),
                })
                .await?;
            tracing::debug!(operation = %operation.name, done = operation.done, "revocation submitted");
            Ok(RevokeOperation::new(transport, operation, self.poll.clone()))
        }
        .instrument(span)
        .await
    }

    /// Revokes a grant and waits for the revocation to finish.
    ///
    /// Equivalent to [`begin_revoke`](Self::begin_revoke) followed by
    /// [`RevokeOperation::wait`].
    pub async fn revoke_grant(
        &self,
        grant_id: &str,
        project: &str,
        entitlement: &str,
        reason: &str,
    ) -> Result<Grant, Error> {
        let operation = self.begin_revoke(grant_id, project, entitlement, reason).await?;
        let grant = operation.wait().await?;
        tracing::info!(grant = grant.id(), state = %grant.state(), "grant revoked");
        Ok(grant)
    }
}
