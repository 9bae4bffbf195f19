//! Waiting on revocation long-running operations.

use std::future::Future;
use std::sync::Arc;

use crate::config::PollConfig;
use crate::transport::GrantTransport;
use crate::types::{Grant, Operation};
use crate::Error;

/// A submitted revocation.
///
/// Holds the backend client it was submitted with, so polling runs as the
/// same identity. Dropping the handle, or the future returned by
/// [`wait`](RevokeOperation::wait), stops polling; the revocation itself
/// continues on the backend.
pub struct RevokeOperation {
    transport: Arc<dyn GrantTransport>,
    operation: Operation,
    poll: PollConfig,
}

impl std::fmt::Debug for RevokeOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevokeOperation")
            .field("name", &self.operation.name)
            .field("done", &self.operation.done)
            .finish_non_exhaustive()
    }
}

impl RevokeOperation {
    pub(crate) fn new(
        transport: Arc<dyn GrantTransport>,
        operation: Operation,
        poll: PollConfig,
    ) -> Self {
        Self { transport, operation, poll }
    }

    /// Operation resource name.
    pub fn name(&self) -> &str {
        &self.operation.name
    }

    /// Returns `true` if the backend already reported a result.
    pub fn is_done(&self) -> bool {
        self.operation.done
    }

    /// Polls until the operation resolves and returns the revoked grant.
    ///
    /// Waits without a deadline. A failed operation yields its error,
    /// classified by the backend's status code; a failed poll yields the
    /// poll error.
    pub async fn wait(self) -> Result<Grant, Error> {
        let Self { transport, mut operation, poll } = self;
        let mut attempt: u32 = 0;

        while !operation.done {
            if operation.name.is_empty() {
                return Err(Error::invalid_response(
                    "backend returned an unfinished operation without a name",
                ));
            }
            tokio::time::sleep(poll.delay_for_attempt(attempt)).await;
            attempt = attempt.saturating_add(1);
            tracing::debug!(operation = %operation.name, attempt, "polling revoke operation");
            operation = transport.get_operation(&operation.name).await?;
        }

        resolve(operation)
    }

    /// Like [`wait`](RevokeOperation::wait), but gives up when `cancel`
    /// completes first, returning [`ErrorKind::Cancelled`](crate::ErrorKind::Cancelled).
    ///
    /// ```rust,no_run
    /// # async fn example(op: pam_grants::grants::RevokeOperation) {
    /// use std::time::Duration;
    ///
    /// let result = op.wait_or_cancel(tokio::time::sleep(Duration::from_secs(30))).await;
    /// # let _ = result;
    /// # }
    /// ```
    pub async fn wait_or_cancel<F>(self, cancel: F) -> Result<Grant, Error>
    where
        F: Future<Output = ()>,
    {
        let name = self.operation.name.clone();
        tokio::select! {
            result = self.wait() => result,
            () = cancel => {
                tracing::debug!(operation = %name, "revoke wait cancelled");
                Err(Error::cancelled(format!("wait for operation {name} was cancelled")))
            }
        }
    }
}

fn resolve(operation: Operation) -> Result<Grant, Error> {
    if let Some(status) = operation.error {
        return Err(Error::from_rpc_status(status.code, status.status.as_deref(), &status.message));
    }
    operation.response.map(Grant::from).ok_or_else(|| {
        Error::invalid_response(format!(
            "operation {} completed without a result",
            operation.name
        ))
    })
}
