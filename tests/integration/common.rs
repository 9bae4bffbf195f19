//! Common harness for integration tests.

use std::sync::{Arc, Once};

use anyhow::Result;
use pam_grants::client::RestConnector;
use pam_grants::{GrantLifecycleManager, IdentityBroker, PollConfig, StaticTokenProvider};
use serde_json::{Value, json};
use wiremock::MockServer;

pub const PROJECT: &str = "proj1";
pub const ENTITLEMENT: &str = "ent1";
pub const AMBIENT_TOKEN: &str = "ambient-token";

static TRACING: Once = Once::new();

/// Installs a test subscriber honoring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// URL path of the entitlement's grant collection.
pub fn grants_path() -> String {
    format!("/v1/projects/{}/locations/global/entitlements/{}/grants", PROJECT, ENTITLEMENT)
}

/// URL path of one grant, with an optional `:verb` suffix.
pub fn grant_path(id: &str, verb: &str) -> String {
    format!("{}/{}{}", grants_path(), id, verb)
}

/// Resource name of one grant.
pub fn grant_resource_name(id: &str) -> String {
    format!("projects/{}/locations/global/entitlements/{}/grants/{}", PROJECT, ENTITLEMENT, id)
}

/// Backend JSON for a grant.
pub fn grant_json(id: &str, state: &str) -> Value {
    json!({
        "name": grant_resource_name(id),
        "requester": "alice@example.com",
        "requestedDuration": "3600s",
        "justification": { "unstructuredJustification": "need access" },
        "state": state,
        "privilegedAccess": {
            "gcpIamAccess": {
                "resourceType": "cloudresourcemanager.googleapis.com/Project",
                "resource": format!("//cloudresourcemanager.googleapis.com/projects/{}", PROJECT),
                "roleBindings": [{ "role": "roles/viewer" }]
            }
        },
        "createTime": "2026-10-19T10:00:00Z"
    })
}

/// Starts a mock backend.
pub async fn start_backend() -> MockServer {
    init_tracing();
    MockServer::start().await
}

/// Builds a connector against `server` with a static ambient token.
pub fn connector(server: &MockServer) -> Result<Arc<RestConnector>> {
    let connector = RestConnector::builder()
        .base_url(server.uri())?
        .ambient_credentials(StaticTokenProvider::new(AMBIENT_TOKEN))
        .build()?;
    Ok(Arc::new(connector))
}

/// A manager acting as the user holding `token`, or as the ambient identity.
pub fn manager(connector: &Arc<RestConnector>, token: Option<&str>) -> GrantLifecycleManager {
    GrantLifecycleManager::new(connector.clone(), token.map(IdentityBroker::wrap_bearer_token))
        .with_poll_config(PollConfig::immediate())
}
