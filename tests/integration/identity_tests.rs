//! Identity scoping of backend calls.

use std::sync::Arc;

use anyhow::Result;
use pam_grants::auth::MetadataServerProvider;
use pam_grants::client::RestConnector;
use pam_grants::{ErrorClass, ErrorKind, GrantLifecycleManager, IdentityBroker, PollConfig};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::*;

#[tokio::test]
async fn test_list_without_credential_uses_ambient_token() -> Result<()> {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path(grants_path()))
        .and(header("authorization", format!("Bearer {}", AMBIENT_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "grants": [grant_json("g1", "ACTIVE")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connector = connector(&server)?;
    let grants = manager(&connector, None).list_all_grants(PROJECT, ENTITLEMENT).await?;
    assert_eq!(grants.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_requests_keep_their_own_identity() -> Result<()> {
    let server = start_backend().await;
    for user in ["alice", "bob"] {
        Mock::given(method("POST"))
            .and(path(grants_path()))
            .and(header("authorization", format!("Bearer {}-token", user).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": grant_resource_name(&format!("{}-grant", user)),
                "requester": format!("{}@example.com", user),
                "requestedDuration": "600s",
                "state": "PENDING_APPROVAL"
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let connector = connector(&server)?;
    let alice = manager(&connector, Some("alice-token"));
    let bob = manager(&connector, Some("bob-token"));
    let (a, b) = tokio::try_join!(
        alice.request_grant(PROJECT, ENTITLEMENT, "a", 600),
        bob.request_grant(PROJECT, ENTITLEMENT, "b", 600),
    )?;

    assert_eq!(a.requester(), "alice@example.com");
    assert_eq!(b.requester(), "bob@example.com");
    Ok(())
}

#[tokio::test]
async fn test_mutations_without_credential_never_reach_backend() -> Result<()> {
    let server = start_backend().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let connector = connector(&server)?;
    let ambient = manager(&connector, None);

    let err = ambient.request_grant(PROJECT, ENTITLEMENT, "why", 3600).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingIdentity);
    assert_eq!(err.class(), ErrorClass::InvalidInput);

    let err = ambient.approve_grant("g1", PROJECT, ENTITLEMENT, "ok").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingIdentity);
    Ok(())
}

#[tokio::test]
async fn test_invalid_input_never_reaches_backend() -> Result<()> {
    let server = start_backend().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let connector = connector(&server)?;
    let user = manager(&connector, Some("user-token"));

    let err = user.request_grant(PROJECT, ENTITLEMENT, "why", 0).await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::InvalidInput);
    let err = user.list_all_grants("", ENTITLEMENT).await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::InvalidInput);
    Ok(())
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() -> Result<()> {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "code": 401,
                "message": "Request had invalid authentication credentials.",
                "status": "UNAUTHENTICATED"
            }
        })))
        .mount(&server)
        .await;

    let connector = connector(&server)?;
    let credential = IdentityBroker::from_authorization_header("Bearer expired");
    let err = GrantLifecycleManager::new(connector, Some(credential))
        .list_all_grants(PROJECT, ENTITLEMENT)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.class(), ErrorClass::BackendOperationFailed);
    Ok(())
}

#[tokio::test]
async fn test_ambient_token_from_metadata_server() -> Result<()> {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/token"))
        .and(header("metadata-flavor", "Google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "metadata-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(grants_path()))
        .and(header("authorization", "Bearer metadata-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "grants": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let connector = RestConnector::builder()
        .base_url(server.uri())?
        .ambient_credentials(MetadataServerProvider::with_token_url(format!("{}/token", server.uri()))?)
        .build()?;
    let grants = GrantLifecycleManager::new(Arc::new(connector), None)
        .list_all_grants(PROJECT, ENTITLEMENT)
        .await?;
    assert!(grants.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unreachable_metadata_server_is_client_initialization_failure() -> Result<()> {
    let backend = start_backend().await;
    let metadata = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&metadata)
        .await;

    let connector = RestConnector::builder()
        .base_url(backend.uri())?
        .ambient_credentials(MetadataServerProvider::with_token_url(format!("{}/token", metadata.uri()))?)
        .build()?;
    let err = GrantLifecycleManager::new(Arc::new(connector), None)
        .with_poll_config(PollConfig::immediate())
        .revoke_grant("g1", PROJECT, ENTITLEMENT, "")
        .await
        .unwrap_err();

    assert_eq!(err.class(), ErrorClass::ClientInitializationFailed);
    assert!(backend.received_requests().await.unwrap_or_default().is_empty());
    Ok(())
}
