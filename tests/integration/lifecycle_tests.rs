//! Grant lifecycle over the REST transport.

use anyhow::Result;
use pam_grants::{DEFAULT_REVOKE_REASON, ErrorClass, ErrorKind, GrantState};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::*;

#[tokio::test]
async fn test_request_grant_sends_duration_and_justification() -> Result<()> {
    let server = start_backend().await;
    Mock::given(method("POST"))
        .and(path(grants_path()))
        .and(header("authorization", "Bearer user-token"))
        .and(body_json(json!({
            "requestedDuration": "3600s",
            "justification": { "unstructuredJustification": "need access" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_json("g123", "PENDING_APPROVAL")))
        .expect(1)
        .mount(&server)
        .await;

    let connector = connector(&server)?;
    let grant = manager(&connector, Some("user-token"))
        .request_grant(PROJECT, ENTITLEMENT, "need access", 3600)
        .await?;

    assert_eq!(grant.id(), "g123");
    assert_eq!(grant.name(), grant_resource_name("g123"));
    assert_eq!(grant.duration(), 3600);
    assert_eq!(grant.justification(), "need access");
    assert_eq!(grant.requester(), "alice@example.com");
    assert_eq!(grant.state(), &GrantState::PendingApproval);
    assert_eq!(grant.roles(), ["roles/viewer"]);
    Ok(())
}

#[tokio::test]
async fn test_approve_grant() -> Result<()> {
    let server = start_backend().await;
    Mock::given(method("POST"))
        .and(path(grant_path("g123", ":approve")))
        .and(header("authorization", "Bearer approver-token"))
        .and(body_json(json!({ "reason": "approved for incident" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_json("g123", "ACTIVE")))
        .expect(1)
        .mount(&server)
        .await;

    let connector = connector(&server)?;
    let grant = manager(&connector, Some("approver-token"))
        .approve_grant("g123", PROJECT, ENTITLEMENT, "approved for incident")
        .await?;

    assert_eq!(grant.id(), "g123");
    assert_eq!(grant.state(), &GrantState::Active);
    Ok(())
}

#[tokio::test]
async fn test_approve_non_pending_grant_is_backend_failure() -> Result<()> {
    let server = start_backend().await;
    Mock::given(method("POST"))
        .and(path(grant_path("g123", ":approve")))
        .respond_with(
            ResponseTemplate::new(400)
                .insert_header("x-request-id", "req-42")
                .set_body_json(json!({
                    "error": {
                        "code": 400,
                        "message": "grant is not in PENDING_APPROVAL state",
                        "status": "FAILED_PRECONDITION"
                    }
                })),
        )
        .mount(&server)
        .await;

    let connector = connector(&server)?;
    let err = manager(&connector, Some("approver-token"))
        .approve_grant("g123", PROJECT, ENTITLEMENT, "ok")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
    assert_eq!(err.class(), ErrorClass::BackendOperationFailed);
    assert_eq!(err.backend_status(), Some("FAILED_PRECONDITION"));
    assert_eq!(err.request_id(), Some("req-42"));
    assert!(!err.is_retriable());
    Ok(())
}

#[tokio::test]
async fn test_list_all_grants_follows_page_tokens() -> Result<()> {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path(grants_path()))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "grants": [grant_json("g3", "DENIED")]
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(grants_path()))
        .and(query_param("pageSize", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "grants": [grant_json("g1", "ACTIVE"), grant_json("g2", "ENDED")],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connector = connector(&server)?;
    let grants = manager(&connector, None)
        .with_page_size(Some(2))
        .list_all_grants(PROJECT, ENTITLEMENT)
        .await?;

    let ids: Vec<_> = grants.iter().map(|g| g.id()).collect();
    assert_eq!(ids, ["g1", "g2", "g3"]);
    assert_eq!(grants[2].state(), &GrantState::Denied);
    Ok(())
}

#[tokio::test]
async fn test_list_failure_on_later_page_fails_whole_listing() -> Result<()> {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path(grants_path()))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(503).insert_header("retry-after", "7"))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(grants_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "grants": [grant_json("g1", "ACTIVE")],
            "nextPageToken": "page-2"
        })))
        .mount(&server)
        .await;

    let connector = connector(&server)?;
    let err = manager(&connector, None).list_all_grants(PROJECT, ENTITLEMENT).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(err.retry_after(), Some(std::time::Duration::from_secs(7)));
    assert!(err.is_retriable());
    Ok(())
}

#[tokio::test]
async fn test_empty_listing() -> Result<()> {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path(grants_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let connector = connector(&server)?;
    let grants = manager(&connector, None).list_all_grants(PROJECT, ENTITLEMENT).await?;
    assert!(grants.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_revoke_polls_operation_until_done() -> Result<()> {
    let server = start_backend().await;
    let operation = "projects/proj1/locations/global/operations/op-7";

    Mock::given(method("POST"))
        .and(path(grant_path("g123", ":revoke")))
        .and(body_json(json!({ "reason": DEFAULT_REVOKE_REASON })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": operation })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/{}", operation)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": operation, "done": false })))
        .with_priority(1)
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/{}", operation)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": operation,
            "done": true,
            "response": grant_json("g123", "REVOKED")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connector = connector(&server)?;
    let grant = manager(&connector, None).revoke_grant("g123", PROJECT, ENTITLEMENT, "").await?;

    assert_eq!(grant.id(), "g123");
    assert_eq!(grant.state(), &GrantState::Revoked);
    Ok(())
}

#[tokio::test]
async fn test_revoke_with_blank_reason_sends_default_reason() -> Result<()> {
    let server = start_backend().await;
    Mock::given(method("POST"))
        .and(path(grant_path("g123", ":revoke")))
        .and(body_json(json!({ "reason": DEFAULT_REVOKE_REASON })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/proj1/locations/global/operations/op-9",
            "done": true,
            "response": grant_json("g123", "REVOKED")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connector = connector(&server)?;
    let grant = manager(&connector, Some("user-token"))
        .revoke_grant("g123", PROJECT, ENTITLEMENT, "   ")
        .await?;
    assert_eq!(grant.state(), &GrantState::Revoked);
    Ok(())
}

#[tokio::test]
async fn test_revoke_operation_error_is_classified() -> Result<()> {
    let server = start_backend().await;
    Mock::given(method("POST"))
        .and(path(grant_path("g123", ":revoke")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/proj1/locations/global/operations/op-8",
            "done": true,
            "error": { "code": 9, "message": "grant has already ended" }
        })))
        .mount(&server)
        .await;

    let connector = connector(&server)?;
    let err = manager(&connector, Some("user-token"))
        .revoke_grant("g123", PROJECT, ENTITLEMENT, "cleanup")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
    assert_eq!(err.class(), ErrorClass::BackendOperationFailed);
    assert_eq!(err.message(), "grant has already ended");
    Ok(())
}

#[tokio::test]
async fn test_malformed_response_is_invalid_response() -> Result<()> {
    let server = start_backend().await;
    Mock::given(method("POST"))
        .and(path(grants_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let connector = connector(&server)?;
    let err = manager(&connector, Some("user-token"))
        .request_grant(PROJECT, ENTITLEMENT, "why", 60)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    Ok(())
}
