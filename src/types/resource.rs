//! Backend wire types (Privileged Access Manager v1, JSON).
//!
//! These mirror the REST representation closely and are what transports
//! exchange. Callers normally see [`Grant`](super::Grant) instead.

use serde::{Deserialize, Serialize};

/// A grant as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantResource {
    /// Full resource name, `projects/.../grants/{id}`.
    #[serde(default)]
    pub name: String,

    /// Identity that requested the grant.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub requester: String,

    /// Requested duration in protobuf JSON form, e.g. `"3600s"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_duration: Option<String>,

    /// Reason supplied with the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<Justification>,

    /// Lifecycle state name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// What the grant gives access to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileged_access: Option<PrivilegedAccess>,

    /// RFC 3339 creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,

    /// RFC 3339 last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

/// Justification attached to a grant request.
///
/// Only the unstructured form is modelled; structured variants deserialize
/// with `unstructured_justification` unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Justification {
    /// Free-text reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unstructured_justification: Option<String>,
}

impl Justification {
    /// Creates a free-text justification.
    pub fn unstructured(text: impl Into<String>) -> Self {
        Self { unstructured_justification: Some(text.into()) }
    }
}

/// Access mechanism of a grant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivilegedAccess {
    /// IAM role bindings, when the grant is IAM based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp_iam_access: Option<GcpIamAccess>,
}

/// IAM-based access on a single resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcpIamAccess {
    /// Resource type, e.g. `cloudresourcemanager.googleapis.com/Project`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_type: String,

    /// Full resource name the roles apply to.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource: String,

    /// Roles granted, in backend order.
    #[serde(default)]
    pub role_bindings: Vec<RoleBinding>,
}

/// A single IAM role binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBinding {
    /// Role name, e.g. `roles/viewer`.
    pub role: String,

    /// Optional IAM condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
}

impl RoleBinding {
    /// Creates an unconditional binding.
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into(), condition_expression: None }
    }
}

/// A long-running operation handle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation resource name, used to poll it.
    #[serde(default)]
    pub name: String,

    /// `true` once `error` or `response` is set.
    #[serde(default)]
    pub done: bool,

    /// Failure result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,

    /// Success result; for revocations this is the revoked grant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<GrantResource>,
}

/// A `google.rpc.Status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Numeric `google.rpc.Code`, or the HTTP status in error bodies.
    #[serde(default)]
    pub code: i32,

    /// Developer-facing message.
    #[serde(default)]
    pub message: String,

    /// Canonical status name such as `FAILED_PRECONDITION`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Formats whole seconds the way the backend expects durations.
pub fn format_duration_secs(seconds: i64) -> String {
    format!("{seconds}s")
}

/// Parses a protobuf JSON duration (`"3600s"`, `"1.5s"`) into whole seconds.
///
/// Fractions are truncated. Returns `None` for anything else.
pub fn parse_duration_secs(value: &str) -> Option<i64> {
    let number = value.trim().strip_suffix('s')?;
    let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match whole {
        "" | "-" if !frac.is_empty() => Some(0),
        _ => whole.parse().ok(),
    }
}
