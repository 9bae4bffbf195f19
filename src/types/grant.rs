//! The canonical grant entity.

use serde::Serialize;

use super::names::grant_id_from_name;
use super::resource::{GrantResource, parse_duration_secs};
use super::GrantState;

/// A privileged-access grant, independent of the backend's wire format.
///
/// Built from a backend response and never mutated afterwards; a state
/// transition yields a new `Grant`. Serializes with the keys `id`, `name`,
/// `requester`, `duration`, `justification`, `state` and `roles`.
///
/// There is no `Deserialize`: the only way to build a `Grant` is from a
/// [`GrantResource`], so [`id`](Grant::id) always matches the last segment
/// of [`name`](Grant::name).
///
/// ```rust
/// use pam_grants::Grant;
/// use pam_grants::types::GrantResource;
///
/// let grant = Grant::from(GrantResource {
///     name: "projects/p/locations/global/entitlements/e/grants/g123".into(),
///     state: Some("PENDING_APPROVAL".into()),
///     requested_duration: Some("3600s".into()),
///     ..Default::default()
/// });
/// assert_eq!(grant.id(), "g123");
/// assert_eq!(grant.duration(), 3600);
/// assert!(grant.roles().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Grant {
    id: String,
    name: String,
    requester: String,
    duration: i64,
    justification: String,
    state: GrantState,
    roles: Vec<String>,
}

impl Grant {
    /// Last segment of [`name`](Grant::name).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Full backend resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity that requested the grant.
    pub fn requester(&self) -> &str {
        &self.requester
    }

    /// Requested access duration in whole seconds.
    pub fn duration(&self) -> i64 {
        self.duration
    }

    /// Free-text justification; empty for structured justifications.
    pub fn justification(&self) -> &str {
        &self.justification
    }

    /// Lifecycle state.
    pub fn state(&self) -> &GrantState {
        &self.state
    }

    /// IAM roles granted, in backend order. Empty for non-IAM grants.
    pub fn roles(&self) -> &[String] {
        &self.roles
    }
}

impl From<GrantResource> for Grant {
    fn from(resource: GrantResource) -> Self {
        let duration = match resource.requested_duration.as_deref() {
            None => 0,
            Some(raw) => parse_duration_secs(raw).unwrap_or_else(|| {
                tracing::warn!(grant = %resource.name, duration = raw, "unparsable grant duration");
                0
            }),
        };

        let roles = resource
            .privileged_access
            .and_then(|access| access.gcp_iam_access)
            .map(|iam| iam.role_bindings.into_iter().map(|binding| binding.role).collect())
            .unwrap_or_default();

        Self {
            id: grant_id_from_name(&resource.name).to_string(),
            duration,
            justification: resource
                .justification
                .and_then(|j| j.unstructured_justification)
                .unwrap_or_default(),
            state: resource.state.as_deref().map(GrantState::parse).unwrap_or_default(),
            requester: resource.requester,
            roles,
            name: resource.name,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{GcpIamAccess, Justification, PrivilegedAccess, RoleBinding};

    fn iam_resource(roles: &[&str]) -> GrantResource {
        GrantResource {
            name: "projects/proj1/locations/global/entitlements/ent1/grants/g123".into(),
            requester: "alice@example.com".into(),
            requested_duration: Some("3600s".into()),
            justification: Some(Justification::unstructured("need access")),
            state: Some("PENDING_APPROVAL".into()),
            privileged_access: Some(PrivilegedAccess {
                gcp_iam_access: Some(GcpIamAccess {
                    role_bindings: roles.iter().map(|r| RoleBinding::new(*r)).collect(),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_maps_every_field() {
        let grant = Grant::from(iam_resource(&["roles/viewer"]));
        assert_eq!(grant.id(), "g123");
        assert_eq!(grant.name(), "projects/proj1/locations/global/entitlements/ent1/grants/g123");
        assert_eq!(grant.requester(), "alice@example.com");
        assert_eq!(grant.duration(), 3600);
        assert_eq!(grant.justification(), "need access");
        assert_eq!(grant.state(), &GrantState::PendingApproval);
    }

    #[test]
    fn test_roles_keep_backend_order() {
        let grant = Grant::from(iam_resource(&["roles/viewer", "roles/editor"]));
        assert_eq!(grant.roles(), ["roles/viewer", "roles/editor"]);
    }

    #[test]
    fn test_non_iam_grant_has_no_roles() {
        let mut resource = iam_resource(&[]);
        resource.privileged_access = None;
        assert!(Grant::from(resource.clone()).roles().is_empty());

        resource.privileged_access = Some(PrivilegedAccess { gcp_iam_access: None });
        assert!(Grant::from(resource).roles().is_empty());
    }

    #[test]
    fn test_structured_justification_becomes_empty() {
        let mut resource = iam_resource(&[]);
        resource.justification = Some(Justification::default());
        assert_eq!(Grant::from(resource).justification(), "");
    }

    #[test]
    fn test_empty_resource() {
        let grant = Grant::from(GrantResource::default());
        assert_eq!(grant.id(), "");
        assert_eq!(grant.duration(), 0);
        assert_eq!(grant.state().as_str(), "");
        assert!(grant.roles().is_empty());
    }

    #[test]
    fn test_unparsable_duration_maps_to_zero() {
        let mut resource = iam_resource(&[]);
        resource.requested_duration = Some("one hour".into());
        assert_eq!(Grant::from(resource).duration(), 0);
    }

    #[test]
    fn test_serialized_keys() {
        let grant = Grant::from(iam_resource(&["roles/viewer"]));
        let json = serde_json::to_value(&grant).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "g123",
                "name": "projects/proj1/locations/global/entitlements/ent1/grants/g123",
                "requester": "alice@example.com",
                "duration": 3600,
                "justification": "need access",
                "state": "PENDING_APPROVAL",
                "roles": ["roles/viewer"]
            })
        );
    }

    proptest::proptest! {
        #[test]
        fn prop_id_is_last_name_segment(name in "[a-z0-9/]{0,40}") {
            let grant = Grant::from(GrantResource { name: name.clone(), ..Default::default() });
            let expected = name.rsplit('/').next().unwrap_or_default();
            proptest::prop_assert_eq!(grant.id(), expected);
            proptest::prop_assert_eq!(grant.name(), name.as_str());
        }
    }
}
