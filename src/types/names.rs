//! Backend resource names for entitlements and grants.
//!
//! Grants live under
//! `projects/{project}/locations/global/entitlements/{entitlement}/grants/{id}`.
//! Segments are interpolated verbatim; callers validate them first.

/// Location segment used for every entitlement.
pub const GLOBAL_LOCATION: &str = "global";

/// Returns the entitlement resource name, the parent of its grants.
///
/// ```rust
/// use pam_grants::types::entitlement_name;
///
/// assert_eq!(
///     entitlement_name("proj1", "ent1"),
///     "projects/proj1/locations/global/entitlements/ent1"
/// );
/// ```
pub fn entitlement_name(project: &str, entitlement: &str) -> String {
    format!("projects/{project}/locations/{GLOBAL_LOCATION}/entitlements/{entitlement}")
}

/// Returns the full resource name of a grant.
pub fn grant_name(project: &str, entitlement: &str, grant_id: &str) -> String {
    format!("{}/grants/{grant_id}", entitlement_name(project, entitlement))
}

/// Returns the last `/`-separated segment of a resource name.
///
/// A name without `/` is its own ID and an empty name yields an empty ID.
pub fn grant_id_from_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or_default()
}
