//! Grant data model.
//!
//! - [`Grant`]: canonical grant returned by every operation
//! - [`GrantState`]: open set of lifecycle states
//! - [`GrantResource`], [`Operation`]: backend wire types
//! - resource name helpers such as [`grant_name`]

mod grant;
mod names;
mod resource;
mod state;

pub use grant::Grant;
pub use names::{GLOBAL_LOCATION, entitlement_name, grant_id_from_name, grant_name};
pub use resource::{
    GcpIamAccess, GrantResource, Justification, Operation, PrivilegedAccess, RoleBinding, Status,
    format_duration_secs, parse_duration_secs,
};
pub use state::GrantState;
