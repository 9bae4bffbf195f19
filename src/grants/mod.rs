//! Grant lifecycle operations.
//!
//! [`GrantLifecycleManager`] lists, requests, approves and revokes grants on
//! one entitlement, running each call as the identity it was built with.

mod list;
mod manager;
mod operation;
mod validate;

pub use list::GrantStream;
pub use manager::{DEFAULT_REVOKE_REASON, GrantLifecycleManager};
pub use operation::RevokeOperation;
