//! Identities and credentials for backend calls.
//!
//! - [`IdentityBroker`]: wraps an inbound bearer token into a
//!   [`DelegatedCredential`]
//! - [`Identity`]: ambient (service) or delegated (requesting user)
//! - [`CredentialsProvider`]: source of the ambient token
//!
//! ```rust
//! use pam_grants::{Identity, IdentityBroker};
//!
//! let credential = IdentityBroker::from_authorization_header("Bearer user-token");
//! let identity = Identity::from(credential);
//! assert_eq!(identity.mode(), "delegated");
//! ```

mod broker;
mod credentials;
mod provider;

pub use broker::IdentityBroker;
pub use credentials::{BEARER_TOKEN_TYPE, DelegatedCredential, Identity};
#[cfg(feature = "rest")]
pub use provider::MetadataServerProvider;
pub use provider::{CredentialsFuture, CredentialsProvider, StaticTokenProvider};
