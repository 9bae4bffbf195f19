//! Transport layer for the privileged-access backend.
//!
//! A [`GrantTransport`] is a backend client bound to exactly one
//! [`Identity`](crate::Identity). Transports are created per request by a
//! [`BackendConnector`](crate::client::BackendConnector) and dropped with it.
//!
//! - REST transport (via reqwest), behind the `rest` feature
//! - Mock transport, an in-memory backend for tests

mod traits;

#[cfg(feature = "rest")]
pub(crate) mod rest;

pub(crate) mod mock;

pub use traits::{
    CreateGrantRequest, GrantTransitionRequest, GrantTransport, ListGrantsRequest,
    ListGrantsResponse, Transport,
};

#[cfg(feature = "rest")]
pub use rest::RestTransport;
