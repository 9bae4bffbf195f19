//! Configuration types.
//!
//! - [`ServiceConfig`]: backend endpoint, timeouts, paging, ambient token
//! - [`PollConfig`]: backoff while waiting on long-running operations
//! - [`TlsConfig`]: TLS/SSL settings

mod poll;
mod service;
mod tls;

pub use poll::PollConfig;
pub use service::{DEFAULT_ENDPOINT, MAX_PAGE_SIZE, ServiceConfig, env};
pub use tls::TlsConfig;
