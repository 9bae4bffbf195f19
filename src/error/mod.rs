//! Error types for grant lifecycle operations.
//!
//! Every failure carries an [`ErrorKind`] for matching, and every kind
//! belongs to exactly one [`ErrorClass`]:
//!
//! - [`ErrorClass::InvalidInput`]: the caller's input was rejected locally
//!   and the backend was never contacted.
//! - [`ErrorClass::ClientInitializationFailed`]: the backend client could
//!   not be set up (credentials, TLS, configuration).
//! - [`ErrorClass::BackendOperationFailed`]: an RPC or long-running
//!   operation failed, including rejected state transitions.
//!
//! The end of a grant listing is not an error; the listing simply ends.
//!
//! ```rust
//! use pam_grants::{Error, ErrorClass};
//!
//! fn status_for(err: &Error) -> u16 {
//!     match err.class() {
//!         ErrorClass::InvalidInput => 400,
//!         _ => err.kind().http_status_code(),
//!     }
//! }
//! ```

mod core;
mod kind;

pub use self::core::Error;
pub use kind::{ErrorClass, ErrorKind};

/// A specialized `Result` type for grant operations.
pub type Result<T> = std::result::Result<T, Error>;
