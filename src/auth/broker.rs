//! Turns inbound bearer credentials into delegated credentials.

use super::DelegatedCredential;

/// Wraps a caller's bearer token so outbound calls run as that caller.
///
/// The broker performs no network validation and holds no state: every
/// call is a pure transformation, and tokens are never fetched, cached or
/// refreshed. Whether the token is usable is decided by the backend at the
/// first call.
///
/// ```rust
/// use pam_grants::IdentityBroker;
///
/// let credential = IdentityBroker::from_authorization_header("Bearer ya29.a0Af");
/// assert_eq!(credential.access_token(), "ya29.a0Af");
/// assert_eq!(credential.token_type(), "Bearer");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityBroker;

impl IdentityBroker {
    /// Wraps a raw bearer token. An empty token yields a credential that
    /// the backend will reject.
    pub fn wrap_bearer_token(raw: impl Into<String>) -> DelegatedCredential {
        DelegatedCredential::new(raw)
    }

    /// Wraps the token from an `Authorization` header value.
    ///
    /// A leading `Bearer` scheme is stripped case-insensitively along with
    /// surrounding whitespace. A value without the scheme is wrapped as-is.
    pub fn from_authorization_header(value: &str) -> DelegatedCredential {
        let value = value.trim();
        let token = match value.split_once(char::is_whitespace) {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
            _ if value.eq_ignore_ascii_case("bearer") => "",
            _ => value,
        };
        Self::wrap_bearer_token(token)
    }
}
