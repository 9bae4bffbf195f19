//! Delegated credentials and the identity a backend client runs as.

use std::fmt;
use std::sync::Arc;

use zeroize::Zeroizing;

/// Token type attached to every delegated credential.
pub const BEARER_TOKEN_TYPE: &str = "Bearer";

/// A request-scoped credential that makes backend calls run as the
/// requesting user.
///
/// Produced by [`IdentityBroker`](super::IdentityBroker). The token is held
/// in zeroizing storage, never validated locally and never logged: the
/// `Debug` output is redacted.
///
/// An empty token is a valid value. It fails at the first backend call with
/// [`ErrorKind::Unauthorized`](crate::ErrorKind::Unauthorized).
#[derive(Clone)]
pub struct DelegatedCredential {
    token: Arc<Zeroizing<String>>,
}

impl DelegatedCredential {
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self { token: Arc::new(Zeroizing::new(token.into())) }
    }

    /// Returns the raw access token.
    pub fn access_token(&self) -> &str {
        self.token.as_str()
    }

    /// Returns the token type, always `"Bearer"`.
    pub fn token_type(&self) -> &'static str {
        BEARER_TOKEN_TYPE
    }

    /// Returns `true` if the wrapped token is empty.
    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }

    /// Returns the `Authorization` header value for this credential.
    pub(crate) fn authorization_value(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("{} {}", BEARER_TOKEN_TYPE, self.access_token()))
    }
}

impl fmt::Debug for DelegatedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegatedCredential")
            .field("token_type", &BEARER_TOKEN_TYPE)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// The identity a backend client is scoped to.
///
/// This is the key a [`BackendConnector`](crate::client::BackendConnector)
/// builds clients for.
#[derive(Debug, Clone, Default)]
pub enum Identity {
    /// The service's own credential.
    #[default]
    Ambient,

    /// The requesting user's credential.
    Delegated(DelegatedCredential),
}

impl Identity {
    /// Returns `true` for a delegated identity.
    pub fn is_delegated(&self) -> bool {
        matches!(self, Identity::Delegated(_))
    }

    /// Returns the delegated credential, if any.
    pub fn as_delegated(&self) -> Option<&DelegatedCredential> {
        match self {
            Identity::Delegated(credential) => Some(credential),
            Identity::Ambient => None,
        }
    }

    /// Short label used in log fields. Never contains the token.
    pub fn mode(&self) -> &'static str {
        match self {
            Identity::Ambient => "ambient",
            Identity::Delegated(_) => "delegated",
        }
    }
}

impl From<DelegatedCredential> for Identity {
    fn from(credential: DelegatedCredential) -> Self {
        Identity::Delegated(credential)
    }
}

impl From<Option<DelegatedCredential>> for Identity {
    fn from(credential: Option<DelegatedCredential>) -> Self {
        credential.map_or(Identity::Ambient, Identity::Delegated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delegated_credential_debug_is_redacted() {
        let credential = DelegatedCredential::new("ya29.secret_token");
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("ya29.secret_token"));
        assert!(debug.contains("REDACTED"));
        assert!(debug.contains("Bearer"));
    }

    #[test]
    fn test_delegated_credential_clone_shares_token() {
        let credential = DelegatedCredential::new("token");
        let cloned = credential.clone();
        assert_eq!(cloned.access_token(), "token");
        assert_eq!(cloned.token_type(), "Bearer");
    }

    #[test]
    fn test_authorization_value() {
        let credential = DelegatedCredential::new("abc");
        assert_eq!(credential.authorization_value().as_str(), "Bearer abc");
    }

    #[test]
    fn test_identity_from_option() {
        assert!(!Identity::from(None).is_delegated());
        let identity = Identity::from(Some(DelegatedCredential::new("t")));
        assert!(identity.is_delegated());
        assert_eq!(identity.mode(), "delegated");
        assert_eq!(identity.as_delegated().map(|c| c.access_token()), Some("t"));
    }

    #[test]
    fn test_identity_debug_hides_token() {
        let identity = Identity::Delegated(DelegatedCredential::new("hidden"));
        assert!(!format!("{:?}", identity).contains("hidden"));
        assert_eq!(Identity::default().mode(), "ambient");
    }
}
