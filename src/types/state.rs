//! Grant lifecycle state.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lifecycle state of a grant, as reported by the backend.
///
/// The usual path is `PENDING_APPROVAL → APPROVED → ACTIVATING → ACTIVE →
/// ENDED`, with `DENIED` and `REVOKED` as alternate terminal states. The set
/// is open: any other backend value is kept verbatim in
/// [`GrantState::Other`], so parsing and printing a state never loses
/// information.
///
/// ```rust
/// use pam_grants::GrantState;
///
/// let state = GrantState::parse("REVOKED");
/// assert_eq!(state, GrantState::Revoked);
/// assert!(state.is_terminal());
///
/// let unknown = GrantState::parse("SCHEDULED");
/// assert_eq!(unknown.as_str(), "SCHEDULED");
/// assert!(!unknown.is_terminal());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GrantState {
    /// Waiting for an approver.
    PendingApproval,
    /// Approved, not yet activating.
    Approved,
    /// Access is being provisioned.
    Activating,
    /// Access is in effect.
    Active,
    /// The requested duration elapsed.
    Ended,
    /// An approver denied the request.
    Denied,
    /// Access was revoked before it ended.
    Revoked,
    /// The request expired without a decision.
    Expired,
    /// The requester withdrew the request.
    Withdrawn,
    /// Any other backend state, kept verbatim.
    Other(String),
}

impl GrantState {
    /// Parses a backend state string. Never fails.
    pub fn parse(s: &str) -> Self {
        match s {
            "PENDING_APPROVAL" => GrantState::PendingApproval,
            "APPROVED" => GrantState::Approved,
            "ACTIVATING" => GrantState::Activating,
            "ACTIVE" => GrantState::Active,
            "ENDED" => GrantState::Ended,
            "DENIED" => GrantState::Denied,
            "REVOKED" => GrantState::Revoked,
            "EXPIRED" => GrantState::Expired,
            "WITHDRAWN" => GrantState::Withdrawn,
            other => GrantState::Other(other.to_string()),
        }
    }

    /// Returns the backend spelling of this state.
    pub fn as_str(&self) -> &str {
        match self {
            GrantState::PendingApproval => "PENDING_APPROVAL",
            GrantState::Approved => "APPROVED",
            GrantState::Activating => "ACTIVATING",
            GrantState::Active => "ACTIVE",
            GrantState::Ended => "ENDED",
            GrantState::Denied => "DENIED",
            GrantState::Revoked => "REVOKED",
            GrantState::Expired => "EXPIRED",
            GrantState::Withdrawn => "WITHDRAWN",
            GrantState::Other(s) => s,
        }
    }

    /// Returns `true` if no further transition is possible.
    ///
    /// Unknown states are never terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GrantState::Ended
                | GrantState::Denied
                | GrantState::Revoked
                | GrantState::Expired
                | GrantState::Withdrawn
        )
    }

    /// Returns `true` while the grant waits for an approver.
    pub fn is_pending(&self) -> bool {
        matches!(self, GrantState::PendingApproval)
    }
}

impl Default for GrantState {
    fn default() -> Self {
        GrantState::Other(String::new())
    }
}

impl fmt::Display for GrantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantState {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for GrantState {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for GrantState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GrantState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}
