//! Main error type for grant operations.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use super::{ErrorClass, ErrorKind};

/// The error type for every grant lifecycle operation.
///
/// ```text
/// Error
/// ├── kind: ErrorKind            (category for matching)
/// ├── message: String            (human-readable description)
/// ├── backend_status: Option     (canonical status name from the backend)
/// ├── request_id: Option         (backend correlation ID)
/// ├── retry_after: Option        (rate limit delay hint)
/// └── source: Option             (underlying cause)
/// ```
///
/// ## Example
///
/// ```rust
/// use pam_grants::{Error, ErrorClass, ErrorKind};
///
/// fn describe(err: &Error) -> &'static str {
///     match err.class() {
///         ErrorClass::InvalidInput => "fix the request",
///         ErrorClass::ClientInitializationFailed => "backend client could not be set up",
///         ErrorClass::BackendOperationFailed if err.kind() == ErrorKind::FailedPrecondition => {
///             "grant is not in a state that allows this"
///         }
///         ErrorClass::BackendOperationFailed => "backend failed",
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    backend_status: Option<String>,
    request_id: Option<String>,
    retry_after: Option<Duration>,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Error {
    /// Creates a new error with the given kind and message.
    ///
    /// ```rust
    /// use pam_grants::{Error, ErrorKind};
    ///
    /// let err = Error::new(ErrorKind::InvalidInput, "project must not be empty");
    /// assert_eq!(err.kind(), ErrorKind::InvalidInput);
    /// ```
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            backend_status: None,
            request_id: None,
            retry_after: None,
            source: None,
        }
    }

    /// Creates an error from a kind with a default message.
    pub fn from_kind(kind: ErrorKind) -> Self {
        let message = match kind {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::MissingIdentity => "operation requires the requester's delegated identity",
            ErrorKind::Configuration => "configuration error",
            ErrorKind::ClientInitialization => "failed to create backend client",
            ErrorKind::Unauthorized => "authentication failed",
            ErrorKind::Forbidden => "permission denied",
            ErrorKind::NotFound => "resource not found",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::FailedPrecondition => "failed precondition",
            ErrorKind::Conflict => "conflict",
            ErrorKind::RateLimited => "rate limit exceeded",
            ErrorKind::Unavailable => "service unavailable",
            ErrorKind::Timeout => "request timed out",
            ErrorKind::Internal => "internal server error",
            ErrorKind::Cancelled => "operation cancelled",
            ErrorKind::Connection => "connection failed",
            ErrorKind::InvalidResponse => "invalid response",
            ErrorKind::Unknown => "unknown error",
        };
        Self::new(kind, message)
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the failure class (caller error vs dependency error).
    #[inline]
    pub fn class(&self) -> ErrorClass {
        self.kind.class()
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the canonical status name reported by the backend
    /// (e.g. `FAILED_PRECONDITION`), if any.
    pub fn backend_status(&self) -> Option<&str> {
        self.backend_status.as_deref()
    }

    /// Returns the backend request ID, if available.
    #[inline]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Returns the recommended retry delay for rate limit errors.
    #[inline]
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    /// Returns `true` if an outer layer may retry.
    #[inline]
    pub fn is_retriable(&self) -> bool {
        self.kind.is_retriable()
    }

    /// Sets the backend status name.
    #[must_use]
    pub fn with_backend_status(mut self, status: impl Into<String>) -> Self {
        self.backend_status = Some(status.into());
        self
    }

    /// Sets the request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Sets the retry-after duration.
    #[must_use]
    pub fn with_retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    /// Sets the source error.
    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    /// Creates a missing delegated identity error.
    pub fn missing_identity(operation: &str) -> Self {
        Self::new(
            ErrorKind::MissingIdentity,
            format!("{operation} requires the requester's delegated identity"),
        )
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Creates a client initialization error.
    pub fn client_initialization(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ClientInitialization, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Creates a failed precondition error.
    pub fn failed_precondition(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::FailedPrecondition, message)
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidResponse, message)
    }

    /// Creates a cancelled error.
    pub fn cancelled(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    /// Creates an error from a backend `google.rpc.Status`.
    ///
    /// The canonical status name wins over the numeric code when both are
    /// present and the name is recognized.
    pub fn from_rpc_status(code: i32, status: Option<&str>, message: &str) -> Self {
        let kind = status
            .and_then(ErrorKind::from_rpc_status)
            .unwrap_or_else(|| ErrorKind::from_rpc_code(code));
        let message = if message.is_empty() {
            Cow::Owned(format!("backend returned status code {code}"))
        } else {
            Cow::Owned(message.to_string())
        };
        let mut err = Self::new(kind, message);
        err.backend_status = status.map(str::to_string);
        err
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;

        if let Some(ref status) = self.backend_status {
            write!(f, " [{}]", status)?;
        }

        if let Some(ref request_id) = self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::from_kind(kind)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::NotConnected => ErrorKind::Connection,
            std::io::ErrorKind::TimedOut => ErrorKind::Timeout,
            _ => ErrorKind::Configuration,
        };
        Error::new(kind, err.to_string()).with_source(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::configuration(format!("invalid URL: {}", err)).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::invalid_response(format!("JSON error: {}", err)).with_source(err)
    }
}
