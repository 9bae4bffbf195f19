//! Error kind enumeration for categorizing grant errors.

/// The three failure classes a caller has to tell apart.
///
/// The HTTP layer can pick a status class from this alone, without
/// inspecting error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The caller's input was invalid; the backend was not contacted.
    InvalidInput,
    /// Credential, network or configuration setup for the backend client failed.
    ClientInitializationFailed,
    /// The backend RPC or long-running operation failed.
    BackendOperationFailed,
}

impl ErrorClass {
    /// Returns `true` if the caller is at fault.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, ErrorClass::InvalidInput)
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorClass::InvalidInput => write!(f, "invalid input"),
            ErrorClass::ClientInitializationFailed => write!(f, "client initialization failed"),
            ErrorClass::BackendOperationFailed => write!(f, "backend operation failed"),
        }
    }
}

/// Categorization of grant errors.
///
/// | ErrorKind              | Class                        | HTTP |
/// |------------------------|------------------------------|------|
/// | `InvalidInput`         | InvalidInput                 | 400  |
/// | `MissingIdentity`      | InvalidInput                 | 401  |
/// | `Configuration`        | ClientInitializationFailed   | 500  |
/// | `ClientInitialization` | ClientInitializationFailed   | 502  |
/// | `Unauthorized`         | BackendOperationFailed       | 401  |
/// | `Forbidden`            | BackendOperationFailed       | 403  |
/// | `NotFound`             | BackendOperationFailed       | 404  |
/// | `InvalidArgument`      | BackendOperationFailed       | 400  |
/// | `FailedPrecondition`   | BackendOperationFailed       | 409  |
/// | `Conflict`             | BackendOperationFailed       | 409  |
/// | `RateLimited`          | BackendOperationFailed       | 429  |
/// | `Unavailable`          | BackendOperationFailed       | 503  |
/// | `Timeout`              | BackendOperationFailed       | 504  |
/// | `Cancelled`            | BackendOperationFailed       | 499  |
/// | others                 | BackendOperationFailed       | 502  |
///
/// Nothing in this crate retries; [`is_retriable`](ErrorKind::is_retriable)
/// is a hint for outer layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A required identifier was empty or malformed, or the duration was
    /// not positive.
    #[error("invalid input")]
    InvalidInput,

    /// The operation needs the requester's delegated identity and none was
    /// supplied.
    #[error("missing delegated identity")]
    MissingIdentity,

    /// Invalid local configuration (endpoint URL, TLS material, environment).
    #[error("configuration error")]
    Configuration,

    /// The backend client could not be constructed (credential fetch,
    /// header construction, HTTP client setup).
    #[error("client initialization failed")]
    ClientInitialization,

    /// The backend rejected the credential.
    ///
    /// HTTP: 401, RPC: UNAUTHENTICATED
    #[error("unauthorized")]
    Unauthorized,

    /// The credential lacks permission for the operation.
    ///
    /// HTTP: 403, RPC: PERMISSION_DENIED
    #[error("forbidden")]
    Forbidden,

    /// The entitlement, grant or operation does not exist.
    ///
    /// HTTP: 404, RPC: NOT_FOUND
    #[error("not found")]
    NotFound,

    /// The backend rejected a request argument.
    ///
    /// HTTP: 400, RPC: INVALID_ARGUMENT / OUT_OF_RANGE
    #[error("invalid argument")]
    InvalidArgument,

    /// The grant is not in a state that allows the transition (e.g.
    /// approving an already approved grant).
    ///
    /// RPC: FAILED_PRECONDITION
    #[error("failed precondition")]
    FailedPrecondition,

    /// Concurrent modification or duplicate resource.
    ///
    /// HTTP: 409, RPC: ALREADY_EXISTS / ABORTED
    #[error("conflict")]
    Conflict,

    /// Quota or rate limit exceeded.
    ///
    /// HTTP: 429, RPC: RESOURCE_EXHAUSTED
    #[error("rate limited")]
    RateLimited,

    /// Backend temporarily unavailable.
    ///
    /// HTTP: 503, RPC: UNAVAILABLE
    #[error("service unavailable")]
    Unavailable,

    /// Request or operation deadline exceeded.
    ///
    /// HTTP: 504, RPC: DEADLINE_EXCEEDED
    #[error("timeout")]
    Timeout,

    /// Backend internal error.
    ///
    /// HTTP: 500, RPC: INTERNAL / DATA_LOSS / UNIMPLEMENTED
    #[error("internal error")]
    Internal,

    /// The wait was cancelled by the caller, or the backend cancelled the
    /// operation.
    ///
    /// RPC: CANCELLED
    #[error("cancelled")]
    Cancelled,

    /// DNS, TLS handshake or network failure while talking to the backend.
    #[error("connection error")]
    Connection,

    /// The backend response could not be parsed.
    #[error("invalid response")]
    InvalidResponse,

    /// Unrecognized error code.
    #[error("unknown error")]
    Unknown,
}

impl ErrorKind {
    /// Returns the failure class of this kind.
    #[inline]
    pub fn class(&self) -> ErrorClass {
        match self {
            ErrorKind::InvalidInput | ErrorKind::MissingIdentity => ErrorClass::InvalidInput,
            ErrorKind::Configuration | ErrorKind::ClientInitialization => {
                ErrorClass::ClientInitializationFailed
            },
            _ => ErrorClass::BackendOperationFailed,
        }
    }

    /// Returns `true` if an outer layer may reasonably retry.
    #[inline]
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Unavailable
                | ErrorKind::Timeout
                | ErrorKind::RateLimited
                | ErrorKind::Connection
        )
    }

    /// Returns the HTTP status code the outward HTTP layer should use.
    #[inline]
    pub fn http_status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidInput | ErrorKind::InvalidArgument => 400,
            ErrorKind::MissingIdentity | ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::FailedPrecondition | ErrorKind::Conflict => 409,
            ErrorKind::RateLimited => 429,
            ErrorKind::Cancelled => 499, // Client Closed Request
            ErrorKind::Configuration => 500,
            ErrorKind::Unavailable => 503,
            ErrorKind::Timeout => 504,
            ErrorKind::ClientInitialization
            | ErrorKind::Internal
            | ErrorKind::Connection
            | ErrorKind::InvalidResponse
            | ErrorKind::Unknown => 502,
        }
    }

    /// Creates an `ErrorKind` from a backend HTTP status code.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::InvalidArgument,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            412 => ErrorKind::FailedPrecondition,
            429 => ErrorKind::RateLimited,
            499 => ErrorKind::Cancelled,
            500 => ErrorKind::Internal,
            503 => ErrorKind::Unavailable,
            504 => ErrorKind::Timeout,
            _ if (400..500).contains(&status) => ErrorKind::InvalidArgument,
            _ if status >= 500 => ErrorKind::Unavailable,
            _ => ErrorKind::Unknown,
        }
    }

    /// Creates an `ErrorKind` from a numeric `google.rpc.Code`.
    ///
    /// Long-running operations report failures this way.
    pub fn from_rpc_code(code: i32) -> Self {
        match code {
            1 => ErrorKind::Cancelled,
            3 | 11 => ErrorKind::InvalidArgument,
            4 => ErrorKind::Timeout,
            5 => ErrorKind::NotFound,
            6 | 10 => ErrorKind::Conflict,
            7 => ErrorKind::Forbidden,
            8 => ErrorKind::RateLimited,
            9 => ErrorKind::FailedPrecondition,
            12 | 13 | 15 => ErrorKind::Internal,
            14 => ErrorKind::Unavailable,
            16 => ErrorKind::Unauthorized,
            _ => ErrorKind::Unknown,
        }
    }

    /// Creates an `ErrorKind` from a canonical status name such as
    /// `FAILED_PRECONDITION`.
    ///
    /// Returns `None` for names this crate does not recognize.
    pub fn from_rpc_status(status: &str) -> Option<Self> {
        let kind = match status {
            "CANCELLED" => ErrorKind::Cancelled,
            "INVALID_ARGUMENT" | "OUT_OF_RANGE" => ErrorKind::InvalidArgument,
            "DEADLINE_EXCEEDED" => ErrorKind::Timeout,
            "NOT_FOUND" => ErrorKind::NotFound,
            "ALREADY_EXISTS" | "ABORTED" => ErrorKind::Conflict,
            "PERMISSION_DENIED" => ErrorKind::Forbidden,
            "RESOURCE_EXHAUSTED" => ErrorKind::RateLimited,
            "FAILED_PRECONDITION" => ErrorKind::FailedPrecondition,
            "UNIMPLEMENTED" | "INTERNAL" | "DATA_LOSS" => ErrorKind::Internal,
            "UNAVAILABLE" => ErrorKind::Unavailable,
            "UNAUTHENTICATED" => ErrorKind::Unauthorized,
            "UNKNOWN" => ErrorKind::Unknown,
            _ => return None,
        };
        Some(kind)
    }
}
