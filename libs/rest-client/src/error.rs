use http::StatusCode;
use thiserror::Error;

/// Classified failure of a call through [`crate::ApiClient`].
///
/// The client never navigates anywhere itself; callers inspect [`ApiError::kind`]
/// or [`ApiError::redirect`] and decide what to show.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server could not be reached, the connection broke, or the request timed out.
    #[error("Network error: {message}")]
    Network { message: String, timed_out: bool },

    /// HTTP 401. The stored session has already been cleared.
    #[error("Authentication required: {message}")]
    Unauthorized { message: String },

    /// HTTP 403.
    #[error("Access forbidden: {message}")]
    Forbidden { message: String },

    /// Any other non-2xx response.
    #[error("Server responded with {status}: {message}")]
    Server {
        status: u16,
        message: String,
        body: Option<String>,
    },

    /// The request could not be built (bad URL, header or body).
    #[error("Request setup failed: {message}")]
    RequestSetup { message: String },

    /// A 2xx response whose body does not have the expected shape.
    #[error("Invalid response body: {message}")]
    InvalidResponse { message: String },

    /// Persisted session data exists but cannot be decoded.
    #[error("Stored session is corrupted: {message}")]
    CorruptedSession { message: String },

    /// Session storage could not be read or written.
    #[error("Session storage failure: {message}")]
    Storage { message: String },
}

/// Coarse error category for UI collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Auth,
    Forbidden,
    Server,
    RequestSetup,
    InvalidResponse,
    CorruptedSession,
    Storage,
}

/// Where a UI collaborator is expected to navigate after an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Redirect {
    Login,
    Unauthorized,
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            timed_out: true,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>, body: Option<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
            body,
        }
    }

    pub fn request_setup(message: impl Into<String>) -> Self {
        Self::RequestSetup {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn corrupted_session(message: impl Into<String>) -> Self {
        Self::CorruptedSession {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Unauthorized { .. } => ErrorKind::Auth,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Server { .. } => ErrorKind::Server,
            Self::RequestSetup { .. } => ErrorKind::RequestSetup,
            Self::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            Self::CorruptedSession { .. } => ErrorKind::CorruptedSession,
            Self::Storage { .. } => ErrorKind::Storage,
        }
    }

    pub fn redirect(&self) -> Option<Redirect> {
        match self {
            Self::Unauthorized { .. } => Some(Redirect::Login),
            Self::Forbidden { .. } => Some(Redirect::Unauthorized),
            _ => None,
        }
    }

    /// HTTP status carried by the error, if the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        let code = match self {
            Self::Unauthorized { .. } => 401,
            Self::Forbidden { .. } => 403,
            Self::Server { status, .. } => *status,
            _ => return None,
        };
        StatusCode::from_u16(code).ok()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Server { status: 404, .. })
    }

    /// Only transport failures are worth repeating.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { timed_out: true, .. })
    }

    /// Classify a transport-level failure reported by reqwest.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(err.to_string())
        } else if err.is_builder() {
            Self::request_setup(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}
