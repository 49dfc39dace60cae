use crate::error::ApiError;

/// Source of the bearer token attached to outgoing requests.
///
/// The client consults it before every request and calls
/// [`CredentialSource::invalidate`] when the server answers 401.
pub trait CredentialSource: Send + Sync {
    fn bearer_token(&self) -> Result<Option<String>, ApiError>;

    fn invalidate(&self) -> Result<(), ApiError>;
}

/// Credential source for unauthenticated clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn bearer_token(&self) -> Result<Option<String>, ApiError> {
        Ok(None)
    }

    fn invalidate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}
