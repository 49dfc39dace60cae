//! Typed REST client plumbing: one configured request pipeline with bearer
//! token injection, trace propagation and a classified error taxonomy.

pub mod client;
pub mod credentials;
pub mod error;
pub mod retry;
pub mod trace;

pub use client::{ApiClient, ApiClientBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use credentials::{CredentialSource, NoCredentials};
pub use error::{ApiError, ErrorKind, Redirect};
pub use retry::RetryPolicy;

// Re-exported so callers can name methods without depending on `http` directly.
pub use http::Method;
