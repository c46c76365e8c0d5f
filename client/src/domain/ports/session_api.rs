//! Driven port for the remote session backend.
//!
//! The session container calls this port to resolve the current identity,
//! authenticate, change the password and load the user's stored analyses. Adapters own transport
//! details; the container only sees domain records and typed failures.

use async_trait::async_trait;

use crate::domain::{LoginCredentials, PasswordChange, SessionUser, SignupRequest, StoredAnalysis};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session backend adapters.
    pub enum SessionApiError {
        /// Credentials were rejected or the session is missing.
        Unauthorized { message: String } => "session backend rejected credentials: {message}",
        /// The backend refused the submitted data (validation, conflict).
        Rejected { message: String } => "session backend rejected request: {message}",
        /// The request could not be delivered.
        Transport { message: String } => "session backend transport failed: {message}",
        /// The request timed out.
        Timeout { message: String } => "session backend request timed out: {message}",
        /// The response body could not be decoded.
        Decode { message: String } => "session backend response invalid: {message}",
        /// Any other unsuccessful HTTP status.
        Status { status: u16, message: String } => "session backend returned status {status}: {message}",
    }
}

/// Port for the backend's authentication and analysis endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Return the identity bound to the current backend session.
    ///
    /// Implementations must not fail: any error resolves to `None`.
    async fn current_user(&self) -> Option<SessionUser>;

    /// Fetch every stored analysis belonging to the current user.
    async fn user_analyses(&self) -> Result<Vec<StoredAnalysis>, SessionApiError>;

    /// Authenticate with email and password, establishing a backend session.
    async fn login(&self, credentials: &LoginCredentials) -> Result<SessionUser, SessionApiError>;

    /// Create an account and establish a backend session for it.
    async fn signup(&self, request: &SignupRequest) -> Result<SessionUser, SessionApiError>;

    /// End the backend session. Callers treat this as best effort.
    async fn logout(&self) -> Result<(), SessionApiError>;

    /// Replace the signed-in user's password.
    ///
    /// A wrong current password surfaces as `Unauthorized` or `Rejected`,
    /// depending on how the backend reports it.
    async fn update_password(&self, change: &PasswordChange) -> Result<(), SessionApiError>;
}
