//! Session state container.
//!
//! Owns the current session user and their stored analyses, reconciles them
//! with the backend, and keeps a local mirror of the user as a fallback for
//! startup. The backend's answer always wins over the mirror; a mirror that
//! does not decode is removed.
//!
//! State lives in a [`tokio::sync::watch`] channel. Every transition publishes
//! a complete [`SessionState`], so observers never see a user without an
//! analyses list.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::ports::{SessionApi, SessionApiError, SessionMirror};
use crate::domain::{
    Error, LoginCredentials, PasswordChange, SessionUser, SignupRequest, StoredAnalysis,
};

/// Where the current session user was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSource {
    /// The backend confirmed the session.
    Backend,
    /// Provisionally taken from the local mirror.
    Mirror,
}

/// Snapshot of the session as seen by views.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nobody is signed in.
    #[default]
    Unauthenticated,
    /// A user is signed in.
    Authenticated {
        /// Current user.
        user: SessionUser,
        /// The user's stored analyses; empty when loading failed.
        analyses: Vec<StoredAnalysis>,
        /// Where `user` came from.
        source: SessionSource,
    },
}

impl SessionState {
    /// Current user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::Authenticated { user, .. } => Some(user),
            Self::Unauthenticated => None,
        }
    }

    /// Stored analyses; always empty when unauthenticated.
    #[must_use]
    pub fn analyses(&self) -> &[StoredAnalysis] {
        match self {
            Self::Authenticated { analyses, .. } => analyses,
            Self::Unauthenticated => &[],
        }
    }

    /// Where the current user came from, if any.
    #[must_use]
    pub fn source(&self) -> Option<SessionSource> {
        match self {
            Self::Authenticated { source, .. } => Some(*source),
            Self::Unauthenticated => None,
        }
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Map a backend failure to a domain error.
pub(crate) fn map_api_error(error: SessionApiError) -> Error {
    match error {
        SessionApiError::Unauthorized { message } => Error::unauthorized(message),
        SessionApiError::Rejected { message } => Error::invalid_request(message),
        SessionApiError::Transport { message } | SessionApiError::Timeout { message } => {
            Error::service_unavailable(format!("backend unavailable: {message}"))
        }
        SessionApiError::Decode { message } => {
            Error::internal(format!("unexpected backend response: {message}"))
        }
        SessionApiError::Status { status, message } if status >= 500 => {
            Error::service_unavailable(format!("backend error {status}: {message}"))
        }
        SessionApiError::Status { status, message } => {
            Error::internal(format!("unexpected backend status {status}: {message}"))
        }
    }
}

/// Session state container with injected backend and mirror ports.
///
/// Callers must not run two transitions of the same kind concurrently (for
/// example two `login` calls); the UI disables duplicate submissions.
pub struct SessionContainer<A, M> {
    api: Arc<A>,
    mirror: Arc<M>,
    state: watch::Sender<SessionState>,
}

impl<A, M> SessionContainer<A, M> {
    /// Create an unauthenticated container over the given ports.
    pub fn new(api: Arc<A>, mirror: Arc<M>) -> Self {
        let (state, _) = watch::channel(SessionState::Unauthenticated);
        Self { api, mirror, state }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Current user, if signed in.
    #[must_use]
    pub fn current_user(&self) -> Option<SessionUser> {
        self.state.borrow().user().cloned()
    }

    /// Current analyses list; empty when signed out.
    #[must_use]
    pub fn analyses(&self) -> Vec<StoredAnalysis> {
        self.state.borrow().analyses().to_vec()
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn publish(&self, next: SessionState) {
        self.state.send_replace(next);
    }
}

impl<A, M> SessionContainer<A, M>
where
    A: SessionApi,
    M: SessionMirror,
{
    /// Restore the session at startup.
    ///
    /// Never fails: the outcome is either a fully populated authenticated
    /// state or an unauthenticated one. Returns the published state.
    pub async fn restore(&self) -> SessionState {
        let next = match self.resolve_user().await {
            Some((user, source)) => {
                let analyses = self.fetch_analyses_or_empty().await;
                info!(username = %user.username(), ?source, "session restored");
                SessionState::Authenticated {
                    user,
                    analyses,
                    source,
                }
            }
            None => {
                debug!("no session to restore");
                SessionState::Unauthenticated
            }
        };
        self.publish(next.clone());
        next
    }

    /// Restore the session and require the backend to recognise it.
    ///
    /// A fresh HTTP adapter has an empty cookie jar, so a user resolved only
    /// from the mirror cannot make authenticated calls.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ErrorCode::Unauthorized`] when nobody is
    /// signed in or the user is known only from the local mirror.
    pub async fn restore_confirmed(&self) -> Result<SessionUser, Error> {
        match self.restore().await {
            SessionState::Authenticated {
                user,
                source: SessionSource::Backend,
                ..
            } => Ok(user),
            SessionState::Authenticated { user, .. } => Err(Error::unauthorized(format!(
                "{} is known only from the local mirror; the backend did not confirm the session",
                user.email()
            ))),
            SessionState::Unauthenticated => Err(Error::unauthorized("not signed in")),
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ErrorCode::InvalidRequest`] for malformed
    /// input, [`crate::domain::ErrorCode::Unauthorized`] when the backend
    /// rejects the credentials, or a service error when it cannot be reached.
    /// The previous state is kept on every error.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, Error> {
        let credentials = LoginCredentials::try_from_parts(email, password)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let user = self.api.login(&credentials).await.map_err(map_api_error)?;
        info!(username = %user.username(), "signed in");
        self.adopt(user.clone()).await;
        Ok(user)
    }

    /// Create an account and sign in to it.
    ///
    /// # Errors
    ///
    /// Same contract as [`SessionContainer::login`]; a taken email or other
    /// backend validation failure is reported as
    /// [`crate::domain::ErrorCode::InvalidRequest`].
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionUser, Error> {
        let request = SignupRequest::try_from_parts(username, email, password)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let user = self.api.signup(&request).await.map_err(map_api_error)?;
        info!(username = %user.username(), "account created");
        self.adopt(user.clone()).await;
        Ok(user)
    }

    /// Sign out locally and, best effort, on the backend.
    pub async fn logout(&self) {
        if let Err(err) = self.api.logout().await {
            warn!(
                error = %err,
                kind = err.kind(),
                "backend logout failed; clearing local session anyway"
            );
        }
        self.clear_mirror();
        self.publish(SessionState::Unauthenticated);
        info!("signed out");
    }

    /// Replace the signed-in user's password on the backend.
    ///
    /// The session state is not touched, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ErrorCode::Unauthorized`] when nobody is signed
    /// in (no backend call is made) or the backend refuses the current
    /// password, and [`crate::domain::ErrorCode::InvalidRequest`] for local
    /// validation failures or a backend rejection of the new password.
    pub async fn update_password(&self, current: &str, new: &str) -> Result<(), Error> {
        let change = PasswordChange::try_from_parts(current, new)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let Some(user) = self.current_user() else {
            return Err(Error::unauthorized("sign in to change the password"));
        };
        self.api
            .update_password(&change)
            .await
            .map_err(map_api_error)?;
        info!(username = %user.username(), "password updated");
        Ok(())
    }

    /// Re-fetch the analyses of the signed-in user.
    ///
    /// A failed fetch empties the list. The result is dropped if the session
    /// changed while the request was in flight. Does nothing when signed out.
    pub async fn refresh_analyses(&self) {
        let Some(user) = self.current_user() else {
            debug!("no session; skipping analyses refresh");
            return;
        };
        let fresh = self.fetch_analyses_or_empty().await;
        let applied = self.state.send_if_modified(|state| match state {
            SessionState::Authenticated {
                user: current,
                analyses,
                ..
            } if *current == user => {
                *analyses = fresh;
                true
            }
            _ => false,
        });
        if !applied {
            debug!("session changed during analyses refresh; result discarded");
        }
    }

    async fn adopt(&self, user: SessionUser) {
        self.persist_mirror(&user);
        let analyses = self.fetch_analyses_or_empty().await;
        self.publish(SessionState::Authenticated {
            user,
            analyses,
            source: SessionSource::Backend,
        });
    }

    /// Two-step resolution: backend first, then the local mirror.
    async fn resolve_user(&self) -> Option<(SessionUser, SessionSource)> {
        if let Some(user) = self.api.current_user().await {
            self.persist_mirror(&user);
            return Some((user, SessionSource::Backend));
        }
        self.mirrored_user()
            .map(|user| (user, SessionSource::Mirror))
    }

    fn mirrored_user(&self) -> Option<SessionUser> {
        let raw = match self.mirror.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, kind = err.kind(), "session mirror unreadable; ignoring it");
                return None;
            }
        };
        match serde_json::from_str::<SessionUser>(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!(error = %err, "discarding corrupt session mirror");
                self.clear_mirror();
                None
            }
        }
    }

    fn persist_mirror(&self, user: &SessionUser) {
        let record = match serde_json::to_string(user) {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "failed to encode session mirror record");
                return;
            }
        };
        if let Err(err) = self.mirror.write(&record) {
            warn!(error = %err, "failed to update session mirror");
        }
    }

    fn clear_mirror(&self) {
        if let Err(err) = self.mirror.clear() {
            warn!(error = %err, "failed to clear session mirror");
        }
    }

    async fn fetch_analyses_or_empty(&self) -> Vec<StoredAnalysis> {
        match self.api.user_analyses().await {
            Ok(analyses) => {
                debug!(count = analyses.len(), "loaded analyses");
                analyses
            }
            Err(err) => {
                warn!(error = %err, kind = err.kind(), "failed to load analyses; showing none");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[path = "session_service_tests.rs"]
mod tests;
