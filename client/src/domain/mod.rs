//! Domain primitives, ports and services for the client session.
//!
//! Purpose: Define strongly typed session records and the services that keep
//! them consistent with the backend. Types are immutable once validated; the
//! serde contracts are documented on each type.
//!
//! Public surface:
//! - Error (alias to `error::Error`): failure reported to the caller.
//! - SessionUser (alias to `user::SessionUser`): signed-in identity.
//! - StoredAnalysis (alias to `analysis::StoredAnalysis`): saved analysis.
//! - SessionContainer (alias to `session_service::SessionContainer`): owner
//!   of the session state.
//! - SubscriptionService (alias to `subscription_service::SubscriptionService`):
//!   plan reads and changes.

pub mod analysis;
pub mod auth;
pub mod error;
pub mod plan;
pub mod ports;
pub mod session_service;
pub mod subscription_service;
pub mod user;

pub use self::analysis::{
    AnalysisResult, AnalysisTotals, ClauseEvaluation, RiskLevel, RiskSummary, StoredAnalysis,
};
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, NEW_PASSWORD_MIN, PasswordChange, SignupRequest,
};
pub use self::error::{Error, ErrorCode};
pub use self::plan::{FREE_PLAN_ANALYSIS_LIMIT, Plan, PlanStatus, PlanValidationError};
pub use self::session_service::{SessionContainer, SessionSource, SessionState};
pub use self::subscription_service::SubscriptionService;
pub use self::user::{EmailAddress, SessionUser, UserValidationError, Username};

/// Convenient result alias for domain operations.
///
/// # Examples
/// ```
/// use client::domain::{DomainResult, Error};
///
/// fn guarded() -> DomainResult<()> {
///     Err(Error::unauthorized("sign in first"))
/// }
///
/// assert!(guarded().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
