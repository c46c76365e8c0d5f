//! Driven port for the backend's subscription plan endpoints.

use async_trait::async_trait;

use crate::domain::{Plan, PlanStatus};

use super::SessionApiError;

/// Port for reading and changing the signed-in user's plan.
///
/// Plan endpoints share the session backend's transport, so failures reuse
/// [`SessionApiError`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanApi: Send + Sync {
    /// Fetch the active plan.
    async fn plan_status(&self) -> Result<PlanStatus, SessionApiError>;

    /// Activate a paid plan and return the plan the backend recorded.
    async fn activate(&self, plan: Plan) -> Result<Plan, SessionApiError>;

    /// Return to the free tier.
    async fn cancel(&self) -> Result<(), SessionApiError>;
}
