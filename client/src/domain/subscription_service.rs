//! Subscription plan service.
//!
//! Thin driving layer over [`PlanApi`] that maps transport failures to domain
//! errors, mirroring how the session container reports backend problems.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::PlanApi;
use crate::domain::session_service::map_api_error;
use crate::domain::{Error, Plan, PlanStatus};

/// Reads and changes the signed-in user's plan.
#[derive(Clone)]
pub struct SubscriptionService<P> {
    api: Arc<P>,
}

impl<P> SubscriptionService<P> {
    /// Create a new service over the plan port.
    pub fn new(api: Arc<P>) -> Self {
        Self { api }
    }
}

impl<P> SubscriptionService<P>
where
    P: PlanApi,
{
    /// Fetch the active plan.
    ///
    /// # Errors
    ///
    /// Returns a domain error when the backend rejects the session or cannot
    /// be reached.
    pub async fn status(&self) -> Result<PlanStatus, Error> {
        self.api.plan_status().await.map_err(map_api_error)
    }

    /// Activate a paid plan.
    ///
    /// # Errors
    ///
    /// Returns a domain error when the backend refuses the change.
    pub async fn activate(&self, plan: Plan) -> Result<PlanStatus, Error> {
        let recorded = self.api.activate(plan).await.map_err(map_api_error)?;
        if recorded != plan {
            return Err(Error::internal(format!(
                "backend recorded plan {recorded} instead of {plan}"
            )));
        }
        info!(%plan, "plan activated");
        Ok(PlanStatus::new(Some(recorded), true))
    }

    /// Return to the free tier.
    ///
    /// # Errors
    ///
    /// Returns a domain error when the backend refuses the change.
    pub async fn cancel(&self) -> Result<PlanStatus, Error> {
        self.api.cancel().await.map_err(map_api_error)?;
        info!("plan cancelled");
        Ok(PlanStatus::free())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockPlanApi, SessionApiError};
    use rstest::rstest;

    fn make_service(api: MockPlanApi) -> SubscriptionService<MockPlanApi> {
        SubscriptionService::new(Arc::new(api))
    }

    #[tokio::test]
    async fn status_passes_backend_answer_through() {
        let mut api = MockPlanApi::new();
        api.expect_plan_status()
            .times(1)
            .return_once(|| Ok(PlanStatus::new(Some(Plan::Motion), true)));

        let status = make_service(api).status().await.expect("status loads");

        assert_eq!(status.plan(), Some(Plan::Motion));
        assert!(status.is_pro());
    }

    #[rstest]
    #[case(Plan::Brief)]
    #[case(Plan::Verdict)]
    #[tokio::test]
    async fn activate_reports_new_status(#[case] plan: Plan) {
        let mut api = MockPlanApi::new();
        api.expect_activate()
            .withf(move |requested| *requested == plan)
            .times(1)
            .return_once(move |_| Ok(plan));

        let status = make_service(api).activate(plan).await.expect("activation");

        assert_eq!(status, PlanStatus::new(Some(plan), true));
    }

    #[tokio::test]
    async fn activate_flags_mismatched_backend_answer() {
        let mut api = MockPlanApi::new();
        api.expect_activate()
            .times(1)
            .return_once(|_| Ok(Plan::Brief));

        let err = make_service(api)
            .activate(Plan::Verdict)
            .await
            .expect_err("mismatch must fail");

        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn cancel_returns_free_tier() {
        let mut api = MockPlanApi::new();
        api.expect_cancel().times(1).return_once(|| Ok(()));

        let status = make_service(api).cancel().await.expect("cancel");

        assert!(status.is_free());
    }

    #[tokio::test]
    async fn unauthenticated_status_maps_to_unauthorized() {
        let mut api = MockPlanApi::new();
        api.expect_plan_status()
            .times(1)
            .return_once(|| Err(SessionApiError::unauthorized("Not authenticated")));

        let err = make_service(api).status().await.expect_err("must fail");

        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
