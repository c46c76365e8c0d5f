//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod plan_api;
mod session_api;
mod session_mirror;

#[cfg(test)]
pub use plan_api::MockPlanApi;
pub use plan_api::PlanApi;
#[cfg(test)]
pub use session_api::MockSessionApi;
pub use session_api::{SessionApi, SessionApiError};
#[cfg(test)]
pub use session_mirror::MockSessionMirror;
pub use session_mirror::{SESSION_MIRROR_KEY, SessionMirror, SessionMirrorError};
