//! Wire DTOs for the session backend's JSON bodies.
//!
//! Request bodies borrow from validated domain values. Response bodies decode
//! into transport DTOs first and are mapped into domain records in one pass.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{LoginCredentials, PasswordChange, Plan, PlanStatus, SignupRequest};

#[derive(Debug, Serialize)]
pub(super) struct LoginRequestDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

impl<'a> From<&'a LoginCredentials> for LoginRequestDto<'a> {
    fn from(credentials: &'a LoginCredentials) -> Self {
        Self {
            email: credentials.email().as_ref(),
            password: credentials.password(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct SignupRequestDto<'a> {
    pub(super) username: &'a str,
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

impl<'a> From<&'a SignupRequest> for SignupRequestDto<'a> {
    fn from(request: &'a SignupRequest) -> Self {
        Self {
            username: request.username().as_ref(),
            email: request.email().as_ref(),
            password: request.password(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct UpdatePasswordRequestDto<'a> {
    pub(super) current_password: &'a str,
    pub(super) new_password: &'a str,
}

impl<'a> From<&'a PasswordChange> for UpdatePasswordRequestDto<'a> {
    fn from(change: &'a PasswordChange) -> Self {
        Self {
            current_password: change.current_password(),
            new_password: change.new_password(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ActivatePlanRequestDto {
    pub(super) plan: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PlanStatusDto {
    #[serde(default)]
    pub(super) plan: Option<String>,
    #[serde(default)]
    pub(super) is_pro: bool,
}

impl PlanStatusDto {
    /// Unknown plan names fall back to the free tier.
    pub(super) fn into_domain(self) -> PlanStatus {
        let plan = self.plan.and_then(|name| name.parse::<Plan>().ok());
        PlanStatus::new(plan, self.is_pro)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ActivatePlanResponseDto {
    pub(super) plan: String,
}

impl ActivatePlanResponseDto {
    pub(super) fn into_domain(self) -> Result<Plan, String> {
        self.plan
            .parse::<Plan>()
            .map_err(|error| error.to_string())
    }
}

/// FastAPI error body: `detail` is a string or a list of validation entries.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    detail: Value,
}

impl ErrorBodyDto {
    pub(super) fn into_message(self) -> Option<String> {
        let message = match self.detail {
            Value::String(text) => text,
            Value::Array(entries) => entries
                .iter()
                .map(|entry| match entry.get("msg").and_then(Value::as_str) {
                    Some(msg) => msg.to_owned(),
                    None => entry.to_string(),
                })
                .collect::<Vec<_>>()
                .join("; "),
            Value::Null => return None,
            other => other.to_string(),
        };
        let trimmed = message.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    }
}
