//! Subscription plans and the free-tier analysis allowance.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of stored analyses a free-tier user may accumulate.
pub const FREE_PLAN_ANALYSIS_LIMIT: usize = 1;

/// Raised when a plan name is not one of the paid tiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown plan '{name}': expected Brief, Motion or Verdict")]
pub struct PlanValidationError {
    /// The rejected input.
    pub name: String,
}

/// A paid subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plan {
    /// Entry tier.
    Brief,
    /// Mid tier.
    Motion,
    /// Top tier.
    Verdict,
}

impl Plan {
    /// All paid tiers in ascending order.
    pub const ALL: [Self; 3] = [Self::Brief, Self::Motion, Self::Verdict];

    /// Backend name of the plan.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brief => "Brief",
            Self::Motion => "Motion",
            Self::Verdict => "Verdict",
        }
    }

    /// Benefit lines advertised for the plan.
    #[must_use]
    pub const fn benefits(self) -> &'static [&'static str] {
        match self {
            Self::Brief => &[
                "Unlimited contract analysis",
                "Basic risk detection",
                "Download summary PDF",
            ],
            Self::Motion => &[
                "Everything in Brief",
                "Advanced clause insights",
                "Priority support",
                "Export to Word",
            ],
            Self::Verdict => &[
                "Everything in Motion",
                "AI-powered negotiation suggestions",
                "Team collaboration",
                "Dedicated legal expert review",
            ],
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = PlanValidationError;

    /// Parse a plan name. Matching is exact, as on the backend.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|plan| plan.as_str() == value)
            .ok_or_else(|| PlanValidationError {
                name: value.to_owned(),
            })
    }
}

/// Active plan as reported by the backend.
///
/// A missing or unrecognised plan means the free tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlanStatus {
    plan: Option<Plan>,
    is_pro: bool,
}

impl PlanStatus {
    /// Build a status from its parts.
    #[must_use]
    pub const fn new(plan: Option<Plan>, is_pro: bool) -> Self {
        Self { plan, is_pro }
    }

    /// The free tier.
    #[must_use]
    pub const fn free() -> Self {
        Self::new(None, false)
    }

    /// Active paid plan, if any.
    #[must_use]
    pub const fn plan(&self) -> Option<Plan> {
        self.plan
    }

    /// Backend `isPro` flag.
    #[must_use]
    pub const fn is_pro(&self) -> bool {
        self.is_pro
    }

    /// Whether the user is on the free tier.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.plan.is_none()
    }

    /// Whether a free-tier user has used up their analysis allowance.
    ///
    /// # Examples
    /// ```
    /// use client::domain::{Plan, PlanStatus};
    ///
    /// assert!(!PlanStatus::free().has_reached_analysis_limit(0));
    /// assert!(PlanStatus::free().has_reached_analysis_limit(1));
    /// assert!(!PlanStatus::new(Some(Plan::Brief), true).has_reached_analysis_limit(10));
    /// ```
    #[must_use]
    pub const fn has_reached_analysis_limit(&self, stored_analyses: usize) -> bool {
        self.is_free() && stored_analyses >= FREE_PLAN_ANALYSIS_LIMIT
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.plan {
            Some(plan) => write!(f, "{plan}"),
            None => f.write_str("Free"),
        }
    }
}
