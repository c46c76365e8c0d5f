//! Stored contract analyses and clause risk levels.
//!
//! Analyses are produced by the backend and only ever replaced wholesale by
//! the session container, so these types are read-only views with serde
//! contracts matching the backend's camelCase JSON.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};

/// Risk classification of one contract clause.
///
/// Variants are declared from least to most severe so the derived ordering
/// gives `High > Medium > Low > Negligible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// No meaningful exposure.
    Negligible,
    /// Minor exposure.
    Low,
    /// Worth negotiating.
    Medium,
    /// Requires attention before signing.
    High,
}

impl RiskLevel {
    /// All levels, most severe first.
    pub const BY_SEVERITY: [Self; 4] = [Self::High, Self::Medium, Self::Low, Self::Negligible];

    /// Name used by the backend and in summaries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Negligible => "Negligible",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluation of a single clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseEvaluation {
    /// Clause text as extracted from the document.
    #[serde(default)]
    pub clause: String,
    /// Assigned risk level.
    pub risk_level: RiskLevel,
    /// Why the level was assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Suggested change, when one was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Result payload of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Clause evaluations in document order.
    #[serde(default)]
    pub clauses: Vec<ClauseEvaluation>,
}

/// A previously completed analysis belonging to the session user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnalysis {
    /// Backend identifier; never blank.
    #[serde(deserialize_with = "non_blank_id")]
    pub id: String,
    /// Name of the uploaded source file.
    pub file_name: String,
    /// When the analysis completed. Timestamps without an offset are read
    /// as UTC.
    #[serde(deserialize_with = "utc_timestamp")]
    pub analysis_date: DateTime<Utc>,
    /// Clause-level results.
    pub analysis_result: AnalysisResult,
}

fn non_blank_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let id = String::deserialize(deserializer)?;
    if id.trim().is_empty() {
        return Err(de::Error::custom("analysis id must not be blank"));
    }
    Ok(id)
}

fn utc_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(stamp) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(stamp.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|err| de::Error::custom(format!("invalid analysis date '{raw}': {err}")))
}

impl StoredAnalysis {
    /// Count clauses per risk level.
    #[must_use]
    pub fn risk_summary(&self) -> RiskSummary {
        self.analysis_result
            .clauses
            .iter()
            .map(|clause| clause.risk_level)
            .collect()
    }
}

/// Per-level clause counts for one analysis.
///
/// # Examples
/// ```
/// use client::domain::{RiskLevel, RiskSummary};
///
/// let summary: RiskSummary = [RiskLevel::High, RiskLevel::Low, RiskLevel::High]
///     .into_iter()
///     .collect();
/// assert_eq!(summary.count(RiskLevel::High), 2);
/// assert_eq!(summary.total(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RiskSummary {
    high: usize,
    medium: usize,
    low: usize,
    negligible: usize,
}

impl RiskSummary {
    /// Number of clauses at `level`.
    #[must_use]
    pub const fn count(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => self.low,
            RiskLevel::Negligible => self.negligible,
        }
    }

    /// Total number of clauses counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.high + self.medium + self.low + self.negligible
    }

    /// Levels with at least one clause, most severe first.
    pub fn nonzero(&self) -> impl Iterator<Item = (RiskLevel, usize)> + '_ {
        RiskLevel::BY_SEVERITY
            .into_iter()
            .map(|level| (level, self.count(level)))
            .filter(|(_, count)| *count > 0)
    }

    fn record(&mut self, level: RiskLevel) {
        let slot = match level {
            RiskLevel::High => &mut self.high,
            RiskLevel::Medium => &mut self.medium,
            RiskLevel::Low => &mut self.low,
            RiskLevel::Negligible => &mut self.negligible,
        };
        *slot += 1;
    }
}

impl FromIterator<RiskLevel> for RiskSummary {
    fn from_iter<I: IntoIterator<Item = RiskLevel>>(iter: I) -> Self {
        let mut summary = Self::default();
        for level in iter {
            summary.record(level);
        }
        summary
    }
}

impl fmt::Display for RiskSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (level, count) in self.nonzero() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{count} {level}")?;
            first = false;
        }
        if first {
            f.write_str("no clauses")?;
        }
        Ok(())
    }
}

/// Account-wide figures across every stored analysis.
///
/// # Examples
/// ```
/// use client::domain::AnalysisTotals;
///
/// let totals = AnalysisTotals::from_analyses(&[]);
/// assert_eq!(totals.analyses(), 0);
/// assert_eq!(totals.high_risk_clauses(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnalysisTotals {
    analyses: usize,
    clauses: RiskSummary,
}

impl AnalysisTotals {
    /// Aggregate the clause counts of `analyses`.
    #[must_use]
    pub fn from_analyses(analyses: &[StoredAnalysis]) -> Self {
        let clauses = analyses
            .iter()
            .flat_map(|analysis| analysis.analysis_result.clauses.iter())
            .map(|clause| clause.risk_level)
            .collect();
        Self {
            analyses: analyses.len(),
            clauses,
        }
    }

    /// Number of stored analyses.
    #[must_use]
    pub const fn analyses(&self) -> usize {
        self.analyses
    }

    /// Clauses evaluated across all analyses.
    #[must_use]
    pub const fn clauses(&self) -> usize {
        self.clauses.total()
    }

    /// Clauses rated [`RiskLevel::High`] across all analyses.
    #[must_use]
    pub const fn high_risk_clauses(&self) -> usize {
        self.clauses.count(RiskLevel::High)
    }
}
