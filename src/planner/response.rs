//! Plan response shapes.

use serde::Serialize;

use super::plan::{Plan, PlanIds};

/// Summary and next steps only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConciseResponse {
    /// One-line description of the update.
    pub summary: String,
    /// Suggested follow-up actions.
    pub next_steps: Vec<String>,
}

/// Summary, next steps, identifiers and the full plan.
///
/// `ids` is a copy of `plan.ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedResponse {
    /// One-line description of the update.
    pub summary: String,
    /// Suggested follow-up actions.
    pub next_steps: Vec<String>,
    /// Identifiers the plan refers to.
    pub ids: PlanIds,
    /// The full plan.
    pub plan: Plan,
}

/// Response of the plan formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PlanResponse {
    /// Concise form.
    Concise(ConciseResponse),
    /// Detailed form.
    Detailed(DetailedResponse),
}

impl PlanResponse {
    /// Returns the summary line.
    #[must_use]
    pub fn summary(&self) -> &str {
        match self {
            Self::Concise(r) => &r.summary,
            Self::Detailed(r) => &r.summary,
        }
    }

    /// Returns the suggested next steps.
    #[must_use]
    pub fn next_steps(&self) -> &[String] {
        match self {
            Self::Concise(r) => &r.next_steps,
            Self::Detailed(r) => &r.next_steps,
        }
    }

    /// Returns the full plan for detailed responses.
    #[must_use]
    pub const fn plan(&self) -> Option<&Plan> {
        match self {
            Self::Concise(_) => None,
            Self::Detailed(r) => Some(&r.plan),
        }
    }

    /// Returns true for the detailed form.
    #[must_use]
    pub const fn is_detailed(&self) -> bool {
        matches!(self, Self::Detailed(_))
    }
}
