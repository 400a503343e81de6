//! Deployment plan types.
//!
//! Plans are built fresh for every request and never stored. No health
//! check is actually run and no real cluster or task definition is looked
//! up: the checks and identifiers are fixed placeholders.

use serde::Serialize;

/// Identifier value used where a real cluster or task definition id
/// would go.
pub const PLACEHOLDER_ID: &str = "...";

/// The only check a plan reports.
pub const HEALTH_OK_CHECK: &str = "health-ok";

/// Next step suggested after every plan.
pub const APPLY_NEXT_STEP: &str = "call aws.ecs_apply with plan_id";

/// Identifiers a plan refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanIds {
    /// Cluster identifier.
    pub cluster: String,
    /// Task definition identifier.
    pub taskdef: String,
}

impl PlanIds {
    /// Returns the placeholder identifiers.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            cluster: String::from(PLACEHOLDER_ID),
            taskdef: String::from(PLACEHOLDER_ID),
        }
    }
}

/// A proposed service update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Service to update.
    pub service: String,
    /// Target image reference.
    pub image: String,
    /// Checks the plan reports.
    pub checks: Vec<String>,
    /// Identifiers the plan refers to.
    pub ids: PlanIds,
}

impl Plan {
    /// Builds the plan for updating `service` to `image`.
    #[must_use]
    pub fn for_update(service: &str, image: &str) -> Self {
        Self {
            service: service.to_string(),
            image: image.to_string(),
            checks: vec![String::from(HEALTH_OK_CHECK)],
            ids: PlanIds::placeholder(),
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} [{}]",
            self.service,
            self.image,
            self.checks.join(", ")
        )
    }
}
