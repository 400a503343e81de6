//! Planning module for deployment update requests.
//!
//! This module turns an update request (service, image, verbosity) into
//! a placeholder deployment plan and shapes the response returned to
//! the caller for review before a separate apply step.

mod formatter;
mod plan;
mod request;
mod response;

pub use formatter::format_update_plan;
pub use plan::{APPLY_NEXT_STEP, HEALTH_OK_CHECK, PLACEHOLDER_ID, Plan, PlanIds};
pub use request::{ResponseFormat, UpdateRequest};
pub use response::{ConciseResponse, DetailedResponse, PlanResponse};
