//! Plan formatting.

use super::plan::{APPLY_NEXT_STEP, Plan};
use super::request::ResponseFormat;
use super::response::{ConciseResponse, DetailedResponse, PlanResponse};

/// Builds the plan for updating `service` to `image` and shapes the
/// response.
///
/// The concise summary ends with "Health checks OK." and the detailed one
/// does not. This never fails and has no side effects.
#[must_use]
pub fn format_update_plan(
    service: &str,
    image: &str,
    response_format: ResponseFormat,
) -> PlanResponse {
    let plan = Plan::for_update(service, image);
    let next_steps = vec![String::from(APPLY_NEXT_STEP)];

    match response_format {
        ResponseFormat::Concise => PlanResponse::Concise(ConciseResponse {
            summary: format!("Update {service} to {image}. Health checks OK."),
            next_steps,
        }),
        ResponseFormat::Detailed => PlanResponse::Detailed(DetailedResponse {
            summary: format!("Update {service} to {image}"),
            next_steps,
            ids: plan.ids.clone(),
            plan,
        }),
    }
}
