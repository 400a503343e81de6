//! The `aws.ecs_plan` tool.
//!
//! Plans a container-service update and returns it for review. Applying
//! the plan is left to a separate `aws.ecs_apply` tool, which this server
//! does not provide.

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::planner::UpdateRequest;

use super::registry::Tool;
use super::{ToolAnnotations, ToolDefinition};

/// Name of the plan tool.
pub const ECS_PLAN_TOOL: &str = "aws.ecs_plan";

const TITLE: &str = "Plan ECS Update";

/// Plans an ECS service update.
#[derive(Debug, Default, Clone, Copy)]
pub struct EcsPlanTool;

impl EcsPlanTool {
    /// Creates the tool.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn input_schema() -> JsonObject {
        let mut properties = JsonObject::new();
        properties.insert(
            "service".to_string(),
            json!({
                "type": "string",
                "description": "Name of the service to update."
            }),
        );
        properties.insert(
            "image".to_string(),
            json!({
                "type": "string",
                "description": "Image reference to deploy, e.g. web:1.2.3."
            }),
        );
        properties.insert(
            "response_format".to_string(),
            json!({
                "type": "string",
                "enum": ["concise", "detailed"],
                "default": "concise",
                "description": "concise returns a summary; detailed adds ids and the full plan."
            }),
        );

        let mut input_schema = JsonObject::new();
        input_schema.insert("type".to_string(), Value::String("object".to_string()));
        input_schema.insert("required".to_string(), json!(["service", "image"]));
        input_schema.insert("properties".to_string(), Value::Object(properties));
        input_schema
    }
}

#[async_trait]
impl Tool for EcsPlanTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: ECS_PLAN_TOOL.into(),
            description: Some(
                "Plan updating an ECS service to a new image. Returns a summary and next steps; \
                 request response_format=detailed only when the cluster and task definition ids are needed."
                    .into(),
            ),
            input_schema: Arc::new(Self::input_schema()),
            output_schema: None,
            title: Some(TITLE.to_string()),
            annotations: Some(ToolAnnotations {
                read_only_hint: Some(true),
                destructive_hint: Some(false),
                open_world_hint: Some(false),
                idempotent_hint: Some(true),
                title: Some(TITLE.to_string()),
            }),
            icons: None,
        }
    }

    async fn call(&self, arguments: Value) -> Result<Value> {
        let request: UpdateRequest = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_arguments(ECS_PLAN_TOOL, e))?;
        debug!(
            "Planning update of {} to {} ({})",
            request.service, request.image, request.response_format
        );
        let response = request.format();
        Ok(serde_json::to_value(&response)?)
    }
}
