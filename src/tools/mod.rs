//! Namespaced tool registry.
//!
//! Tools are addressed by dotted names such as `aws.ecs_plan`. Each tool
//! publishes an MCP tool definition (input schema and behaviour hints) and
//! takes JSON arguments, returning JSON output.

mod ecs_plan;
mod name;
mod registry;

pub use ecs_plan::{ECS_PLAN_TOOL, EcsPlanTool};
pub use name::ToolName;
pub use registry::{Tool, ToolRegistry};
pub use rmcp::model::{Tool as ToolDefinition, ToolAnnotations};
