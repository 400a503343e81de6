//! MCP request handling over the tool registry.

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, ToolsCapability,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::config::ServerConfig;
use crate::error::EcsPlanError;
use crate::tools::ToolRegistry;

/// Builds the `initialize` result advertised for `config`.
#[must_use]
pub fn server_info(config: &ServerConfig) -> ServerInfo {
    ServerInfo {
        protocol_version: ProtocolVersion::V_2025_06_18,
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {
                list_changed: Some(false),
            }),
            ..Default::default()
        },
        server_info: Implementation {
            name: config.server.name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: None,
            icons: None,
            website_url: None,
        },
        instructions: config.server.instructions.clone(),
    }
}

/// Serves a tool registry to MCP clients.
#[derive(Debug, Clone)]
pub struct ToolServer {
    registry: Arc<ToolRegistry>,
    info: ServerInfo,
}

impl ToolServer {
    /// Creates a server with an explicit `initialize` result.
    #[must_use]
    pub const fn new(registry: Arc<ToolRegistry>, info: ServerInfo) -> Self {
        Self { registry, info }
    }

    /// Creates a server identified by `config`.
    #[must_use]
    pub fn from_config(registry: Arc<ToolRegistry>, config: &ServerConfig) -> Self {
        Self::new(registry, server_info(config))
    }

    /// Returns the registry this server exposes.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Answers `tools/list`.
    #[must_use]
    pub fn tools(&self) -> ListToolsResult {
        ListToolsResult::with_all_items(self.registry.definitions())
    }

    /// Answers `tools/call`.
    ///
    /// Absent arguments are passed to the tool as an empty object.
    ///
    /// # Errors
    ///
    /// Returns an invalid-params error for unknown tools and rejected
    /// arguments, and an internal error for anything else.
    pub async fn call(&self, request: CallToolRequestParam) -> Result<CallToolResult, McpError> {
        let arguments = Value::Object(request.arguments.unwrap_or_default());

        match self.registry.call(&request.name, arguments).await {
            Ok(output) => Ok(CallToolResult {
                content: vec![Content::text(output.to_string())],
                is_error: Some(false),
                meta: None,
                structured_content: Some(output),
            }),
            Err(e) => {
                warn!("Tool call {} failed: {e}", request.name);
                Err(to_mcp_error(&e))
            }
        }
    }
}

impl ServerHandler for ToolServer {
    fn get_info(&self) -> ServerInfo {
        self.info.clone()
    }

    fn list_tools(
        &self,
        _: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        async move { Ok(self.tools()) }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move { self.call(request).await }
    }
}

fn to_mcp_error(error: &EcsPlanError) -> McpError {
    if error.is_client_error() {
        McpError::invalid_params(error.to_string(), None)
    } else {
        McpError::internal_error(error.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;
    use serde_json::json;

    fn server() -> ToolServer {
        ToolServer::from_config(
            Arc::new(ToolRegistry::with_builtin_tools()),
            &ServerConfig::default(),
        )
    }

    fn call_request(name: &'static str, arguments: Option<Value>) -> CallToolRequestParam {
        let arguments = arguments.map(|value| match value {
            Value::Object(map) => map,
            other => panic!("arguments must be an object, got {other}"),
        });
        CallToolRequestParam {
            name: name.into(),
            arguments,
        }
    }

    #[test]
    fn test_server_info() {
        let info = server().get_info();
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["protocolVersion"], json!("2025-06-18"));
        assert_eq!(value["serverInfo"]["name"], json!("ecsplan"));
        assert_eq!(value["serverInfo"]["version"], json!(env!("CARGO_PKG_VERSION")));
        assert_eq!(value["capabilities"]["tools"]["listChanged"], json!(false));
        assert!(value["instructions"].is_string());
    }

    #[test]
    fn test_server_info_uses_configured_name() {
        let mut config = ServerConfig::default();
        config.server.name = String::from("plan-tools");
        config.server.instructions = None;
        let info = server_info(&config);
        assert_eq!(info.server_info.name, "plan-tools");
        assert!(info.instructions.is_none());
    }

    #[test]
    fn test_list_tools() {
        let value = serde_json::to_value(server().tools()).unwrap();
        let tools = value["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], json!("aws.ecs_plan"));
        assert_eq!(tools[0]["annotations"]["readOnlyHint"], json!(true));
        assert_eq!(tools[0]["inputSchema"]["type"], json!("object"));
    }

    #[tokio::test]
    async fn test_call_concise() {
        let result = server()
            .call(call_request(
                "aws.ecs_plan",
                Some(json!({"service": "web", "image": "web:1.2.3"})),
            ))
            .await
            .unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["isError"], json!(false));
        assert_eq!(
            value["structuredContent"],
            json!({
                "summary": "Update web to web:1.2.3. Health checks OK.",
                "next_steps": ["call aws.ecs_apply with plan_id"]
            })
        );
        assert_eq!(
            value["content"][0]["text"],
            json!(r#"{"summary":"Update web to web:1.2.3. Health checks OK.","next_steps":["call aws.ecs_apply with plan_id"]}"#)
        );
    }

    #[tokio::test]
    async fn test_call_result_keeps_field_order() {
        let result = server()
            .call(call_request(
                "aws.ecs_plan",
                Some(json!({"service": "web", "image": "web:1", "response_format": "detailed"})),
            ))
            .await
            .unwrap();
        let structured = result.structured_content.expect("structured content");
        let keys: Vec<&str> = structured
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["summary", "next_steps", "ids", "plan"]);

        let plan_keys: Vec<&str> = structured["plan"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(plan_keys, ["service", "image", "checks", "ids"]);
    }

    #[tokio::test]
    async fn test_call_detailed() {
        let result = server()
            .call(call_request(
                "aws.ecs_plan",
                Some(json!({"service": "web", "image": "web:1.2.3", "response_format": "detailed"})),
            ))
            .await
            .unwrap();
        let output = result.structured_content.unwrap();
        assert_eq!(output["summary"], json!("Update web to web:1.2.3"));
        assert_eq!(output["ids"], json!({"cluster": "...", "taskdef": "..."}));
        assert_eq!(output["plan"]["ids"], output["ids"]);
    }

    #[tokio::test]
    async fn test_call_without_arguments() {
        let result = server()
            .call(call_request("aws.ecs_plan", None))
            .await
            .unwrap();
        assert_eq!(
            result.structured_content.unwrap()["summary"],
            json!("Update  to . Health checks OK.")
        );
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let err = server()
            .call(call_request("aws.ecs_apply", Some(json!({}))))
            .await
            .unwrap_err();
        assert_eq!(err.code.0, ErrorCode::INVALID_PARAMS.0);
        assert!(err.message.contains("aws.ecs_apply"));
    }

    #[tokio::test]
    async fn test_call_bad_arguments() {
        let err = server()
            .call(call_request("aws.ecs_plan", Some(json!({"service": 1}))))
            .await
            .unwrap_err();
        assert_eq!(err.code.0, ErrorCode::INVALID_PARAMS.0);
    }

    #[test]
    fn test_internal_errors_map_to_internal_error() {
        let err = to_mcp_error(&EcsPlanError::internal("boom"));
        assert_eq!(err.code.0, ErrorCode::INTERNAL_ERROR.0);
    }
}
