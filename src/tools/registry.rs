//! Tool trait and registry.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::{ConfigError, EcsPlanError, Result, ToolError};

use super::ToolDefinition;
use super::ecs_plan::EcsPlanTool;
use super::name::ToolName;

/// A namespaced tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's definition. Its name is the registry key and
    /// must be a valid [`ToolName`].
    fn definition(&self) -> ToolDefinition;

    /// Invokes the tool with a JSON arguments object.
    async fn call(&self, arguments: Value) -> Result<Value>;
}

/// Registry of tools keyed by namespaced name.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<ToolName, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in tool.
    #[must_use]
    pub fn with_builtin_tools() -> Self {
        Self::with_builtin_tools_except(&[])
    }

    /// Creates a registry with every built-in tool not named in `disabled`.
    ///
    /// Disabled names that match no built-in tool are logged and ignored.
    #[must_use]
    pub fn with_builtin_tools_except(disabled: &[ToolName]) -> Self {
        let builtins: Vec<Arc<dyn Tool>> = vec![Arc::new(EcsPlanTool::new())];

        let mut registry = Self::new();
        let mut known = Vec::with_capacity(builtins.len());
        for tool in builtins {
            let name = match key_of(tool.as_ref()) {
                Ok(name) => name,
                Err(e) => {
                    warn!("Skipping built-in tool: {e}");
                    continue;
                }
            };
            known.push(name.clone());
            if disabled.contains(&name) {
                info!("Tool {name} disabled by configuration");
                continue;
            }
            registry.tools.insert(name, tool);
        }

        for name in disabled {
            if !known.contains(name) {
                warn!("Disabled tool {name} is not a built-in tool");
            }
        }

        registry
    }

    /// Creates the built-in registry minus the tools disabled in `config`.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first malformed entry of
    /// `tools.disabled`.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let disabled = config
            .tools
            .disabled
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                ToolName::parse(raw).map_err(|e| {
                    EcsPlanError::from(ConfigError::validation(
                        format!("tools.disabled[{i}]"),
                        e.to_string(),
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::with_builtin_tools_except(&disabled))
    }

    /// Registers a tool under the name in its definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is malformed or a tool with the same
    /// name is already registered.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = key_of(tool.as_ref())?;
        if self.tools.contains_key(&name) {
            return Err(ToolError::DuplicateTool {
                name: name.to_string(),
            }
            .into());
        }
        debug!("Registered tool {name}");
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Looks up a tool by its dotted name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is malformed or unregistered.
    pub fn get(&self, name: &str) -> Result<&Arc<dyn Tool>> {
        let key = ToolName::parse(name)?;
        self.tools.get(&key).ok_or_else(|| {
            ToolError::UnknownTool {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Calls a tool by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool is unknown or rejects its arguments.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value> {
        let tool = self.get(name)?;
        debug!("Calling tool {name}");
        tool.call(arguments).await
    }

    /// Calls a tool with arguments given as JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] if the text is not JSON, and
    /// otherwise the errors of [`ToolRegistry::call`].
    pub async fn call_json(&self, name: &str, raw_arguments: &str) -> Result<Value> {
        let arguments: Value = serde_json::from_str(raw_arguments)
            .map_err(|e| ToolError::invalid_arguments(name, e))?;
        self.call(name, arguments).await
    }

    /// Returns the definitions of all tools, ordered by name.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Returns the registered names, ordered.
    #[must_use]
    pub fn names(&self) -> Vec<&ToolName> {
        self.tools.keys().collect()
    }

    /// Returns true if a tool is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &ToolName) -> bool {
        self.tools.contains_key(name)
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn key_of(tool: &dyn Tool) -> Result<ToolName> {
    Ok(ToolName::parse(&tool.definition().name)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool {
        name: &'static str,
    }

    impl EchoTool {
        fn named(name: &'static str) -> Arc<dyn Tool> {
            Arc::new(Self { name })
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> ToolDefinition {
            let mut schema = rmcp::model::JsonObject::new();
            schema.insert("type".to_string(), json!("object"));
            ToolDefinition {
                name: self.name.into(),
                description: Some("Echo arguments back".into()),
                input_schema: Arc::new(schema),
                output_schema: None,
                title: None,
                annotations: None,
                icons: None,
            }
        }

        async fn call(&self, arguments: Value) -> Result<Value> {
            Ok(arguments)
        }
    }

    #[test]
    fn test_builtin_tools() {
        let registry = ToolRegistry::with_builtin_tools();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&ToolName::parse("aws.ecs_plan").unwrap()));
    }

    #[test]
    fn test_disable_builtin() {
        let disabled = [ToolName::parse("aws.ecs_plan").unwrap()];
        let registry = ToolRegistry::with_builtin_tools_except(&disabled);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_disable_unknown_is_ignored() {
        let disabled = [ToolName::parse("aws.ecs_apply").unwrap()];
        let registry = ToolRegistry::with_builtin_tools_except(&disabled);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_from_config_disables_tools() {
        let mut config = ServerConfig::default();
        config.tools.disabled = vec![String::from("aws.ecs_plan")];
        let registry = ToolRegistry::from_config(&config).unwrap();
        assert!(registry.is_empty());

        let registry = ToolRegistry::from_config(&ServerConfig::default()).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_from_config_rejects_malformed_disabled_name() {
        let mut config = ServerConfig::default();
        config.tools.disabled = vec![String::from("aws.ecs_plan"), String::from("ECS Plan")];
        let err = ToolRegistry::from_config(&config).unwrap_err();
        match err {
            EcsPlanError::Config(ConfigError::ValidationError { field, message }) => {
                assert_eq!(field.as_deref(), Some("tools.disabled[1]"));
                assert!(message.contains("ECS Plan"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!ToolRegistry::from_config(&config).unwrap_err().is_client_error());
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool::named("test.echo")).unwrap();
        let err = registry.register(EchoTool::named("test.echo")).unwrap_err();
        assert!(matches!(
            err,
            EcsPlanError::Tool(ToolError::DuplicateTool { ref name }) if name == "test.echo"
        ));
    }

    #[test]
    fn test_register_rejects_malformed_name() {
        let mut registry = ToolRegistry::new();
        let err = registry.register(EchoTool::named("echo")).unwrap_err();
        assert!(matches!(err, EcsPlanError::Tool(ToolError::InvalidName { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_definitions_are_sorted() {
        let mut registry = ToolRegistry::with_builtin_tools();
        registry.register(EchoTool::named("test.echo")).unwrap();
        registry.register(EchoTool::named("aaa.echo")).unwrap();
        let names: Vec<String> = registry
            .definitions()
            .into_iter()
            .map(|d| d.name.to_string())
            .collect();
        assert_eq!(names, ["aaa.echo", "aws.ecs_plan", "test.echo"]);
    }

    #[tokio::test]
    async fn test_call_registered_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool::named("test.echo")).unwrap();
        let output = registry.call("test.echo", json!({"x": 1})).await.unwrap();
        assert_eq!(output, json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let registry = ToolRegistry::with_builtin_tools();
        let err = registry.call("aws.ecs_apply", json!({})).await.unwrap_err();
        assert!(matches!(err, EcsPlanError::Tool(ToolError::UnknownTool { .. })));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_call_malformed_name() {
        let registry = ToolRegistry::with_builtin_tools();
        let err = registry.call("ecs_plan", json!({})).await.unwrap_err();
        assert!(matches!(err, EcsPlanError::Tool(ToolError::InvalidName { .. })));
    }

    #[tokio::test]
    async fn test_call_json() {
        let registry = ToolRegistry::with_builtin_tools();
        let output = registry
            .call_json("aws.ecs_plan", r#"{"service":"web","image":"web:1.2.3"}"#)
            .await
            .unwrap();
        assert_eq!(
            output["summary"],
            json!("Update web to web:1.2.3. Health checks OK.")
        );
    }

    #[tokio::test]
    async fn test_call_json_rejects_bad_json() {
        let registry = ToolRegistry::with_builtin_tools();
        let err = registry
            .call_json("aws.ecs_plan", "{service: web}")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EcsPlanError::Tool(ToolError::InvalidArguments { ref tool, .. }) if tool == "aws.ecs_plan"
        ));
        assert!(err.is_client_error());
    }
}
