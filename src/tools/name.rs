//! Namespaced tool names.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ToolError;

/// A tool name of the form `namespace.name`.
///
/// Both segments are non-empty and made of lowercase ASCII letters,
/// digits, `_` or `-`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToolName {
    namespace: String,
    name: String,
}

impl ToolName {
    /// Parses a dotted tool name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not `namespace.name` or contains
    /// characters outside the allowed set.
    pub fn parse(raw: &str) -> Result<Self, ToolError> {
        let (namespace, name) = raw
            .split_once('.')
            .ok_or_else(|| ToolError::invalid_name(raw, "expected namespace.name"))?;

        if name.contains('.') {
            return Err(ToolError::invalid_name(raw, "only one '.' is allowed"));
        }

        for (label, segment) in [("namespace", namespace), ("name", name)] {
            if segment.is_empty() {
                return Err(ToolError::invalid_name(raw, format!("{label} is empty")));
            }
            if !segment.chars().all(is_name_char) {
                return Err(ToolError::invalid_name(
                    raw,
                    format!("{label} must be lowercase alphanumeric, '_' or '-'"),
                ));
            }
        }

        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    /// Returns the namespace segment.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the name segment.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ToolName {
    type Error = ToolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ToolName> for String {
    fn from(value: ToolName) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let name = ToolName::parse("aws.ecs_plan").unwrap();
        assert_eq!(name.namespace(), "aws");
        assert_eq!(name.name(), "ecs_plan");
        assert_eq!(name.to_string(), "aws.ecs_plan");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in ["ecs_plan", ".plan", "aws.", "aws.ecs.plan", "AWS.plan", "aws.ecs plan", ""] {
            assert!(ToolName::parse(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_ordering_is_by_namespace_then_name() {
        let mut names: Vec<ToolName> = ["gcp.run", "aws.ecs_plan", "aws.ecs_apply"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        names.sort();
        let rendered: Vec<String> = names.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["aws.ecs_apply", "aws.ecs_plan", "gcp.run"]);
    }

    #[test]
    fn test_serde_as_string() {
        let name: ToolName = serde_json::from_str("\"aws.ecs_plan\"").unwrap();
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"aws.ecs_plan\"");
        assert!(serde_json::from_str::<ToolName>("\"nope\"").is_err());
    }
}
