//! Screening of inbound lines before they reach the MCP service.
//!
//! The service ends its session on the first line it cannot decode, so
//! every line is checked here first. Lines that are not valid client
//! messages are answered with a JSON-RPC error instead of being passed on.

use rmcp::ErrorData;
use rmcp::model::{ClientJsonRpcMessage, ErrorCode};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

/// Methods this server answers itself.
const SERVED_METHODS: &[&str] = &["initialize", "ping", "tools/list", "tools/call"];

/// Outcome of screening one inbound line.
#[derive(Debug, Clone, PartialEq)]
pub enum Screened {
    /// A decodable client message, trimmed of its line ending.
    Forward(String),
    /// An error response to send back in place of the line.
    Reject(Value),
    /// Nothing to forward and nothing to answer.
    Skip,
}

/// Screens one raw line, with or without its trailing newline.
#[must_use]
pub fn screen_line(raw: &[u8]) -> Screened {
    let Ok(line) = std::str::from_utf8(raw) else {
        return reject(
            Value::Null,
            ErrorCode::PARSE_ERROR,
            "Parse error: message is not valid UTF-8",
        );
    };

    let line = line.trim();
    if line.is_empty() {
        return Screened::Skip;
    }

    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => return reject(Value::Null, ErrorCode::PARSE_ERROR, format!("Parse error: {e}")),
    };

    let Some(message) = value.as_object() else {
        return reject(
            Value::Null,
            ErrorCode::INVALID_REQUEST,
            "Invalid request: expected a single JSON object",
        );
    };

    if ClientJsonRpcMessage::deserialize(&value).is_ok() {
        return Screened::Forward(line.to_string());
    }

    answer_undecodable(message)
}

/// Chooses the error for an object the service cannot decode.
fn answer_undecodable(message: &Map<String, Value>) -> Screened {
    let id = match message.get("id") {
        None | Some(Value::Null) => {
            debug!("Dropping undecodable notification");
            return Screened::Skip;
        }
        Some(id @ (Value::Number(_) | Value::String(_))) => id.clone(),
        Some(_) => {
            return reject(
                Value::Null,
                ErrorCode::INVALID_REQUEST,
                "Invalid request: id must be a string or a number",
            );
        }
    };

    if message.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return reject(
            id,
            ErrorCode::INVALID_REQUEST,
            "Invalid request: jsonrpc must be \"2.0\"",
        );
    }

    match message.get("method").and_then(Value::as_str) {
        None => reject(id, ErrorCode::INVALID_REQUEST, "Invalid request: missing method"),
        Some(method) if SERVED_METHODS.contains(&method) => reject(
            id,
            ErrorCode::INVALID_PARAMS,
            format!("Invalid params for {method}"),
        ),
        Some(method) => reject(
            id,
            ErrorCode::METHOD_NOT_FOUND,
            format!("Method not found: {method}"),
        ),
    }
}

fn reject(id: Value, code: ErrorCode, message: impl Into<String>) -> Screened {
    let error = ErrorData::new(code, message.into(), None);
    Screened::Reject(json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": error,
    }))
}
