//! MCP server module.
//!
//! This module serves the tool registry to MCP clients over stdin/stdout.
//! Inbound lines are screened before the protocol service decodes them, so
//! malformed input gets a JSON-RPC error instead of ending the session.
//! Logs must go to stderr while it runs.

mod gate;
mod handler;
mod stdio;

pub use gate::{Screened, screen_line};
pub use handler::{ToolServer, server_info};
pub use stdio::{ServeStats, serve, serve_stdio};
