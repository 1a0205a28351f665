//! # oci-mcp
//!
//! MCP (Model Context Protocol) server exposing Oracle Cloud Infrastructure
//! operations as tools for AI agents.
//!
//! ## Architecture
//!
//! ```text
//! AI Agent
//!       │
//!       │ MCP protocol (stdio or HTTP/SSE)
//!       ▼
//! ┌──────────────────────┐
//! │  McpServer           │
//! │  1. Look up tool     │  ← ToolRegistry (catalog)
//! │  2. Snapshot clients │  ← ProfileSession
//! │  3. Validate args    │  ← jsonschema
//! │  4. Call proxy fn    │  ← oci-mcp-tools
//! │  5. Classify outcome │  ← OutcomeClassifier
//! └──────────┬───────────┘
//!            │
//!            ▼
//!      OCI REST APIs
//! ```
//!
//! ## Outcomes
//!
//! Every tool call yields one of three shapes, and faults never escape the
//! classifier:
//!
//! | Shape | Recognised by | Example |
//! |-------|---------------|---------|
//! | Plain data | no reserved key | `{"id": "...", "lifecycle_state": "RUNNING"}` |
//! | Business outcome | `success` key | `{"success": false, "message": "...", "current_state": "PROVISIONING"}` |
//! | Error outcome | `error` key | `{"error": "Error starting instance: ..."}`, or `[{...}]` for list tools |

pub mod args;
pub mod catalog;
pub mod context;
pub mod error;
pub mod http_transport;
pub mod outcome;
pub mod protocol;
pub mod server;
pub mod session;
pub mod tools;

pub use args::Args;
pub use context::Notifier;
pub use error::McpError;
pub use outcome::{OutcomeClassifier, OutcomeKind, ResultShape, Templates};
pub use protocol::{
    CallToolParams, CallToolResponse, JsonRpcRequest, JsonRpcResponse, LogLevel, ToolAnnotations,
    ToolContent, ToolDefinition,
};
pub use server::{McpServer, Session};
pub use session::ProfileSession;
pub use tools::{Param, ToolEnv, ToolRegistry, ToolSpec};
