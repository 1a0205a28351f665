//! Per-call diagnostic sink.
//!
//! Messages emitted while a tool runs are sent to the client as
//! `notifications/message` on the same channel as the response, so on stdio
//! and SSE they arrive before it. Levels below the session minimum are
//! dropped.

use crate::protocol::{LogLevel, log_notification};
use serde_json::Value;
use tokio::sync::mpsc;

const LOGGER: &str = "oci-mcp";

/// Channel carrying outbound JSON-RPC messages for one session.
pub type Outbound = mpsc::UnboundedSender<Value>;

#[derive(Debug, Clone)]
pub struct Notifier {
    outbound: Option<Outbound>,
    min_level: LogLevel,
}

impl Notifier {
    pub fn new(outbound: Outbound, min_level: LogLevel) -> Self {
        Self {
            outbound: Some(outbound),
            min_level,
        }
    }

    /// A sink that drops everything. Used where the transport has no way to
    /// deliver notifications (synchronous `POST /mcp`).
    pub fn silent() -> Self {
        Self {
            outbound: None,
            min_level: LogLevel::Emergency,
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.min_level {
            return;
        }
        if let Some(outbound) = &self.outbound {
            // The session may already be gone; notifications are advisory.
            let _ = outbound.send(log_notification(level, LOGGER, message));
        }
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}
