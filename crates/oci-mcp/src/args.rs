//! Typed access to validated tool arguments.

use oci_mcp_tools::ToolError;
use serde_json::{Map, Value};

/// Arguments of one tool call, with declared defaults already filled in.
#[derive(Debug, Clone, Default)]
pub struct Args(Map<String, Value>);

impl Args {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn present(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// A required string.
    pub fn str(&self, name: &str) -> Result<&str, ToolError> {
        self.opt_str(name)?
            .ok_or_else(|| ToolError::MissingArgument(name.to_string()))
    }

    pub fn opt_str(&self, name: &str) -> Result<Option<&str>, ToolError> {
        match self.present(name) {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(text)),
            Some(other) => Err(invalid(name, "a string", other)),
        }
    }

    /// A boolean. Absent means `false`.
    pub fn flag(&self, name: &str) -> Result<bool, ToolError> {
        match self.present(name) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(invalid(name, "a boolean", other)),
        }
    }

    pub fn opt_f64(&self, name: &str) -> Result<Option<f64>, ToolError> {
        match self.present(name) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| invalid(name, "a number", value)),
        }
    }

    pub fn opt_u64(&self, name: &str) -> Result<Option<u64>, ToolError> {
        match self.present(name) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| invalid(name, "a non-negative integer", value)),
        }
    }

    /// A list of strings. Absent means empty.
    pub fn str_list(&self, name: &str) -> Result<Vec<String>, ToolError> {
        match self.present(name) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| invalid(name, "a list of strings", item))
                })
                .collect(),
            Some(other) => Err(invalid(name, "a list of strings", other)),
        }
    }
}

fn invalid(name: &str, expected: &str, got: &Value) -> ToolError {
    ToolError::InvalidArgument(format!("'{name}' must be {expected}, got {got}"))
}
