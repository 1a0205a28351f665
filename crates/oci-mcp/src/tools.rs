//! Tool registry for MCP tools.
//!
//! A [`ToolSpec`] couples a name, a parameter list and a handler. The
//! parameter list produces the JSON schema advertised in `tools/list` and
//! used to validate arguments before the handler runs. Every call goes
//! through the [`OutcomeClassifier`], so [`ToolSpec::invoke`] always returns
//! an outcome value.

use crate::args::Args;
use crate::context::Notifier;
use crate::error::McpError;
use crate::outcome::{OutcomeClassifier, ResultShape, Templates};
use crate::protocol::{ToolAnnotations, ToolDefinition};
use crate::session::ProfileSession;
use futures::future::BoxFuture;
use jsonschema::Validator;
use oci_mcp_client::ClientTable;
use oci_mcp_tools::{PollPolicy, ToolError};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;

/// Shape every OCID argument must have. Path separators and query
/// delimiters are excluded so an identifier always names one path segment.
pub const OCID_PATTERN: &str = r"^ocid1\.[^/?#\s]+$";

pub type ToolFuture<'a> = BoxFuture<'a, Result<Value, ToolError>>;

type Handler = Arc<dyn for<'a> Fn(&'a ToolEnv, &'a Args) -> ToolFuture<'a> + Send + Sync>;

/// Everything a handler can reach during one call.
#[derive(Debug, Clone)]
pub struct ToolEnv {
    clients: Option<Arc<ClientTable>>,
    pub profiles: Arc<ProfileSession>,
    pub poll: PollPolicy,
}

impl ToolEnv {
    pub fn new(
        clients: Option<Arc<ClientTable>>,
        profiles: Arc<ProfileSession>,
        poll: PollPolicy,
    ) -> Self {
        Self {
            clients,
            profiles,
            poll,
        }
    }

    /// The client table captured when the call started.
    pub fn clients(&self) -> Result<&ClientTable, ToolError> {
        self.clients.as_deref().ok_or(ToolError::NoActiveProfile)
    }
}

/// JSON type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Ocid,
    Boolean,
    Integer,
    Number,
    StringList,
}

impl ParamType {
    fn schema(self) -> Value {
        match self {
            Self::String => json!({"type": "string"}),
            Self::Ocid => json!({"type": "string", "pattern": OCID_PATTERN}),
            Self::Boolean => json!({"type": "boolean"}),
            Self::Integer => json!({"type": "integer", "minimum": 0}),
            Self::Number => json!({"type": "number"}),
            Self::StringList => json!({"type": "array", "items": {"type": "string"}}),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamType,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<Value>,
}

impl Param {
    fn new(name: &'static str, kind: ParamType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: true,
            default: None,
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::String, description)
    }

    /// A resource identifier, rejected unless it looks like an OCID.
    pub fn ocid(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Ocid, description)
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Boolean, description)
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Integer, description)
    }

    pub fn number(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Number, description)
    }

    pub fn string_list(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::StringList, description)
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Optional, filled with `value` when the caller leaves it out.
    pub fn default(mut self, value: Value) -> Self {
        self.required = false;
        self.default = Some(value);
        self
    }

    fn schema(&self) -> Value {
        let mut schema = self.kind.schema();
        // Optional parameters without a default also accept an explicit null.
        if !self.required && self.default.is_none() {
            let kind = schema["type"].clone();
            schema["type"] = json!([kind, "null"]);
        }
        schema["description"] = json!(self.description);
        if let Some(default) = &self.default {
            schema["default"] = default.clone();
        }
        schema
    }
}

/// Builder for a [`ToolSpec`]; finished by [`ToolBuilder::run`].
pub struct ToolBuilder {
    name: &'static str,
    description: &'static str,
    params: Vec<Param>,
    shape: ResultShape,
    templates: Templates,
    needs_clients: bool,
    destructive: bool,
}

impl ToolBuilder {
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn start(mut self, template: &'static str) -> Self {
        self.templates.start = Some(template);
        self
    }

    pub fn success(mut self, template: &'static str) -> Self {
        self.templates.success = Some(template);
        self
    }

    pub fn error(mut self, prefix: &'static str) -> Self {
        self.templates.error_prefix = Some(prefix);
        self
    }

    /// The tool works without an active profile.
    pub fn without_clients(mut self) -> Self {
        self.needs_clients = false;
        self
    }

    /// The tool changes remote state.
    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }

    pub fn run<F>(self, handler: F) -> ToolSpec
    where
        F: for<'a> Fn(&'a ToolEnv, &'a Args) -> ToolFuture<'a> + Send + Sync + 'static,
    {
        ToolSpec {
            name: self.name,
            description: self.description,
            params: self.params,
            shape: self.shape,
            templates: self.templates,
            needs_clients: self.needs_clients,
            destructive: self.destructive,
            handler: Arc::new(handler),
        }
    }
}

/// One registered tool.
#[derive(Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<Param>,
    pub shape: ResultShape,
    pub templates: Templates,
    pub needs_clients: bool,
    pub destructive: bool,
    handler: Handler,
}

impl std::fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSpec")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("needs_clients", &self.needs_clients)
            .finish_non_exhaustive()
    }
}

impl ToolSpec {
    /// A tool returning one record.
    pub fn scalar(name: &'static str, description: &'static str) -> ToolBuilder {
        Self::builder(name, description, ResultShape::Scalar)
    }

    /// A tool returning a list of records.
    pub fn list(name: &'static str, description: &'static str) -> ToolBuilder {
        Self::builder(name, description, ResultShape::List)
    }

    fn builder(name: &'static str, description: &'static str, shape: ResultShape) -> ToolBuilder {
        ToolBuilder {
            name,
            description,
            params: Vec::new(),
            shape,
            templates: Templates::default(),
            needs_clients: true,
            destructive: false,
        }
    }

    /// JSON schema of the arguments object.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            input_schema: self.input_schema(),
            annotations: Some(ToolAnnotations {
                read_only_hint: Some(!self.destructive && self.needs_clients),
                destructive_hint: self.destructive.then_some(true),
            }),
        }
    }

    /// Supplied arguments with declared defaults filled in.
    fn with_defaults(&self, arguments: &Value) -> Map<String, Value> {
        let mut map = arguments.as_object().cloned().unwrap_or_default();
        for param in &self.params {
            if let Some(default) = &param.default {
                let absent = map.get(param.name).is_none_or(Value::is_null);
                if absent {
                    map.insert(param.name.to_string(), default.clone());
                }
            }
        }
        map
    }

    /// Validate, run and classify one call.
    pub async fn invoke(
        &self,
        validator: &Validator,
        env: &ToolEnv,
        arguments: Value,
        notifier: &Notifier,
    ) -> Value {
        let args = Args::new(self.with_defaults(&arguments));
        let classifier = OutcomeClassifier::new(&self.templates, self.shape);

        tracing::debug!(tool = self.name, "Calling tool");
        classifier
            .run(self.name, args.as_map(), notifier, async {
                check_arguments(validator, &arguments)?;
                if self.needs_clients {
                    env.clients()?;
                }
                (self.handler)(env, &args).await
            })
            .await
    }
}

fn check_arguments(validator: &Validator, arguments: &Value) -> Result<(), ToolError> {
    let empty = json!({});
    let instance = if arguments.is_null() { &empty } else { arguments };

    let problems: Vec<String> = validator
        .iter_errors(instance)
        .map(|error| {
            let path = error.instance_path().to_string();
            if path.is_empty() {
                error.to_string()
            } else {
                format!("{path}: {error}")
            }
        })
        .collect();

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ToolError::InvalidArgument(problems.join("; ")))
    }
}

struct Registered {
    spec: ToolSpec,
    validator: Validator,
}

/// Registry of available MCP tools, in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Registered>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, compiling its argument schema.
    pub fn register(&mut self, spec: ToolSpec) -> Result<(), McpError> {
        if self.index.contains_key(spec.name) {
            return Err(McpError::InvalidTool {
                tool: spec.name.to_string(),
                reason: "registered twice".to_string(),
            });
        }
        let validator =
            jsonschema::validator_for(&spec.input_schema()).map_err(|e| McpError::InvalidTool {
                tool: spec.name.to_string(),
                reason: e.to_string(),
            })?;

        self.index.insert(spec.name, self.tools.len());
        self.tools.push(Registered { spec, validator });
        Ok(())
    }

    pub fn register_all(&mut self, specs: impl IntoIterator<Item = ToolSpec>) -> Result<(), McpError> {
        specs.into_iter().try_for_each(|spec| self.register(spec))
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.index.get(name).map(|&i| &self.tools[i].spec)
    }

    /// Check if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Definitions for `tools/list`.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.spec.definition()).collect()
    }

    /// Run a tool by name. `None` when no such tool exists.
    pub async fn call(
        &self,
        name: &str,
        env: &ToolEnv,
        arguments: Value,
        notifier: &Notifier,
    ) -> Option<Value> {
        let registered = &self.tools[*self.index.get(name)?];
        Some(
            registered
                .spec
                .invoke(&registered.validator, env, arguments, notifier)
                .await,
        )
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.spec.name).collect()
    }
}
