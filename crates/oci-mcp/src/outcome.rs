//! Outcome classification for tool calls.
//!
//! Every tool call ends in exactly one of three shapes:
//!
//! | Shape            | Recognised by             | Returned as                   |
//! |------------------|---------------------------|-------------------------------|
//! | Error outcome    | the operation failed      | `{"error": ..}` or `[{..}]`   |
//! | Business outcome | object with `success` key | unchanged                     |
//! | Plain data       | anything else             | unchanged                     |
//!
//! Faults never escape [`OutcomeClassifier::run`]. Diagnostic messages are
//! emitted through the call's [`Notifier`] and never change the outcome.

use crate::context::Notifier;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use std::future::Future;

const DEFAULT_ERROR_PREFIX: &str = "Error";
const DEFAULT_SUCCESS_MESSAGE: &str = "Operation completed successfully";
const DEFAULT_FAILURE_MESSAGE: &str = "Operation could not be completed";

/// Declared result shape of a tool. Decides how an error outcome is wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultShape {
    #[default]
    Scalar,
    List,
}

/// Message templates of one tool.
///
/// Templates use `{name}` placeholders filled from the call arguments.
/// Success templates may also use `{result}` and, for list results,
/// `{count}`. `{{` and `}}` are literal braces.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    pub start: Option<&'static str>,
    pub success: Option<&'static str>,
    pub error_prefix: Option<&'static str>,
}

impl Templates {
    pub fn error_prefix(&self) -> &'static str {
        self.error_prefix.unwrap_or(DEFAULT_ERROR_PREFIX)
    }
}

/// Which of the three outcome shapes a value has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Error,
    Business,
    Data,
}

impl OutcomeKind {
    /// Classify a returned value by key presence alone.
    pub fn of(value: &Value) -> Self {
        let first = match value {
            Value::Array(items) if items.len() == 1 => &items[0],
            other => other,
        };
        match first.as_object() {
            Some(map) if map.contains_key("error") && map.len() == 1 => Self::Error,
            _ => match value.as_object() {
                Some(map) if map.contains_key("success") => Self::Business,
                _ => Self::Data,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OutcomeClassifier<'a> {
    templates: &'a Templates,
    shape: ResultShape,
}

impl<'a> OutcomeClassifier<'a> {
    pub fn new(templates: &'a Templates, shape: ResultShape) -> Self {
        Self { templates, shape }
    }

    /// Emit the start message, await the operation and classify its result.
    pub async fn run<Fut, E>(
        &self,
        tool: &str,
        args: &Map<String, Value>,
        notifier: &Notifier,
        operation: Fut,
    ) -> Value
    where
        Fut: Future<Output = Result<Value, E>>,
        E: StdError,
    {
        if let Some(start) = self.templates.start {
            notifier.info(&render_or_raw(start, args, None));
        }
        let result = operation.await;
        self.classify(tool, args, notifier, result)
    }

    pub fn classify<E: StdError>(
        &self,
        tool: &str,
        args: &Map<String, Value>,
        notifier: &Notifier,
        result: Result<Value, E>,
    ) -> Value {
        match result {
            Err(err) => self.error_outcome(tool, &err, notifier),
            Ok(value) => {
                if let Some(map) = value.as_object().filter(|m| m.contains_key("success")) {
                    report_business(tool, map, notifier);
                } else if let Some(success) = self.templates.success {
                    notifier.info(&render_or_raw(success, args, Some(&value)));
                }
                value
            }
        }
    }

    fn error_outcome(&self, tool: &str, err: &dyn StdError, notifier: &Notifier) -> Value {
        let prefix = self.templates.error_prefix();
        let message = format!("{prefix}: {err}");
        notifier.error(&message);
        tracing::error!(tool, error = %error_chain(err), "{prefix}");

        let outcome = json!({ "error": message });
        match self.shape {
            ResultShape::Scalar => outcome,
            ResultShape::List => Value::Array(vec![outcome]),
        }
    }
}

fn report_business(tool: &str, map: &Map<String, Value>, notifier: &Notifier) {
    let succeeded = map.get("success").is_some_and(truthy);
    let message = match map.get("message") {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None if succeeded => DEFAULT_SUCCESS_MESSAGE.to_string(),
        None => DEFAULT_FAILURE_MESSAGE.to_string(),
    };

    if succeeded {
        notifier.info(&message);
    } else {
        tracing::info!(tool, "Business state: {message}");
        notifier.info(&format!("Business state: {message}"));
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// `outer: inner: root` rendering of an error and its sources.
fn error_chain(err: &dyn StdError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !chain.ends_with(&text) {
            chain.push_str(": ");
            chain.push_str(&text);
        }
        source = cause.source();
    }
    chain
}

/// Fill a template, or return it unchanged when any placeholder can't be
/// resolved.
pub fn render_or_raw(template: &str, args: &Map<String, Value>, result: Option<&Value>) -> String {
    render(template, args, result).unwrap_or_else(|| template.to_string())
}

/// Fill a template. `None` when a placeholder is unknown or the braces are
/// unbalanced.
pub fn render(template: &str, args: &Map<String, Value>, result: Option<&Value>) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => return None,
                    }
                }
                out.push_str(&placeholder(&name, args, result)?);
            }
            '}' => return None,
            other => out.push(other),
        }
    }
    Some(out)
}

fn placeholder(name: &str, args: &Map<String, Value>, result: Option<&Value>) -> Option<String> {
    let value = match (name, result) {
        ("result", Some(value)) => value,
        ("count", Some(Value::Array(items))) => return Some(items.len().to_string()),
        _ => args.get(name)?,
    };
    Some(match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::LogLevel;
    use tokio::sync::mpsc;

    #[derive(Debug, thiserror::Error)]
    #[error("NotAuthorizedOrNotFound (404): Authorization failed")]
    struct Denied;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn listening() -> (Notifier, mpsc::UnboundedReceiver<Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Notifier::new(tx, LogLevel::Debug), rx)
    }

    fn messages(rx: &mut mpsc::UnboundedReceiver<Value>) -> Vec<(String, String)> {
        let mut out = Vec::new();
        while let Ok(sent) = rx.try_recv() {
            out.push((
                sent["params"]["level"].as_str().unwrap_or_default().to_string(),
                sent["params"]["data"].as_str().unwrap_or_default().to_string(),
            ));
        }
        out
    }

    fn listing() -> Templates {
        Templates {
            start: Some("Listing instances in compartment {compartment_id}..."),
            success: Some("Found {count} instances"),
            error_prefix: Some("Error listing instances"),
        }
    }

    #[test]
    fn test_render_placeholders_and_escapes() {
        let a = args(json!({"id": "ocid1.x", "n": 3}));
        assert_eq!(render("{id} has {n} {{items}}", &a, None).unwrap(), "ocid1.x has 3 {items}");
        assert_eq!(render("{missing}", &a, None), None);
        assert_eq!(render("{unclosed", &a, None), None);
        assert_eq!(render("stray }", &a, None), None);
        assert_eq!(render("{}", &a, None), None);
        assert_eq!(render_or_raw("Getting {missing}", &a, None), "Getting {missing}");
    }

    #[test]
    fn test_render_result_placeholders() {
        let a = args(json!({}));
        let list = json!([1, 2, 3]);
        assert_eq!(render("Found {count}", &a, Some(&list)).unwrap(), "Found 3");
        assert_eq!(render("Got {result}", &a, Some(&json!("text"))).unwrap(), "Got text");
        assert_eq!(render("Found {count}", &a, Some(&json!({"a": 1}))), None);
    }

    #[tokio::test]
    async fn test_list_fault_becomes_one_element_list() {
        let templates = listing();
        let classifier = OutcomeClassifier::new(&templates, ResultShape::List);
        let (notifier, mut rx) = listening();

        let outcome = classifier
            .run(
                "list_instances",
                &args(json!({"compartment_id": "c1"})),
                &notifier,
                async { Err::<Value, _>(Denied) },
            )
            .await;

        assert_eq!(
            outcome,
            json!([{"error": "Error listing instances: NotAuthorizedOrNotFound (404): Authorization failed"}])
        );
        assert_eq!(OutcomeKind::of(&outcome), OutcomeKind::Error);
        assert_eq!(
            messages(&mut rx),
            vec![
                ("info".to_string(), "Listing instances in compartment c1...".to_string()),
                (
                    "error".to_string(),
                    "Error listing instances: NotAuthorizedOrNotFound (404): Authorization failed"
                        .to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_scalar_fault_becomes_mapping() {
        let templates = Templates::default();
        let classifier = OutcomeClassifier::new(&templates, ResultShape::Scalar);
        let outcome = classifier.classify("get_x", &Map::new(), &Notifier::silent(), Err::<Value, _>(Denied));
        let text = outcome["error"].as_str().unwrap();
        assert!(text.starts_with("Error: "));
        assert!(text.contains("Authorization failed"));
    }

    #[test]
    fn test_business_outcome_passes_through_unchanged() {
        let templates = listing();
        let classifier = OutcomeClassifier::new(&templates, ResultShape::Scalar);
        let (notifier, mut rx) = listening();
        let record = json!({
            "success": false,
            "message": "Cannot start instance from state PROVISIONING",
            "current_state": "PROVISIONING"
        });

        let outcome = classifier.classify("start_instance", &Map::new(), &notifier, Ok::<_, Denied>(record.clone()));

        assert_eq!(outcome, record);
        assert_eq!(OutcomeKind::of(&outcome), OutcomeKind::Business);
        // The success template is not used for business outcomes.
        assert_eq!(
            messages(&mut rx),
            vec![(
                "info".to_string(),
                "Business state: Cannot start instance from state PROVISIONING".to_string()
            )]
        );
    }

    #[test]
    fn test_business_outcome_default_messages() {
        let templates = Templates::default();
        let classifier = OutcomeClassifier::new(&templates, ResultShape::Scalar);
        let (notifier, mut rx) = listening();

        classifier.classify("t", &Map::new(), &notifier, Ok::<_, Denied>(json!({"success": true})));
        classifier.classify("t", &Map::new(), &notifier, Ok::<_, Denied>(json!({"success": null})));

        let sent: Vec<String> = messages(&mut rx).into_iter().map(|(_, m)| m).collect();
        assert_eq!(
            sent,
            vec![
                "Operation completed successfully".to_string(),
                "Business state: Operation could not be completed".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_unresolvable_start_template_still_runs() {
        let templates = Templates {
            start: Some("Getting details for instance {instance_id}..."),
            ..Templates::default()
        };
        let classifier = OutcomeClassifier::new(&templates, ResultShape::Scalar);
        let (notifier, mut rx) = listening();

        let outcome = classifier
            .run("get_instance", &Map::new(), &notifier, async {
                Ok::<_, Denied>(json!({"id": "i1"}))
            })
            .await;

        assert_eq!(outcome, json!({"id": "i1"}));
        assert_eq!(
            messages(&mut rx),
            vec![("info".to_string(), "Getting details for instance {instance_id}...".to_string())]
        );
    }

    #[test]
    fn test_plain_data_success_template() {
        let templates = listing();
        let classifier = OutcomeClassifier::new(&templates, ResultShape::List);
        let (notifier, mut rx) = listening();

        let data = json!([{"id": "a"}, {"id": "b"}]);
        let outcome = classifier.classify("list_instances", &Map::new(), &notifier, Ok::<_, Denied>(data.clone()));

        assert_eq!(outcome, data);
        assert_eq!(OutcomeKind::of(&outcome), OutcomeKind::Data);
        assert_eq!(messages(&mut rx)[0].1, "Found 2 instances");
    }

    #[test]
    fn test_error_chain_skips_repeated_text() {
        #[derive(Debug, thiserror::Error)]
        #[error("outer")]
        struct Outer(#[source] Denied);

        let chain = error_chain(&Outer(Denied));
        assert_eq!(chain, "outer: NotAuthorizedOrNotFound (404): Authorization failed");
    }
}
