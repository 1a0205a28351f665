//! Declarative mapping from OCI API objects to flat resource records.
//!
//! Every resource kind is described by a static table of [`Field`]s. A field
//! names the output key and where its value comes from in the camelCase API
//! object. Absent values become `null`.
//!
//! ```ignore
//! const VCN: &[Field] = &[
//!     path("id", "id"),
//!     path("name", "displayName"),
//!     equals("is_available", "lifecycleState", "AVAILABLE"),
//! ];
//! let record = project(&api_object, VCN);
//! ```

use serde_json::{Map, Value};

/// Where a record field takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Dotted path into the API object. Nested objects keep their shape with
    /// keys converted to snake_case.
    Path(&'static str),
    /// Copied as-is. Used for user-keyed maps such as tags and metadata.
    Verbatim(&'static str),
    /// Map of user-chosen names to API objects. Names are kept, the objects
    /// get snake_case keys.
    NamedMap(&'static str),
    /// Number of elements of an array (0 when absent).
    Count(&'static str),
    /// Whether the value at the path equals a string.
    Equals(&'static str, &'static str),
}

/// One output field of a resource record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub source: Source,
}

pub const fn path(name: &'static str, path: &'static str) -> Field {
    Field {
        name,
        source: Source::Path(path),
    }
}

pub const fn verbatim(name: &'static str, path: &'static str) -> Field {
    Field {
        name,
        source: Source::Verbatim(path),
    }
}

pub const fn named_map(name: &'static str, path: &'static str) -> Field {
    Field {
        name,
        source: Source::NamedMap(path),
    }
}

pub const fn count(name: &'static str, path: &'static str) -> Field {
    Field {
        name,
        source: Source::Count(path),
    }
}

pub const fn equals(name: &'static str, path: &'static str, expected: &'static str) -> Field {
    Field {
        name,
        source: Source::Equals(path, expected),
    }
}

/// Look up a dotted path.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.get(segment))
}

/// String at a dotted path, if it is one.
pub fn lookup_str<'a>(value: &'a Value, path: &str) -> Option<&'a str> {
    lookup(value, path).and_then(Value::as_str)
}

/// Build the record for one API object.
pub fn project(value: &Value, fields: &[Field]) -> Value {
    let mut record = Map::with_capacity(fields.len());
    for field in fields {
        record.insert(field.name.to_string(), resolve(value, field.source));
    }
    Value::Object(record)
}

/// Build records for a list of API objects.
pub fn project_all(values: &[Value], fields: &[Field]) -> Value {
    Value::Array(values.iter().map(|v| project(v, fields)).collect())
}

fn resolve(value: &Value, source: Source) -> Value {
    match source {
        Source::Path(p) => lookup(value, p).map(snake_keys).unwrap_or(Value::Null),
        Source::Verbatim(p) => lookup(value, p).cloned().unwrap_or(Value::Null),
        Source::NamedMap(p) => match lookup(value, p) {
            Some(Value::Object(map)) => Value::Object(
                map.iter()
                    .map(|(name, entry)| (name.clone(), snake_keys(entry)))
                    .collect(),
            ),
            Some(other) => snake_keys(other),
            None => Value::Null,
        },
        Source::Count(p) => Value::from(
            lookup(value, p)
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
        ),
        Source::Equals(p, expected) => Value::Bool(lookup_str(value, p) == Some(expected)),
    }
}

/// Recursively convert object keys to snake_case.
pub fn snake_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (snake_case(k), snake_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(snake_keys).collect()),
        other => other.clone(),
    }
}

/// `displayName` → `display_name`, `sizeInGBs` → `size_in_g_bs`.
///
/// An underscore goes before an uppercase letter that follows a lowercase
/// letter or digit, or that starts a new word after an acronym (`VCNId` →
/// `vcn_id`).
pub fn snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const INSTANCE: &[Field] = &[
        path("id", "id"),
        path("name", "displayName"),
        path("ocpu_count", "shapeConfig.ocpus"),
        verbatim("metadata", "metadata"),
        equals("is_running", "lifecycleState", "RUNNING"),
        count("rule_count", "ingressSecurityRules"),
        path("missing", "doesNotExist"),
    ];

    #[test]
    fn test_project_maps_fields() {
        let api = json!({
            "id": "ocid1.instance",
            "displayName": "web-1",
            "lifecycleState": "RUNNING",
            "shapeConfig": {"ocpus": 2.0},
            "metadata": {"ssh_authorized_keys": "ssh-rsa AAA", "myKey": "v"},
            "ingressSecurityRules": [{}, {}],
        });

        let record = project(&api, INSTANCE);
        assert_eq!(
            record,
            json!({
                "id": "ocid1.instance",
                "name": "web-1",
                "ocpu_count": 2.0,
                "metadata": {"ssh_authorized_keys": "ssh-rsa AAA", "myKey": "v"},
                "is_running": true,
                "rule_count": 2,
                "missing": null,
            })
        );
    }

    #[test]
    fn test_project_empty_object() {
        let record = project(&json!({}), INSTANCE);
        assert_eq!(record["is_running"], false);
        assert_eq!(record["rule_count"], 0);
        assert!(record["id"].is_null());
    }

    #[test]
    fn test_named_map_keeps_names() {
        let api = json!({"backendSets": {"myBackendSet": {"healthChecker": {"urlPath": "/"}}}});
        let record = project(&api, &[named_map("backend_sets", "backendSets")]);
        assert_eq!(
            record,
            json!({"backend_sets": {"myBackendSet": {"health_checker": {"url_path": "/"}}}})
        );
    }

    #[test]
    fn test_nested_paths_are_snake_cased() {
        let api = json!({"sourceDetails": {"imageId": "img", "bootVolumeSizeInGBs": 50}});
        let record = project(&api, &[path("source_details", "sourceDetails")]);
        assert_eq!(
            record["source_details"],
            json!({"image_id": "img", "boot_volume_size_in_g_bs": 50})
        );
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("displayName"), "display_name");
        assert_eq!(snake_case("id"), "id");
        assert_eq!(snake_case("sizeInGBs"), "size_in_g_bs");
        assert_eq!(snake_case("VCNId"), "vcn_id");
        assert_eq!(snake_case("ipv6CidrBlocks"), "ipv6_cidr_blocks");
        assert_eq!(snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_lookup() {
        let value = json!({"a": {"b": {"c": "x"}}});
        assert_eq!(lookup_str(&value, "a.b.c"), Some("x"));
        assert!(lookup(&value, "a.z").is_none());
    }
}
