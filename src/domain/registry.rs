//! Schema registry and reference resolution

use serde_json::{Map, Value};
use std::collections::HashMap;

use super::path::SchemaPath;
use super::schema::{ObjectSchema, SchemaNode};
use crate::error::{SynthError, SynthResult};

/// Where the registry entries came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// `{ name: { properties } }` or `{ name: schema }`
    Raw,
    /// `components.schemas` of an OpenAPI document
    OpenApi,
}

/// Decoded schemas keyed by name
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, SchemaNode>,
    mode: SourceMode,
}

impl SchemaRegistry {
    /// Build from an OpenAPI document, reading `components.schemas`
    pub fn from_openapi(document: &Value) -> SynthResult<Self> {
        let schemas = document
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(|s| s.as_object())
            .ok_or_else(|| {
                SynthError::Configuration("OpenAPI document has no 'components.schemas' object".to_string())
            })?;

        let mut decoded = HashMap::with_capacity(schemas.len());
        for (name, schema) in schemas {
            let node = SchemaNode::from_value(schema, &SchemaPath::schema(name))?;
            decoded.insert(name.clone(), node);
        }

        tracing::debug!("Decoded {} OpenAPI component schemas", decoded.len());
        Ok(Self {
            schemas: decoded,
            mode: SourceMode::OpenApi,
        })
    }

    /// Build from a raw mapping of schema name to schema or bare properties map
    pub fn from_raw(mapping: &Value) -> SynthResult<Self> {
        let entries = mapping
            .as_object()
            .ok_or_else(|| SynthError::Configuration("Raw schema data must be a JSON object".to_string()))?;

        let mut decoded = HashMap::with_capacity(entries.len());
        for (name, entry) in entries {
            let node = decode_raw_entry(name, entry)?;
            decoded.insert(name.clone(), node);
        }

        tracing::debug!("Decoded {} raw schemas", decoded.len());
        Ok(Self {
            schemas: decoded,
            mode: SourceMode::Raw,
        })
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Schema names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Resolve a same-document `$ref` by the final segment of its pointer.
    ///
    /// `#/components/schemas/Pet`, `#/definitions/Pet` and `Pet` all resolve to
    /// the `Pet` entry. References into another file are rejected.
    pub fn resolve(&self, reference: &str) -> SynthResult<(&str, &SchemaNode)> {
        let pointer = match reference.split_once('#') {
            Some(("", fragment)) => fragment,
            Some(_) => return Err(SynthError::ExternalReference(reference.to_string())),
            None if is_document_path(reference) => {
                return Err(SynthError::ExternalReference(reference.to_string()))
            }
            None => reference,
        };

        let name = pointer
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .replace("~1", "/")
            .replace("~0", "~");

        match self.schemas.get_key_value(name.as_str()) {
            Some((key, node)) => {
                tracing::debug!("Resolved reference '{}' to schema '{}'", reference, key);
                Ok((key.as_str(), node))
            }
            None => Err(SynthError::ReferenceNotFound {
                reference: reference.to_string(),
                name,
            }),
        }
    }
}

fn is_document_path(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    lower.ends_with(".yaml") || lower.ends_with(".yml") || lower.ends_with(".json")
}

/// Raw entries are either a schema (typed, a `$ref`, or carrying a
/// `properties` mapping) or a bare properties map.
fn decode_raw_entry(name: &str, entry: &Value) -> SynthResult<SchemaNode> {
    let path = SchemaPath::schema(name);
    let obj = entry.as_object().ok_or_else(|| SynthError::InvalidSchema {
        path: path.to_string(),
        reason: "expected a schema or properties object".to_string(),
    })?;

    let is_typed = matches!(obj.get("type"), Some(Value::String(_)));
    let is_reference = matches!(obj.get("$ref"), Some(Value::String(_)));
    if is_typed || is_reference {
        return SchemaNode::from_value(entry, &path);
    }

    match obj.get("properties") {
        // A property literally named "properties" would carry its own string `type`
        Some(Value::Object(props)) if !is_property_schema(props) => {
            Ok(SchemaNode::Object(ObjectSchema::from_properties(props, &path)?))
        }
        _ => Ok(SchemaNode::Object(ObjectSchema::from_properties(obj, &path)?)),
    }
}

fn is_property_schema(candidate: &Map<String, Value>) -> bool {
    matches!(candidate.get("type"), Some(Value::String(_))) || matches!(candidate.get("$ref"), Some(Value::String(_)))
}
