//! Field descriptors: the abstract type shape of a synthesized instance
//!
//! A descriptor tree mirrors an object schema with one of six field kinds per
//! entry. It serializes to a compact JSON form and can check whether a JSON
//! value has the described shape.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldDescriptor {
    String,
    Boolean,
    Integer,
    Float,
    /// Homogeneous list; `items` describes every element
    List { items: Box<FieldDescriptor> },
    /// Nested object
    Nested { fields: DescriptorFields },
}

impl FieldDescriptor {
    pub fn list(items: FieldDescriptor) -> Self {
        FieldDescriptor::List { items: Box::new(items) }
    }

    pub fn nested(fields: DescriptorFields) -> Self {
        FieldDescriptor::Nested { fields }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldDescriptor::String => "string",
            FieldDescriptor::Boolean => "boolean",
            FieldDescriptor::Integer => "integer",
            FieldDescriptor::Float => "float",
            FieldDescriptor::List { .. } => "list",
            FieldDescriptor::Nested { .. } => "nested",
        }
    }

    fn check(&self, value: &Value, path: &str, violations: &mut Vec<DescriptorViolation>) {
        let matches_kind = match (self, value) {
            (FieldDescriptor::String, Value::String(_)) => true,
            (FieldDescriptor::Boolean, Value::Bool(_)) => true,
            (FieldDescriptor::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            // Whole numbers are acceptable floats
            (FieldDescriptor::Float, Value::Number(_)) => true,
            (FieldDescriptor::List { items }, Value::Array(elements)) => {
                for (idx, element) in elements.iter().enumerate() {
                    items.check(element, &format!("{}[{}]", path, idx), violations);
                }
                true
            }
            (FieldDescriptor::Nested { fields }, Value::Object(_)) => {
                fields.check(value, path, violations);
                true
            }
            _ => false,
        };

        if !matches_kind {
            violations.push(DescriptorViolation::WrongKind {
                path: path.to_string(),
                expected: self.kind(),
                found: value_kind(value),
            });
        }
    }
}

/// Ordered mapping of field name to descriptor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorFields(Vec<(String, FieldDescriptor)>);

impl DescriptorFields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, descriptor: FieldDescriptor) {
        self.0.push((name.into(), descriptor));
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.0.iter().map(|(n, d)| (n.as_str(), d))
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that `value` is an object with every described field in the
    /// described kind. Extra keys are allowed. All violations are collected.
    pub fn validate(&self, value: &Value) -> Result<(), Vec<DescriptorViolation>> {
        let mut violations = Vec::new();
        if value.is_object() {
            self.check(value, "", &mut violations);
        } else {
            violations.push(DescriptorViolation::WrongKind {
                path: "<root>".to_string(),
                expected: "nested",
                found: value_kind(value),
            });
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn check(&self, value: &Value, path: &str, violations: &mut Vec<DescriptorViolation>) {
        for (name, descriptor) in &self.0 {
            let field_path = if path.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", path, name)
            };
            match value.get(name) {
                Some(field_value) => descriptor.check(field_value, &field_path, violations),
                None => violations.push(DescriptorViolation::MissingField(field_path)),
            }
        }
    }
}

impl Serialize for DescriptorFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, descriptor) in &self.0 {
            map.serialize_entry(name, descriptor)?;
        }
        map.end()
    }
}

impl FromIterator<(String, FieldDescriptor)> for DescriptorFields {
    fn from_iter<I: IntoIterator<Item = (String, FieldDescriptor)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum DescriptorViolation {
    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid value for {path}: expected {expected}, found {found}")]
    WrongKind {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "nested",
    }
}
