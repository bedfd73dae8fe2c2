//! Typed schema nodes
//!
//! A JSON Schema / OpenAPI schema object is decoded once into a [`SchemaNode`]
//! tree: one variant per declared `type`, plus a reference variant for bare
//! `$ref` nodes and an `Unsupported` variant for anything the synthesizer
//! cannot produce. Generation then dispatches on the variant instead of on
//! string keys.

use serde_json::{Map, Value};

use super::path::SchemaPath;
use crate::error::{SynthError, SynthResult};

// ============================================================================
// Node Types
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    String(StringSchema),
    Integer(IntegerSchema),
    Number(NumberSchema),
    Boolean,
    Array(ArraySchema),
    Object(ObjectSchema),
    /// Bare `$ref` with no `type`
    Reference(String),
    /// Unknown `type` value, or a node with neither `type` nor `$ref`
    Unsupported { type_name: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    pub enum_values: Option<Vec<Value>>,
    pub pattern: Option<String>,
    pub format: Option<StringFormat>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringFormat {
    DateTime,
    Date,
    Other(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegerSchema {
    pub enum_values: Option<Vec<Value>>,
    pub format: Option<IntegerFormat>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub multiple_of: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegerFormat {
    Int32,
    Int64,
    Other(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSchema {
    pub enum_values: Option<Vec<Value>>,
    pub format: Option<NumberFormat>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberFormat {
    Float,
    Double,
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub items: Box<SchemaNode>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

/// Object schema; properties keep the document's insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub properties: Vec<(String, SchemaNode)>,
}

impl ObjectSchema {
    /// Decode a bare `properties` mapping (name -> schema)
    pub fn from_properties(props: &Map<String, Value>, path: &SchemaPath) -> SynthResult<Self> {
        let mut properties = Vec::with_capacity(props.len());
        for (name, prop_schema) in props {
            let node = SchemaNode::from_value(prop_schema, &path.push_property(name))?;
            properties.push((name.clone(), node));
        }
        Ok(Self { properties })
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(name, _)| name.as_str())
    }
}

// ============================================================================
// Decoding
// ============================================================================

impl SchemaNode {
    /// Decode a schema object. `path` is only used for error messages.
    pub fn from_value(schema: &Value, path: &SchemaPath) -> SynthResult<Self> {
        let obj = schema.as_object().ok_or_else(|| invalid(path, "expected a schema object"))?;

        // `type` wins over `$ref` when both are present
        let type_str = match obj.get("type") {
            Some(Value::String(t)) => t.as_str(),
            Some(other) => {
                return Ok(SchemaNode::Unsupported {
                    type_name: other.to_string(),
                })
            }
            None => {
                return Ok(match obj.get("$ref").and_then(|v| v.as_str()) {
                    Some(reference) => SchemaNode::Reference(reference.to_string()),
                    None => SchemaNode::Unsupported {
                        type_name: "<untyped>".to_string(),
                    },
                });
            }
        };

        let node = match type_str {
            "string" => SchemaNode::String(StringSchema {
                enum_values: read_enum(obj, path)?,
                pattern: read_str(obj, "pattern", path)?,
                format: read_str(obj, "format", path)?.map(|f| match f.as_str() {
                    "date-time" => StringFormat::DateTime,
                    "date" => StringFormat::Date,
                    _ => StringFormat::Other(f),
                }),
                min_length: read_usize(obj, "minLength", path)?,
                max_length: read_usize(obj, "maxLength", path)?,
            }),
            "integer" => SchemaNode::Integer(IntegerSchema {
                enum_values: read_enum(obj, path)?,
                format: read_str(obj, "format", path)?.map(|f| match f.as_str() {
                    "int32" => IntegerFormat::Int32,
                    "int64" => IntegerFormat::Int64,
                    _ => IntegerFormat::Other(f),
                }),
                minimum: read_f64(obj, "minimum", path)?,
                maximum: read_f64(obj, "maximum", path)?,
                multiple_of: read_integer_multiple(obj, path)?,
            }),
            "number" => SchemaNode::Number(NumberSchema {
                enum_values: read_enum(obj, path)?,
                format: read_str(obj, "format", path)?.map(|f| match f.as_str() {
                    "float" => NumberFormat::Float,
                    "double" => NumberFormat::Double,
                    _ => NumberFormat::Other(f),
                }),
                minimum: read_f64(obj, "minimum", path)?,
                maximum: read_f64(obj, "maximum", path)?,
            }),
            "boolean" => SchemaNode::Boolean,
            "array" => {
                let items_path = path.push_items();
                let items = match obj.get("items") {
                    Some(items) => SchemaNode::from_value(items, &items_path)?,
                    None => SchemaNode::Unsupported {
                        type_name: "<missing items>".to_string(),
                    },
                };
                SchemaNode::Array(ArraySchema {
                    items: Box::new(items),
                    min_items: read_usize(obj, "minItems", path)?,
                    max_items: read_usize(obj, "maxItems", path)?,
                })
            }
            "object" => match obj.get("properties") {
                Some(Value::Object(props)) => SchemaNode::Object(ObjectSchema::from_properties(props, path)?),
                Some(_) => return Err(invalid(path, "'properties' must be an object")),
                None => SchemaNode::Object(ObjectSchema::default()),
            },
            other => SchemaNode::Unsupported {
                type_name: other.to_string(),
            },
        };

        Ok(node)
    }

    /// Name used in log lines and errors
    pub fn type_name(&self) -> &str {
        match self {
            SchemaNode::String(_) => "string",
            SchemaNode::Integer(_) => "integer",
            SchemaNode::Number(_) => "number",
            SchemaNode::Boolean => "boolean",
            SchemaNode::Array(_) => "array",
            SchemaNode::Object(_) => "object",
            SchemaNode::Reference(_) => "$ref",
            SchemaNode::Unsupported { type_name } => type_name,
        }
    }
}

fn invalid(path: &SchemaPath, reason: impl Into<String>) -> SynthError {
    SynthError::InvalidSchema {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn read_str(obj: &Map<String, Value>, key: &str, path: &SchemaPath) -> SynthResult<Option<String>> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(path, format!("'{}' must be a string", key))),
    }
}

fn read_f64(obj: &Map<String, Value>, key: &str, path: &SchemaPath) -> SynthResult<Option<f64>> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid(path, format!("'{}' must be a number", key))),
    }
}

fn read_usize(obj: &Map<String, Value>, key: &str, path: &SchemaPath) -> SynthResult<Option<usize>> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| invalid(path, format!("'{}' must be a non-negative integer", key))),
    }
}

fn read_enum(obj: &Map<String, Value>, path: &SchemaPath) -> SynthResult<Option<Vec<Value>>> {
    match obj.get("enum") {
        None => Ok(None),
        Some(Value::Array(values)) if !values.is_empty() => Ok(Some(values.clone())),
        Some(Value::Array(_)) => Err(invalid(path, "'enum' must not be empty")),
        Some(_) => Err(invalid(path, "'enum' must be an array")),
    }
}

fn read_integer_multiple(obj: &Map<String, Value>, path: &SchemaPath) -> SynthResult<Option<i64>> {
    let Some(multiple) = read_f64(obj, "multipleOf", path)? else {
        return Ok(None);
    };
    if multiple <= 0.0 || multiple.fract() != 0.0 || multiple > i64::MAX as f64 {
        return Err(invalid(
            path,
            format!("'multipleOf' must be a positive integer for integer schemas, got {}", multiple),
        ));
    }
    Ok(Some(multiple as i64))
}

// ============================================================================
// Tests
// ============================================================================
