//! Descriptor projection
//!
//! Descriptors come either straight from the schema (the declared type decides
//! integer vs float) or from a synthesized sample (the JSON number kind decides).

use serde_json::{Map, Value};

use crate::adapters::synthesizer::{check_depth, skip_unsupported};
use crate::config::GenerationSettings;
use crate::domain::schema::ObjectSchema;
use crate::domain::{DescriptorFields, FieldDescriptor, SchemaNode, SchemaPath, SchemaRegistry};
use crate::error::SynthResult;

pub struct DescriptorProjector<'a> {
    registry: &'a SchemaRegistry,
    settings: &'a GenerationSettings,
}

impl<'a> DescriptorProjector<'a> {
    pub fn new(registry: &'a SchemaRegistry, settings: &'a GenerationSettings) -> Self {
        Self { registry, settings }
    }

    pub fn project_schema(&self, schema: &ObjectSchema, path: &SchemaPath) -> SynthResult<DescriptorFields> {
        let mut fields = DescriptorFields::new();
        for (name, node) in &schema.properties {
            if let Some(descriptor) = self.descriptor(node, &path.push_property(name))? {
                fields.insert(name.clone(), descriptor);
            }
        }
        Ok(fields)
    }

    fn descriptor(&self, node: &SchemaNode, path: &SchemaPath) -> SynthResult<Option<FieldDescriptor>> {
        check_depth(path, self.settings.max_depth)?;

        let descriptor = match node {
            SchemaNode::String(_) => FieldDescriptor::String,
            SchemaNode::Boolean => FieldDescriptor::Boolean,
            SchemaNode::Integer(_) => FieldDescriptor::Integer,
            SchemaNode::Number(_) => FieldDescriptor::Float,
            SchemaNode::Array(array) => match self.descriptor(&array.items, &path.push_items())? {
                Some(items) => FieldDescriptor::list(items),
                None => return Ok(None),
            },
            SchemaNode::Object(object) => FieldDescriptor::nested(self.project_schema(object, path)?),
            SchemaNode::Reference(reference) => {
                let (name, target) = self.registry.resolve(reference)?;
                return self.descriptor(target, &path.push_reference(name));
            }
            SchemaNode::Unsupported { type_name } => {
                skip_unsupported(self.settings.leniency, path, type_name)?;
                return Ok(None);
            }
        };
        Ok(Some(descriptor))
    }

    /// Re-derive descriptors from a synthesized instance
    pub fn project_sample(sample: &Map<String, Value>) -> DescriptorFields {
        sample
            .iter()
            .filter_map(|(name, value)| Self::project_value(value).map(|d| (name.clone(), d)))
            .collect()
    }

    /// Descriptor for one value. Lists are described by their first element;
    /// nulls and empty lists have no descriptor.
    pub fn project_value(value: &Value) -> Option<FieldDescriptor> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(FieldDescriptor::Boolean),
            Value::String(_) => Some(FieldDescriptor::String),
            Value::Number(n) if n.is_f64() => Some(FieldDescriptor::Float),
            Value::Number(_) => Some(FieldDescriptor::Integer),
            Value::Array(items) => items.first().and_then(Self::project_value).map(FieldDescriptor::list),
            Value::Object(map) => Some(FieldDescriptor::nested(Self::project_sample(map))),
        }
    }
}
