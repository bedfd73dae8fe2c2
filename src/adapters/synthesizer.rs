//! Recursive value synthesis
//!
//! [`Synthesizer`] owns the decoded registry and the generation settings and
//! is immutable once built. Each `populate` call creates a short-lived
//! [`ValueSynthesizer`] that walks one schema, drawing every random choice from
//! the caller's RNG so seeded runs are reproducible.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::{Map, Value};

use crate::adapters::generators::ScalarGenerator;
use crate::adapters::projector::DescriptorProjector;
use crate::config::{DescriptorSource, GenerationSettings, Leniency};
use crate::domain::schema::{ArraySchema, ObjectSchema};
use crate::domain::{DescriptorFields, SchemaNode, SchemaPath, SchemaRegistry, SchemaSource};
use crate::error::{SynthError, SynthResult};

/// What `populate` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Literal example values
    #[default]
    Instance,
    /// Field descriptors describing the instance's shape
    Descriptors,
}

/// Result of a `populate` call
#[derive(Debug, Clone, PartialEq)]
pub enum Populated {
    Instance(Map<String, Value>),
    Descriptors(DescriptorFields),
}

impl Populated {
    pub fn into_value(self) -> SynthResult<Value> {
        match self {
            Populated::Instance(map) => Ok(Value::Object(map)),
            Populated::Descriptors(fields) => Ok(serde_json::to_value(fields)?),
        }
    }

    pub fn as_instance(&self) -> Option<&Map<String, Value>> {
        match self {
            Populated::Instance(map) => Some(map),
            Populated::Descriptors(_) => None,
        }
    }

    pub fn as_descriptors(&self) -> Option<&DescriptorFields> {
        match self {
            Populated::Descriptors(fields) => Some(fields),
            Populated::Instance(_) => None,
        }
    }
}

pub struct Synthesizer {
    registry: SchemaRegistry,
    settings: GenerationSettings,
    clock: Option<DateTime<Utc>>,
}

impl Synthesizer {
    pub fn new(registry: SchemaRegistry, settings: GenerationSettings) -> Self {
        Self {
            registry,
            settings,
            clock: None,
        }
    }

    pub fn from_source(source: &impl SchemaSource, settings: GenerationSettings) -> SynthResult<Self> {
        let registry = source.load_registry()?;
        tracing::info!("Synthesizer ready with {} schemas", registry.len());
        Ok(Self::new(registry, settings))
    }

    /// Pin the timestamp used for `date` and `date-time` strings
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.clock = Some(now);
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Synthesize the named schema as literal values or as descriptors
    pub fn populate<R: Rng + ?Sized>(&self, name: &str, mode: OutputMode, rng: &mut R) -> SynthResult<Populated> {
        match mode {
            OutputMode::Instance => self.instance(name, rng).map(Populated::Instance),
            OutputMode::Descriptors => self.descriptors(name, rng).map(Populated::Descriptors),
        }
    }

    /// One example instance: the root schema's properties as a flat ordered map
    pub fn instance<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> SynthResult<Map<String, Value>> {
        let (root, path) = self.root_object(name)?;
        self.walker(OutputMode::Instance).object(root, &path, rng)
    }

    /// Descriptor tree for the named schema, derived per `descriptor_source`
    pub fn descriptors<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> SynthResult<DescriptorFields> {
        let (root, path) = self.root_object(name)?;
        match self.settings.descriptor_source {
            DescriptorSource::Schema => DescriptorProjector::new(&self.registry, &self.settings).project_schema(root, &path),
            DescriptorSource::Sample => {
                let sample = self.walker(OutputMode::Descriptors).object(root, &path, rng)?;
                Ok(DescriptorProjector::project_sample(&sample))
            }
        }
    }

    fn walker(&self, mode: OutputMode) -> ValueSynthesizer<'_> {
        let now = self.clock.unwrap_or_else(Utc::now);
        ValueSynthesizer::new(&self.registry, &self.settings, now, mode)
    }

    /// Look up the root schema, following references, and require an object
    fn root_object(&self, name: &str) -> SynthResult<(&ObjectSchema, SchemaPath)> {
        let mut node = self
            .registry
            .get(name)
            .ok_or_else(|| SynthError::SchemaNotFound(name.to_string()))?;
        let mut path = SchemaPath::schema(name);

        loop {
            check_depth(&path, self.settings.max_depth)?;
            match node {
                SchemaNode::Object(object) => return Ok((object, path)),
                SchemaNode::Reference(reference) => {
                    let (target_name, target) = self.registry.resolve(reference)?;
                    path = path.push_reference(target_name);
                    node = target;
                }
                _ => return Err(SynthError::NotAnObject(name.to_string())),
            }
        }
    }
}

/// One traversal over a schema tree
pub struct ValueSynthesizer<'a> {
    registry: &'a SchemaRegistry,
    settings: &'a GenerationSettings,
    scalars: ScalarGenerator<'a>,
    mode: OutputMode,
}

impl<'a> ValueSynthesizer<'a> {
    pub fn new(
        registry: &'a SchemaRegistry,
        settings: &'a GenerationSettings,
        now: DateTime<Utc>,
        mode: OutputMode,
    ) -> Self {
        Self {
            registry,
            settings,
            scalars: ScalarGenerator::new(settings, now),
            mode,
        }
    }

    /// Value for one node; `None` means the node is omitted from its parent
    pub fn value<R: Rng + ?Sized>(
        &self,
        node: &SchemaNode,
        path: &SchemaPath,
        rng: &mut R,
    ) -> SynthResult<Option<Value>> {
        check_depth(path, self.settings.max_depth)?;

        match node {
            SchemaNode::String(schema) => self.scalars.string(schema, path, rng).map(Some),
            SchemaNode::Integer(schema) => self.scalars.integer(schema, path, rng).map(Some),
            SchemaNode::Number(schema) => self.scalars.number(schema, path, rng).map(Some),
            SchemaNode::Boolean => Ok(Some(self.scalars.boolean(rng))),
            SchemaNode::Array(schema) => self.array(schema, path, rng),
            SchemaNode::Object(schema) => self.object(schema, path, rng).map(|map| Some(Value::Object(map))),
            SchemaNode::Reference(reference) => {
                let (name, target) = self.registry.resolve(reference)?;
                self.value(target, &path.push_reference(name), rng)
            }
            SchemaNode::Unsupported { type_name } => {
                skip_unsupported(self.settings.leniency, path, type_name)?;
                Ok(None)
            }
        }
    }

    pub fn object<R: Rng + ?Sized>(
        &self,
        schema: &ObjectSchema,
        path: &SchemaPath,
        rng: &mut R,
    ) -> SynthResult<Map<String, Value>> {
        let mut map = Map::with_capacity(schema.properties.len());
        for (name, node) in &schema.properties {
            if let Some(value) = self.value(node, &path.push_property(name), rng)? {
                map.insert(name.clone(), value);
            }
        }
        Ok(map)
    }

    fn array<R: Rng + ?Sized>(&self, schema: &ArraySchema, path: &SchemaPath, rng: &mut R) -> SynthResult<Option<Value>> {
        let items_path = path.push_items();

        // Checked before counting so strict mode fails even for empty arrays
        if let SchemaNode::Unsupported { type_name } = schema.items.as_ref() {
            skip_unsupported(self.settings.leniency, &items_path, type_name)?;
            return Ok(None);
        }

        let count = self.item_count(schema, path, rng);
        let mut items = Vec::new();
        for _ in 0..count {
            match self.value(&schema.items, &items_path, rng)? {
                Some(item) => items.push(item),
                // Items resolved to an unsupported shape; drop the whole array
                None => return Ok(None),
            }
        }
        Ok(Some(Value::Array(items)))
    }

    fn item_count<R: Rng + ?Sized>(&self, schema: &ArraySchema, path: &SchemaPath, rng: &mut R) -> usize {
        if self.mode == OutputMode::Descriptors {
            return 1;
        }

        let (min, max) = item_bounds(schema, self.settings);
        if schema.max_items.is_some_and(|declared| declared < min) {
            tracing::debug!("maxItems below minItems {} at {}, raising to {}", min, path, max);
        }
        rng.gen_range(min..=max)
    }
}

/// Inclusive item-count bounds. `maxItems` below `minItems` is raised to `minItems + 1`.
fn item_bounds(schema: &ArraySchema, settings: &GenerationSettings) -> (usize, usize) {
    let min = schema
        .min_items
        .unwrap_or_else(|| settings.array_min_items.min(schema.max_items.unwrap_or(usize::MAX)));
    let max = schema.max_items.unwrap_or_else(|| settings.array_max_items.max(min));
    if max < min {
        (min, min.saturating_add(1))
    } else {
        (min, max)
    }
}

/// Fail once a path grows past the recursion limit
pub(crate) fn check_depth(path: &SchemaPath, max_depth: usize) -> SynthResult<()> {
    if path.depth() > max_depth {
        return Err(SynthError::DepthExceeded {
            path: path.to_string(),
            max_depth,
        });
    }
    Ok(())
}

/// Strict mode rejects unsupported nodes; best-effort logs and lets the caller omit them
pub(crate) fn skip_unsupported(leniency: Leniency, path: &SchemaPath, type_name: &str) -> SynthResult<()> {
    match leniency {
        Leniency::Strict => Err(SynthError::UnsupportedType {
            path: path.to_string(),
            type_name: type_name.to_string(),
        }),
        Leniency::BestEffort => {
            tracing::debug!("Omitting unsupported type '{}' at {}", type_name, path);
            Ok(())
        }
    }
}
