pub mod descriptor;
pub mod path;
pub mod registry;
pub mod schema;

pub use descriptor::{DescriptorFields, DescriptorViolation, FieldDescriptor};
pub use path::SchemaPath;
pub use registry::{SchemaRegistry, SourceMode};
pub use schema::SchemaNode;

use crate::error::SynthResult;

/// Supplies the decoded schema registry the synthesizer works against.
///
/// Implementations own document loading and any cross-document merging; by
/// the time `load_registry` returns, only same-document `$ref`s remain.
pub trait SchemaSource {
    fn load_registry(&self) -> SynthResult<SchemaRegistry>;
}

impl SchemaSource for SchemaRegistry {
    fn load_registry(&self) -> SynthResult<SchemaRegistry> {
        Ok(self.clone())
    }
}
