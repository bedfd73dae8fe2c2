//! # Metis Synth - Schema-driven example data
//!
//! Metis Synth produces example payloads that conform to JSON Schema or
//! OpenAPI component schemas, for use as test fixtures and mock responses.
//!
//! ## Features
//!
//! - **Constraint-aware generation**: `enum`, `pattern`, `format`, length, numeric range,
//!   `multipleOf` and item-count constraints are honored
//! - **Reference resolution**: same-document `$ref`s resolve by schema name
//! - **Base documents**: component schemas from a shared base document are merged in
//! - **Descriptor mode**: emit a typed field-descriptor tree instead of literal values
//! - **Reproducible**: every random draw comes from a caller-supplied RNG
//! - **Leniency**: omit unsupported types, or fail on them in strict mode
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use metis_synth::adapters::schema_source::SourceOptions;
//! use metis_synth::adapters::synthesizer::Synthesizer;
//! use metis_synth::config::GenerationSettings;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! fn main() -> anyhow::Result<()> {
//!     let source = SourceOptions::openapi("api/openapi.yaml").with_base("base/openapi.yaml");
//!     let synthesizer = Synthesizer::from_source(&source, GenerationSettings::default())?;
//!
//!     let mut rng = StdRng::seed_from_u64(42);
//!     let order = synthesizer.instance("Order", &mut rng)?;
//!     println!("{}", serde_json::to_string_pretty(&order)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Metis Synth follows Hexagonal Architecture:
//! - **Domain**: Schema nodes, registry, descriptors and the `SchemaSource` port
//! - **Adapters**: Document loading, generators, synthesizer and projector
//! - **Config**: Configuration management and validation

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;

pub use adapters::projector::DescriptorProjector;
pub use adapters::schema_source::SourceOptions;
pub use adapters::synthesizer::{OutputMode, Populated, Synthesizer, ValueSynthesizer};
pub use error::{SynthError, SynthResult};
