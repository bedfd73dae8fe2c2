use clap::Parser;
use std::path::PathBuf;

use crate::config::{DescriptorSource, DEFAULT_CONFIG_FILE};

/// Synthesize example payloads from JSON Schema / OpenAPI component schemas
#[derive(Parser, Debug, Clone)]
#[command(name = "metis-synth", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "METIS_SYNTH_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// OpenAPI document (JSON or YAML)
    #[arg(long, env = "METIS_SYNTH_SPEC")]
    pub spec: Option<PathBuf>,

    /// Base OpenAPI document merged into the spec's component schemas
    #[arg(long, env = "METIS_SYNTH_BASE")]
    pub base: Option<PathBuf>,

    /// Raw schema mapping file, used when no OpenAPI document is given
    #[arg(long, env = "METIS_SYNTH_RAW")]
    pub raw: Option<PathBuf>,

    /// Name of the schema to populate
    #[arg(short, long)]
    pub schema: String,

    /// Emit field descriptors instead of literal values
    #[arg(long)]
    pub descriptors: bool,

    /// What descriptors are derived from
    #[arg(long, value_enum)]
    pub descriptor_source: Option<DescriptorSource>,

    /// Seed for reproducible output
    #[arg(long, env = "METIS_SYNTH_SEED")]
    pub seed: Option<u64>,

    /// Fail on unsupported types instead of omitting them
    #[arg(long)]
    pub strict: bool,

    /// Number of instances to generate
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,
}
