use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod validator;

use crate::cli::Cli;

pub const DEFAULT_CONFIG_FILE: &str = "metis-synth.toml";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub generation: GenerationSettings,
}

/// Where schemas are loaded from. The OpenAPI document wins when both are set.
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct SourceSettings {
    /// OpenAPI document (JSON or YAML)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openapi_spec: Option<PathBuf>,
    /// Base OpenAPI document whose `components.schemas` are merged in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_spec: Option<PathBuf>,
    /// Raw schema mapping file (JSON or YAML)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<PathBuf>,
}

/// What to do with unknown `type` values and unknown array item shapes
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Leniency {
    /// Omit the property
    #[default]
    BestEffort,
    /// Fail the whole call
    Strict,
}

/// What descriptor projection is computed from
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorSource {
    /// The schema node's declared type
    #[default]
    Schema,
    /// The runtime shape of the synthesized sample
    Sample,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationSettings {
    pub leniency: Leniency,
    pub descriptor_source: DescriptorSource,
    /// Fixed seed for reproducible output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Recursion limit; cyclic schemas fail once they reach it
    pub max_depth: usize,
    /// Cap on unbounded repeats (`*`, `+`, `{n,}`) when generating from a pattern
    pub pattern_max_repeat: u32,
    pub string_min_length: usize,
    pub string_max_length: usize,
    pub array_min_items: usize,
    pub array_max_items: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            leniency: Leniency::BestEffort,
            descriptor_source: DescriptorSource::Schema,
            seed: None,
            max_depth: 32,
            pattern_max_repeat: 10,
            string_min_length: 5,
            string_max_length: 25,
            array_min_items: 1,
            array_max_items: 3,
        }
    }
}

impl Settings {
    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(&cli.config)?;

        // CLI > config file > defaults
        settings.apply_cli_overrides(cli);

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: &Path) -> Result<Self, anyhow::Error> {
        let settings = Self::load(path)?;
        settings.validate()?;
        Ok(settings)
    }

    fn load(path: &Path) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .set_default("generation.leniency", "best_effort")?
            .set_default("generation.descriptor_source", "schema")?
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;
        settings.source.resolve_relative_to(path.parent());
        Ok(settings)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(spec) = &cli.spec {
            self.source.openapi_spec = Some(spec.clone());
        }
        if let Some(base) = &cli.base {
            self.source.base_spec = Some(base.clone());
        }
        if let Some(raw) = &cli.raw {
            self.source.raw = Some(raw.clone());
        }
        if let Some(seed) = cli.seed {
            self.generation.seed = Some(seed);
        }
        if cli.strict {
            self.generation.leniency = Leniency::Strict;
        }
        if let Some(source) = cli.descriptor_source {
            self.generation.descriptor_source = source;
        }
    }
}

impl SourceSettings {
    /// Paths in a config file are relative to that file
    fn resolve_relative_to(&mut self, dir: Option<&Path>) {
        let Some(dir) = dir.filter(|d| !d.as_os_str().is_empty()) else {
            return;
        };
        for path in [&mut self.openapi_spec, &mut self.base_spec, &mut self.raw]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }
}
