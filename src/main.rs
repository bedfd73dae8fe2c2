use clap::Parser;
use metis_synth::adapters::schema_source::SourceOptions;
use metis_synth::adapters::synthesizer::{OutputMode, Synthesizer};
use metis_synth::cli::Cli;
use metis_synth::config::Settings;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;

    let source = SourceOptions::from_settings(&settings.source)?;
    let synthesizer = Synthesizer::from_source(&source, settings.generation.clone())?;
    let registry = synthesizer.registry();
    info!("Loaded {} schemas ({:?} source)", registry.len(), registry.mode());
    if !registry.contains(&cli.schema) {
        anyhow::bail!(
            "Schema '{}' not found; available: {}",
            cli.schema,
            registry.names().join(", ")
        );
    }

    let mut rng = match settings.generation.seed {
        Some(seed) => {
            info!("Using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let mode = if cli.descriptors {
        OutputMode::Descriptors
    } else {
        OutputMode::Instance
    };

    let mut outputs = Vec::with_capacity(cli.count);
    for _ in 0..cli.count {
        outputs.push(synthesizer.populate(&cli.schema, mode, &mut rng)?.into_value()?);
    }
    info!("Generated {} document(s) for schema '{}'", outputs.len(), cli.schema);

    let output = if outputs.len() == 1 {
        outputs.remove(0)
    } else {
        Value::Array(outputs)
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
