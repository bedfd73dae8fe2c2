pub mod generators;
pub mod projector;
pub mod schema_source;
pub mod synthesizer;

#[cfg(test)]
mod projector_test;
