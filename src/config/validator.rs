use thiserror::Error;

use crate::config::{GenerationSettings, Settings, SourceSettings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Cross-reference error: {0}")]
    CrossReference(String),
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_source(&settings.source) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_generation(&settings.generation) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_source(source: &SourceSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if source.base_spec.is_some() && source.openapi_spec.is_none() {
            errors.push(ValidationError::CrossReference(
                "source.base_spec is set but source.openapi_spec is not".to_string(),
            ));
        }

        for (field, path) in [
            ("source.openapi_spec", &source.openapi_spec),
            ("source.base_spec", &source.base_spec),
            ("source.raw", &source.raw),
        ] {
            if path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
                errors.push(ValidationError::MissingField(field.to_string()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_generation(generation: &GenerationSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if generation.max_depth == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "generation.max_depth".to_string(),
                reason: "Depth limit must be greater than 0".to_string(),
            });
        }

        if generation.pattern_max_repeat == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "generation.pattern_max_repeat".to_string(),
                reason: "Repeat cap must be greater than 0".to_string(),
            });
        }

        if generation.string_min_length > generation.string_max_length {
            errors.push(ValidationError::InvalidValue {
                field: "generation.string_min_length".to_string(),
                reason: format!(
                    "{} exceeds string_max_length {}",
                    generation.string_min_length, generation.string_max_length
                ),
            });
        }

        if generation.array_min_items > generation.array_max_items {
            errors.push(ValidationError::InvalidValue {
                field: "generation.array_min_items".to_string(),
                reason: format!(
                    "{} exceeds array_max_items {}",
                    generation.array_min_items, generation.array_max_items
                ),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
