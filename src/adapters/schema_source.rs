//! Document-backed schema sources
//!
//! Loads an OpenAPI document (optionally merged with a base document) or takes
//! a raw schema mapping, and hands the synthesizer a decoded registry.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::config::SourceSettings;
use crate::domain::{SchemaRegistry, SchemaSource};
use crate::error::{SynthError, SynthResult};

/// Either an OpenAPI document path or raw schema data; the document wins when both are set
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    pub openapi_spec: Option<PathBuf>,
    pub base_spec: Option<PathBuf>,
    pub raw: Option<Value>,
}

impl SourceOptions {
    pub fn openapi(path: impl Into<PathBuf>) -> Self {
        Self {
            openapi_spec: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn raw(data: Value) -> Self {
        Self {
            raw: Some(data),
            ..Default::default()
        }
    }

    pub fn with_base(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_spec = Some(path.into());
        self
    }

    /// Build options from settings, reading the raw mapping file if one is configured
    pub fn from_settings(settings: &SourceSettings) -> SynthResult<Self> {
        let raw = match (&settings.openapi_spec, &settings.raw) {
            (None, Some(path)) => Some(read_document(path)?),
            (Some(_), Some(path)) => {
                tracing::warn!(
                    "Both an OpenAPI document and a raw schema file are configured, ignoring {}",
                    path.display()
                );
                None
            }
            _ => None,
        };

        Ok(Self {
            openapi_spec: settings.openapi_spec.clone(),
            base_spec: settings.base_spec.clone(),
            raw,
        })
    }
}

impl SchemaSource for SourceOptions {
    fn load_registry(&self) -> SynthResult<SchemaRegistry> {
        if let Some(spec) = &self.openapi_spec {
            let document = load_openapi_document(spec, self.base_spec.as_deref())?;
            return SchemaRegistry::from_openapi(&document);
        }

        match &self.raw {
            Some(raw) if !is_empty_object(raw) => SchemaRegistry::from_raw(raw),
            _ => Err(SynthError::Configuration(
                "Either an OpenAPI document path or raw schema data must be supplied".to_string(),
            )),
        }
    }
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(Map::is_empty)
}

/// Read a JSON or YAML document, picking the parser by file extension
pub fn read_document(path: &Path) -> SynthResult<Value> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let content = std::fs::read_to_string(path)?;
    let document: Value = match ext.as_str() {
        "json" => serde_json::from_str(&content)?,
        "yaml" | "yml" => serde_yaml::from_str(&content)?,
        _ => {
            return Err(SynthError::Configuration(format!(
                "Unsupported document format for {} (expected .json, .yaml or .yml)",
                path.display()
            )))
        }
    };

    tracing::info!("Loaded schema document {}", path.display());
    Ok(document)
}

/// Load an OpenAPI document and merge a base document's component schemas into it.
///
/// `$ref`s that point into the base document are rewritten to same-document
/// references so they resolve by schema name after the merge.
pub fn load_openapi_document(spec: &Path, base: Option<&Path>) -> SynthResult<Value> {
    let mut document = read_document(spec)?;

    let Some(base) = base else {
        return Ok(document);
    };
    if is_same_file(spec, base) {
        tracing::debug!("Base document is the spec itself, skipping merge");
        return Ok(document);
    }

    let base_document = read_document(base)?;
    let merged = merge_base_schemas(&mut document, &base_document)?;
    tracing::debug!("Merged {} schemas from base document {}", merged, base.display());

    if let Some(base_name) = base.file_name().and_then(|n| n.to_str()) {
        let rewritten = strip_document_refs(&mut document, base_name);
        tracing::debug!("Rewrote {} references into {}", rewritten, base_name);
    }

    Ok(document)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Add the base document's `components.schemas` entries to `document`.
/// Local entries shadow base entries of the same name. Returns how many were added.
pub fn merge_base_schemas(document: &mut Value, base: &Value) -> SynthResult<usize> {
    let base_schemas = base
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(|s| s.as_object())
        .ok_or_else(|| {
            SynthError::Configuration("Base document has no 'components.schemas' object".to_string())
        })?;

    let root = document
        .as_object_mut()
        .ok_or_else(|| SynthError::Configuration("OpenAPI document must be an object".to_string()))?;
    let components = root
        .entry("components")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| SynthError::Configuration("'components' must be an object".to_string()))?;
    let schemas = components
        .entry("schemas")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| SynthError::Configuration("'components.schemas' must be an object".to_string()))?;

    let mut added = 0;
    for (name, schema) in base_schemas {
        if schemas.contains_key(name) {
            tracing::debug!("Local schema '{}' shadows the base definition", name);
            continue;
        }
        schemas.insert(name.clone(), schema.clone());
        added += 1;
    }

    Ok(added)
}

/// Rewrite `$ref`s of the form `<path>/<document_name>#/pointer` to `#/pointer`.
/// Returns how many references were rewritten.
pub fn strip_document_refs(value: &mut Value, document_name: &str) -> usize {
    match value {
        Value::Object(obj) => {
            let mut rewritten = 0;
            for (key, child) in obj.iter_mut() {
                if key == "$ref" {
                    if let Value::String(reference) = child {
                        if let Some(local) = local_reference(reference, document_name) {
                            *reference = local;
                            rewritten += 1;
                        }
                    }
                } else {
                    rewritten += strip_document_refs(child, document_name);
                }
            }
            rewritten
        }
        Value::Array(items) => items
            .iter_mut()
            .map(|item| strip_document_refs(item, document_name))
            .sum(),
        _ => 0,
    }
}

fn local_reference(reference: &str, document_name: &str) -> Option<String> {
    let (file, fragment) = reference.split_once('#')?;
    let names_document = Path::new(file)
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n == document_name);
    names_document.then(|| format!("#{}", fragment))
}
