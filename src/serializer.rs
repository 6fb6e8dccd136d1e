//! Serialization of generated documents and description registries to YAML or JSON.

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serializes a document to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```ignore
/// use schema_doc_comments::openapi_builder::OpenApiBuilder;
/// use schema_doc_comments::serializer::serialize_yaml;
/// use schema_doc_comments::schema_generator::SchemaGenerator;
/// use schema_doc_comments::type_resolver::TypeResolver;
///
/// let builder = OpenApiBuilder::new();
/// let schema_gen = SchemaGenerator::new(TypeResolver::new(vec![]));
/// let doc = builder.build(schema_gen);
/// println!("{}", serialize_yaml(&doc).unwrap());
/// ```
pub fn serialize_yaml<T: Serialize>(doc: &T) -> Result<String> {
    debug!("Serializing document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize document to YAML")
}

/// Serializes a document to JSON format with pretty printing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json<T: Serialize>(doc: &T) -> Result<String> {
    debug!("Serializing document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize document to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
///
/// Overwrites the file if it exists.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
