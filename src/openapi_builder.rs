use crate::identity::TypeIdentity;
use crate::schema_generator::{Schema, SchemaGenerator};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    /// Root types added so far, in insertion order
    roots: Vec<TypeIdentity>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Components {
    /// Schema definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<BTreeMap<String, Schema>>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    /// API paths; always empty, only components are generated
    pub paths: BTreeMap<String, serde_json::Value>,
    /// Components (schemas, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: "Generated API".to_string(),
                version: "1.0.0".to_string(),
                description: Some("Schemas documented from Rust doc comments".to_string()),
            },
            roots: Vec::new(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            version,
            description,
        };
        self
    }

    /// Add a root type, generating its schema and those of every type it reaches
    pub fn add_type(&mut self, ty: &TypeIdentity, schema_gen: &mut SchemaGenerator) {
        debug!("Adding type {} to document", ty);
        schema_gen.add_type(ty);
        self.roots.push(ty.clone());
    }

    pub fn roots(&self) -> &[TypeIdentity] {
        &self.roots
    }

    /// Build the final OpenAPI document
    pub fn build(self, schema_gen: SchemaGenerator) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        let schemas = schema_gen.into_schemas();
        let components = if !schemas.is_empty() {
            Some(Components {
                schemas: Some(schemas),
            })
        } else {
            None
        };

        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: self.info,
            paths: BTreeMap::new(),
            components,
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}
