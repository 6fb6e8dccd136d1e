//! Pre-built description table for a whole crate.
//!
//! [`DescriptionRegistry::build`] parses the crate once and indexes every type it declares, so
//! later lookups are plain map reads. The table serializes to JSON or YAML and can be shipped
//! alongside a binary that has no access to its source.

use crate::customizer::DescriptionLookup;
use crate::error::{Error, Result};
use crate::identity::TypeIdentity;
use crate::indexer::{build_index, CommentIndex};
use crate::loader::SourceLoader;
use crate::locator::declaration_blocks;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionRegistry {
    /// Comment index per type, keyed by qualified type name
    types: BTreeMap<String, CommentIndex>,
    #[serde(skip)]
    warnings: Vec<String>,
}

impl DescriptionRegistry {
    /// Indexes every type declared in the loader's crate.
    ///
    /// Files that fail to parse are skipped and reported in [`warnings`](Self::warnings).
    ///
    /// # Errors
    ///
    /// Returns an error if the source root cannot be scanned.
    pub fn build(loader: &SourceLoader) -> Result<Self> {
        let sources = loader.load_crate()?;
        let mut registry = Self {
            types: BTreeMap::new(),
            warnings: sources.warnings,
        };

        for module in &sources.modules {
            for block in declaration_blocks(module) {
                for entry in &block.entries {
                    let ty = TypeIdentity::new(module.module_path.clone(), entry.name());
                    debug!("Registering {}", ty);
                    registry.types.insert(ty.qualified_name(), build_index(&block, entry));
                }
            }
        }

        info!(
            "Registered {} types from {} modules",
            registry.types.len(),
            sources.modules.len()
        );
        Ok(registry)
    }

    pub fn get(&self, ty: &TypeIdentity) -> Option<&CommentIndex> {
        self.types.get(&ty.qualified_name())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommentIndex)> {
        self.types.iter().map(|(name, index)| (name.as_str(), index))
    }

    /// Files skipped while building.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Reads a registry previously serialized to JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a registry previously serialized to YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    fn index_of(&self, ty: &TypeIdentity) -> Result<&CommentIndex> {
        self.get(ty).ok_or_else(|| Error::TypeNotFound {
            module: ty.module_path.clone(),
            name: ty.name.clone(),
        })
    }
}

impl DescriptionLookup for DescriptionRegistry {
    fn type_description(&self, ty: &TypeIdentity) -> Result<String> {
        Ok(self.index_of(ty)?.root().to_string())
    }

    fn field_description(&self, ty: &TypeIdentity, field: &str) -> Result<String> {
        self.index_of(ty)?
            .field(field)
            .map(str::to_string)
            .ok_or_else(|| Error::FieldNotFound {
                ty: ty.qualified_name(),
                field: field.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn create_crate() -> (TempDir, SourceLoader) {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("lib.rs"),
            "pub mod models;\n/// Wire types\npub mod wire {\n    /// A frame\n    pub struct Frame(pub u8);\n}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("models.rs"),
            "/// A user\npub struct User {\n    /// Unique id\n    pub id: u32,\n    pub name: String,\n}\n/// Roles\npub enum Role { Admin }\n",
        )
        .unwrap();
        let loader = SourceLoader::new(dir.path(), "demo");
        (dir, loader)
    }

    #[test]
    fn test_build_indexes_every_type() {
        let (_dir, loader) = create_crate();
        let registry = DescriptionRegistry::build(&loader).unwrap();

        let names: Vec<&str> = registry.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["demo::models::Role", "demo::models::User", "demo::wire::Frame"]);
        assert!(registry.warnings().is_empty());

        let user = registry.get(&TypeIdentity::new("demo::models", "User")).unwrap();
        assert_eq!(user.root(), "A user");
        assert_eq!(user.field("id"), Some("Unique id"));
        assert_eq!(user.field("name"), Some(""));
    }

    #[test]
    fn test_single_type_inline_module_uses_block_comment() {
        let (_dir, loader) = create_crate();
        let registry = DescriptionRegistry::build(&loader).unwrap();

        let frame = TypeIdentity::new("demo::wire", "Frame");
        assert_eq!(registry.type_description(&frame).unwrap(), "Wire types");
        assert_eq!(registry.field_description(&frame, "0").unwrap(), "");
    }

    #[test]
    fn test_lookups_report_missing_entries() {
        let (_dir, loader) = create_crate();
        let registry = DescriptionRegistry::build(&loader).unwrap();

        assert!(matches!(
            registry.type_description(&TypeIdentity::new("demo::models", "Missing")),
            Err(Error::TypeNotFound { .. })
        ));
        assert!(matches!(
            registry.field_description(&TypeIdentity::new("demo::models", "User"), "email"),
            Err(Error::FieldNotFound { .. })
        ));
    }

    #[test]
    fn test_unparsable_files_become_warnings() {
        let (dir, loader) = create_crate();
        fs::write(dir.path().join("broken.rs"), "pub struct Broken {").unwrap();

        let registry = DescriptionRegistry::build(&loader).unwrap();
        assert_eq!(registry.warnings().len(), 1);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_crate_root_comes_from_library_target() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("bin")).unwrap();
        fs::write(dir.path().join("lib.rs"), "/// Library config\npub struct Config;\n").unwrap();
        fs::write(dir.path().join("main.rs"), "/// Binary config\nstruct Config;\n").unwrap();
        fs::write(dir.path().join("bin/tool.rs"), "/// Tool config\nstruct Config;\n").unwrap();
        let loader = SourceLoader::new(dir.path(), "demo");

        let registry = DescriptionRegistry::build(&loader).unwrap();
        let config = TypeIdentity::new("demo", "Config");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.type_description(&config).unwrap(), "Library config");
        assert_eq!(
            crate::indexer::type_description(&loader, &config).unwrap(),
            "Library config"
        );
    }

    #[test]
    fn test_registry_reloads_from_serialized_form() {
        let (_dir, loader) = create_crate();
        let registry = DescriptionRegistry::build(&loader).unwrap();

        let json = serde_json::to_string(&registry).unwrap();
        assert!(json.starts_with("{\"types\":{\"demo::models::Role\""));
        assert_eq!(DescriptionRegistry::from_json(&json).unwrap(), registry);

        let yaml = serde_yaml::to_string(&registry).unwrap();
        assert_eq!(DescriptionRegistry::from_yaml(&yaml).unwrap(), registry);

        assert!(matches!(
            DescriptionRegistry::from_json("{\"types\": 3}"),
            Err(Error::SerializationError(_))
        ));
    }
}
