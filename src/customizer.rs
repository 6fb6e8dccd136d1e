//! Attaches doc comments to generated schemas through the schema generator's hook.

use crate::error::Result;
use crate::identity::{FieldIdentity, TypeIdentity};
use crate::indexer;
use crate::loader::SourceLoader;
use crate::schema_generator::Schema;
use crate::type_resolver::SerdeAttributes;
use log::{debug, warn};

/// What the schema generator knows about the value whose schema it just built.
///
/// For a struct field, `parent` is the struct. For a component type itself, `parent` is `None`
/// and both names are empty.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    /// Name the field has in the serialized form
    pub json_name: &'a str,
    /// Name the field is declared with
    pub field_name: &'a str,
    /// Type of the field, or the component type for root invocations
    pub ty: &'a TypeIdentity,
    /// Serde attribute metadata of the field
    pub tag: &'a SerdeAttributes,
    pub parent: Option<&'a TypeIdentity>,
}

impl<'a> FieldContext<'a> {
    /// Context of a component type itself.
    pub fn root(ty: &'a TypeIdentity) -> Self {
        static NO_TAG: SerdeAttributes = SerdeAttributes {
            rename: None,
            skip: false,
            flatten: false,
        };
        Self {
            json_name: "",
            field_name: "",
            ty,
            tag: &NO_TAG,
            parent: None,
        }
    }
}

/// Hook invoked by [`SchemaGenerator`](crate::schema_generator::SchemaGenerator) for every
/// generated field and component schema.
pub trait SchemaCustomizer {
    fn customize(&self, field: &FieldContext<'_>, schema: &mut Schema);
}

/// Source of type and field descriptions.
pub trait DescriptionLookup {
    fn type_description(&self, ty: &TypeIdentity) -> Result<String>;

    fn field_description(&self, ty: &TypeIdentity, field: &str) -> Result<String>;
}

/// Live lookups: every call loads and parses the type's module again.
impl DescriptionLookup for SourceLoader {
    fn type_description(&self, ty: &TypeIdentity) -> Result<String> {
        indexer::type_description(self, ty)
    }

    fn field_description(&self, ty: &TypeIdentity, field: &str) -> Result<String> {
        indexer::field_description(self, ty, field)
    }
}

/// Sets `description` on generated schemas from doc comments.
///
/// Field schemas get the parent's comment for that field, component schemas the type's own
/// comment. Empty descriptions leave the schema untouched. Lookup failures are logged and never
/// interrupt schema generation.
pub struct DescriptionCustomizer<L> {
    lookup: L,
}

impl<L: DescriptionLookup> DescriptionCustomizer<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }
}

impl<L: DescriptionLookup> SchemaCustomizer for DescriptionCustomizer<L> {
    fn customize(&self, field: &FieldContext<'_>, schema: &mut Schema) {
        let description = match field.parent {
            Some(parent) => self.lookup.field_description(parent, field.field_name),
            None => self.lookup.type_description(field.ty),
        };

        let target = match field.parent {
            Some(parent) => FieldIdentity::new(parent.clone(), field.field_name).to_string(),
            None => field.ty.to_string(),
        };

        match description {
            Ok(description) if description.is_empty() => {}
            Ok(description) => {
                debug!("Describing {}: {}", target, description);
                schema.description = Some(description);
            }
            Err(e) => warn!("No description for {}: {}", target, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use tempfile::TempDir;

    const MODELS: &str = r#"
/// MyType is a type that has comments on its fields
pub struct MyType {
    /// This field is a string with a manual comment
    pub field_one: String,
    pub field_two: u32,
}
"#;

    fn loader() -> (TempDir, SourceLoader) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("lib.rs"), "pub mod models;\n").unwrap();
        fs::write(dir.path().join("models.rs"), MODELS).unwrap();
        let loader = SourceLoader::new(dir.path(), "demo");
        (dir, loader)
    }

    fn context<'a>(
        field_name: &'a str,
        ty: &'a TypeIdentity,
        tag: &'a SerdeAttributes,
        parent: Option<&'a TypeIdentity>,
    ) -> FieldContext<'a> {
        FieldContext {
            json_name: field_name,
            field_name,
            ty,
            tag,
            parent,
        }
    }

    #[test]
    fn test_field_and_root_descriptions() {
        let (_dir, loader) = loader();
        let customizer = DescriptionCustomizer::new(loader);
        let my_type = TypeIdentity::new("demo::models", "MyType");
        let string = TypeIdentity::new("", "String");
        let tag = SerdeAttributes::default();

        let mut schema = Schema::default();
        customizer.customize(&context("field_one", &string, &tag, Some(&my_type)), &mut schema);
        assert_eq!(
            schema.description.as_deref(),
            Some("This field is a string with a manual comment")
        );

        let mut schema = Schema::default();
        customizer.customize(&FieldContext::root(&my_type), &mut schema);
        assert_eq!(
            schema.description.as_deref(),
            Some("MyType is a type that has comments on its fields")
        );
    }

    #[test]
    fn test_empty_description_leaves_schema_unset() {
        let (_dir, loader) = loader();
        let customizer = DescriptionCustomizer::new(loader);
        let my_type = TypeIdentity::new("demo::models", "MyType");
        let u32_type = TypeIdentity::new("", "u32");
        let tag = SerdeAttributes::default();

        let mut schema = Schema::default();
        customizer.customize(&context("field_two", &u32_type, &tag, Some(&my_type)), &mut schema);
        assert!(schema.description.is_none());
    }

    #[test]
    fn test_lookup_failures_are_swallowed() {
        let (_dir, loader) = loader();
        let customizer = DescriptionCustomizer::new(loader);
        let missing = TypeIdentity::new("demo::models", "Missing");
        let unloadable = TypeIdentity::new("demo::nowhere", "Gone");
        let tag = SerdeAttributes::default();

        let mut schema = Schema {
            description: Some("kept".to_string()),
            ..Default::default()
        };
        customizer.customize(&FieldContext::root(&missing), &mut schema);
        customizer.customize(&context("x", &missing, &tag, Some(&unloadable)), &mut schema);
        assert_eq!(schema.description.as_deref(), Some("kept"));

        assert!(matches!(
            customizer.lookup().type_description(&unloadable),
            Err(Error::ModuleNotFound { .. })
        ));
    }
}
