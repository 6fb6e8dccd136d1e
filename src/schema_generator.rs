use crate::customizer::{FieldContext, SchemaCustomizer};
use crate::identity::{TypeIdentity, PATH_SEPARATOR};
use crate::type_resolver::{
    EnumDef, PrimitiveType, ResolvedType, StructDef, TypeInfo, TypeKind, TypeResolver,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Schema generator - converts Rust types to OpenAPI schemas
///
/// While building schemas it calls the registered [`SchemaCustomizer`] once for every struct
/// field (with the struct as parent) and once for every generated component type (without a
/// parent), so descriptions can be attached as the schemas are built.
pub struct SchemaGenerator {
    /// Type resolver for looking up type definitions
    type_resolver: TypeResolver,
    /// Cache of generated schemas to avoid duplication, keyed by component name
    schemas: BTreeMap<String, Schema>,
    /// Component name given to each type; the first type with a bare name keeps it, later
    /// types with the same name get their dotted module path
    component_names: HashMap<TypeIdentity, String>,
    /// Component schemas currently being built, to terminate on recursive types
    in_progress: HashSet<TypeIdentity>,
    customizer: Option<Box<dyn SchemaCustomizer>>,
}

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    /// Required field names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Enum values for enum types
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Reference to another schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Format for primitive types (e.g., "int32", "int64", "float", "double")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Schema {
    fn object_placeholder() -> Self {
        Self {
            schema_type: Some("object".to_string()),
            ..Default::default()
        }
    }

    fn reference_to(type_name: &str) -> Self {
        Self {
            reference: Some(format!("#/components/schemas/{}", type_name)),
            ..Default::default()
        }
    }
}

impl SchemaGenerator {
    /// Create a new SchemaGenerator with a TypeResolver
    pub fn new(type_resolver: TypeResolver) -> Self {
        debug!("Initializing SchemaGenerator");
        Self {
            type_resolver,
            schemas: BTreeMap::new(),
            component_names: HashMap::new(),
            in_progress: HashSet::new(),
            customizer: None,
        }
    }

    /// Register the hook invoked for every generated field and component type
    pub fn with_customizer(mut self, customizer: impl SchemaCustomizer + 'static) -> Self {
        self.customizer = Some(Box::new(customizer));
        self
    }

    /// Add the type declared at `ty` to the component schemas, returning the schema referring
    /// to it
    pub fn add_type(&mut self, ty: &TypeIdentity) -> Schema {
        debug!("Adding root type: {}", ty);
        match self.type_resolver.resolve_identity(ty) {
            Some(resolved) => self.schema_for(resolved),
            None => {
                debug!("Unknown root type: {}, using object placeholder", ty);
                Schema::object_placeholder()
            }
        }
    }

    /// Generate a schema for a TypeInfo
    pub fn generate_schema(&mut self, type_info: &TypeInfo) -> Schema {
        self.generate_schema_in(type_info, None)
    }

    /// Generate a schema for a type referenced from `module_path`, whose own declarations take
    /// precedence over same-named types elsewhere
    fn generate_schema_in(&mut self, type_info: &TypeInfo, module_path: Option<&str>) -> Schema {
        debug!("Generating schema for type: {}", type_info.name);

        // Option<T> is not nullable in the schema, only not required
        if type_info.is_option {
            if let Some(inner) = type_info.generic_args.first() {
                return self.generate_schema_in(inner, module_path);
            }
        }

        if type_info.is_vec {
            if let Some(inner) = type_info.generic_args.first() {
                let items_schema = self.generate_schema_in(inner, module_path);
                return Schema {
                    schema_type: Some("array".to_string()),
                    items: Some(Box::new(items_schema)),
                    ..Default::default()
                };
            }
        }

        let resolved = match module_path {
            Some(module_path) => self.type_resolver.resolve_from(&type_info.name, module_path),
            None => self.type_resolver.resolve_type(&type_info.name),
        };
        match resolved {
            Some(resolved) => self.schema_for(resolved),
            None => {
                debug!("Unknown type: {}, using object placeholder", type_info.name);
                Schema::object_placeholder()
            }
        }
    }

    fn schema_for(&mut self, resolved: ResolvedType) -> Schema {
        match resolved.kind {
            TypeKind::Primitive(prim) => Self::primitive_to_schema(&prim),
            TypeKind::Struct(struct_def) => {
                let name = self.generate_struct_schema(resolved.identity, struct_def);
                Schema::reference_to(&name)
            }
            TypeKind::Enum(enum_def) => {
                let name = self.generate_enum_schema(resolved.identity, enum_def);
                Schema::reference_to(&name)
            }
        }
    }

    /// Convert a primitive type to an OpenAPI schema
    fn primitive_to_schema(primitive: &PrimitiveType) -> Schema {
        let (schema_type, format) = match primitive {
            PrimitiveType::String | PrimitiveType::Char => ("string", None),
            PrimitiveType::I8 | PrimitiveType::I16 | PrimitiveType::I32 => {
                ("integer", Some("int32"))
            }
            PrimitiveType::I64 | PrimitiveType::I128 => ("integer", Some("int64")),
            PrimitiveType::U8 | PrimitiveType::U16 | PrimitiveType::U32 => {
                ("integer", Some("int32"))
            }
            PrimitiveType::U64 | PrimitiveType::U128 => ("integer", Some("int64")),
            PrimitiveType::F32 => ("number", Some("float")),
            PrimitiveType::F64 => ("number", Some("double")),
            PrimitiveType::Bool => ("boolean", None),
        };

        Schema {
            schema_type: Some(schema_type.to_string()),
            format: format.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    /// The name of the component schema for `ty`
    fn component_name(&mut self, ty: &TypeIdentity) -> String {
        if let Some(name) = self.component_names.get(ty) {
            return name.clone();
        }

        let name = if self.component_names.values().any(|name| *name == ty.name) {
            ty.qualified_name().replace(PATH_SEPARATOR, ".")
        } else {
            ty.name.clone()
        };
        debug!("Component name for {} is {}", ty, name);
        self.component_names.insert(ty.clone(), name.clone());
        name
    }

    /// Generate a schema for a struct type and add it to the schemas collection, returning its
    /// component name
    fn generate_struct_schema(&mut self, identity: TypeIdentity, struct_def: StructDef) -> String {
        let name = self.component_name(&identity);
        if self.schemas.contains_key(&name) || self.in_progress.contains(&identity) {
            debug!("Schema for {} already exists", identity);
            return name;
        }

        debug!("Generating struct schema for: {}", identity);
        self.in_progress.insert(identity.clone());
        let module_path = identity.module_path.clone();

        let mut properties = BTreeMap::new();
        let mut required = Vec::new();

        for field in &struct_def.fields {
            if field.serde_attrs.skip {
                continue;
            }

            if field.serde_attrs.flatten && !field.type_info.is_vec {
                if let Some((flat_properties, flat_required)) =
                    self.flattened_properties(&field.type_info, &module_path)
                {
                    properties.extend(flat_properties);
                    if !field.optional {
                        required.extend(flat_required);
                    }
                    continue;
                }
                debug!("Cannot flatten {}, keeping it as a property", field.type_info.name);
            }

            let json_name = field
                .serde_attrs
                .rename
                .as_ref()
                .unwrap_or(&field.name)
                .clone();

            let mut property = self.generate_schema_in(&field.type_info, Some(&module_path));
            let field_type = self
                .type_resolver
                .identity_from(&field.type_info.name, &module_path);
            self.customize(
                &FieldContext {
                    json_name: &json_name,
                    field_name: &field.name,
                    ty: &field_type,
                    tag: &field.serde_attrs,
                    parent: Some(&identity),
                },
                &mut property,
            );
            properties.insert(json_name.clone(), property);

            if !field.optional && !field.type_info.is_option {
                required.push(json_name);
            }
        }

        let mut schema = Schema {
            schema_type: Some("object".to_string()),
            properties: Some(properties),
            required: if required.is_empty() {
                None
            } else {
                Some(required)
            },
            ..Default::default()
        };
        self.customize(&FieldContext::root(&identity), &mut schema);

        self.in_progress.remove(&identity);
        self.schemas.insert(name.clone(), schema);
        name
    }

    /// Properties and required names a `#[serde(flatten)]` field contributes to its parent, or
    /// `None` when the field's type is not a struct of the crate
    fn flattened_properties(
        &mut self,
        type_info: &TypeInfo,
        module_path: &str,
    ) -> Option<(BTreeMap<String, Schema>, Vec<String>)> {
        let resolved = self.type_resolver.resolve_from(&type_info.name, module_path)?;
        let TypeKind::Struct(struct_def) = resolved.kind else {
            return None;
        };

        let name = self.generate_struct_schema(resolved.identity, struct_def);
        let schema = self.schemas.get(&name)?;
        Some((
            schema.properties.clone().unwrap_or_default(),
            schema.required.clone().unwrap_or_default(),
        ))
    }

    /// Generate a schema for an enum type and add it to the schemas collection, returning its
    /// component name
    fn generate_enum_schema(&mut self, identity: TypeIdentity, enum_def: EnumDef) -> String {
        let name = self.component_name(&identity);
        if self.schemas.contains_key(&name) {
            debug!("Schema for {} already exists", identity);
            return name;
        }

        debug!("Generating enum schema for: {}", identity);
        let mut schema = Schema {
            schema_type: Some("string".to_string()),
            enum_values: Some(enum_def.variants),
            ..Default::default()
        };
        self.customize(&FieldContext::root(&identity), &mut schema);
        self.schemas.insert(name.clone(), schema);
        name
    }

    fn customize(&self, field: &FieldContext<'_>, schema: &mut Schema) {
        if let Some(customizer) = &self.customizer {
            customizer.customize(field, schema);
        }
    }

    /// Get all generated schemas
    pub fn get_schemas(&self) -> &BTreeMap<String, Schema> {
        &self.schemas
    }

    /// Consume the generator, returning the generated schemas
    pub fn into_schemas(self) -> BTreeMap<String, Schema> {
        self.schemas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ParsedModule;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    fn create_generator_from_code(code: &str) -> SchemaGenerator {
        create_generator_from_modules(&[("demo", code)])
    }

    fn create_generator_from_modules(modules: &[(&str, &str)]) -> SchemaGenerator {
        let modules = modules
            .iter()
            .map(|(module_path, code)| ParsedModule {
                module_path: module_path.to_string(),
                file: PathBuf::from(format!("{}.rs", module_path.replace("::", "/"))),
                inline: false,
                attrs: Vec::new(),
                items: syn::parse_file(code).unwrap().items,
            })
            .collect();
        SchemaGenerator::new(TypeResolver::new(modules))
    }

    /// Records every hook invocation as (field name, parent name)
    #[derive(Clone, Default)]
    struct Recorder {
        calls: Rc<RefCell<Vec<(String, Option<String>)>>>,
    }

    impl SchemaCustomizer for Recorder {
        fn customize(&self, field: &FieldContext<'_>, schema: &mut Schema) {
            self.calls.borrow_mut().push((
                field.field_name.to_string(),
                field.parent.map(|p| p.name.clone()),
            ));
            schema.description = Some(format!("{}/{}", field.ty.name, field.json_name));
        }
    }

    #[test]
    fn test_primitive_types() {
        let mut generator = create_generator_from_code("");

        let schema = generator.generate_schema(&TypeInfo::new("String".to_string()));
        assert_eq!(schema.schema_type, Some("string".to_string()));
        assert!(schema.format.is_none());

        let schema = generator.generate_schema(&TypeInfo::new("i64".to_string()));
        assert_eq!(schema.schema_type, Some("integer".to_string()));
        assert_eq!(schema.format, Some("int64".to_string()));

        let schema = generator.generate_schema(&TypeInfo::new("f32".to_string()));
        assert_eq!(schema.schema_type, Some("number".to_string()));
        assert_eq!(schema.format, Some("float".to_string()));

        let schema = generator.generate_schema(&TypeInfo::new("bool".to_string()));
        assert_eq!(schema.schema_type, Some("boolean".to_string()));
    }

    #[test]
    fn test_vec_and_option_types() {
        let mut generator = create_generator_from_code("");

        let schema = generator.generate_schema(&TypeInfo::vec(TypeInfo::new("String".to_string())));
        assert_eq!(schema.schema_type, Some("array".to_string()));
        assert_eq!(
            schema.items.unwrap().schema_type,
            Some("string".to_string())
        );

        let schema = generator.generate_schema(&TypeInfo::option(TypeInfo::new("i32".to_string())));
        assert_eq!(schema.schema_type, Some("integer".to_string()));
        assert_eq!(schema.format, Some("int32".to_string()));
    }

    #[test]
    fn test_struct_schema_generation() {
        let code = r#"
            pub struct User {
                pub id: u32,
                #[serde(rename = "userName")]
                pub name: String,
                pub email: Option<String>,
                #[serde(skip)]
                pub password: String,
            }
        "#;

        let mut generator = create_generator_from_code(code);
        let schema = generator.add_type(&TypeIdentity::new("demo", "User"));
        assert_eq!(schema.reference, Some("#/components/schemas/User".to_string()));

        let user_schema = &generator.get_schemas()["User"];
        assert_eq!(user_schema.schema_type, Some("object".to_string()));

        let properties = user_schema.properties.as_ref().unwrap();
        assert_eq!(properties.len(), 3);
        assert!(properties.contains_key("userName"));
        assert!(!properties.contains_key("password"));

        let required = user_schema.required.as_ref().unwrap();
        assert_eq!(required, &vec!["id".to_string(), "userName".to_string()]);
    }

    #[test]
    fn test_enum_schema_generation() {
        let mut generator = create_generator_from_code("pub enum Status { Active, Inactive }");
        let schema = generator.generate_schema(&TypeInfo::new("Status".to_string()));

        assert_eq!(schema.reference, Some("#/components/schemas/Status".to_string()));
        let status_schema = &generator.get_schemas()["Status"];
        assert_eq!(status_schema.schema_type, Some("string".to_string()));
        assert_eq!(
            status_schema.enum_values,
            Some(vec!["Active".to_string(), "Inactive".to_string()])
        );
    }

    #[test]
    fn test_customizer_called_for_fields_and_types() {
        let code = r#"
            pub struct User {
                pub id: u32,
                #[serde(rename = "prof")]
                pub profile: Profile,
            }

            pub struct Profile {
                pub bio: String,
            }
        "#;

        let recorder = Recorder::default();
        let mut generator = create_generator_from_code(code).with_customizer(recorder.clone());
        generator.add_type(&TypeIdentity::new("demo", "User"));

        let calls = recorder.calls.borrow();
        assert_eq!(
            *calls,
            vec![
                ("id".to_string(), Some("User".to_string())),
                ("bio".to_string(), Some("Profile".to_string())),
                ("".to_string(), None),
                ("profile".to_string(), Some("User".to_string())),
                ("".to_string(), None),
            ]
        );

        let schemas = generator.get_schemas();
        let user = &schemas["User"];
        assert_eq!(user.description, Some("User/".to_string()));
        let properties = user.properties.as_ref().unwrap();
        assert_eq!(properties["id"].description, Some("u32/id".to_string()));
        assert_eq!(properties["prof"].description, Some("Profile/prof".to_string()));
        assert_eq!(schemas["Profile"].description, Some("Profile/".to_string()));
    }

    #[test]
    fn test_recursive_types_terminate() {
        let code = r#"
            pub struct Node {
                pub value: i32,
                pub children: Vec<Node>,
                pub parent: Option<Box<Node>>,
            }
        "#;

        let mut generator = create_generator_from_code(code);
        generator.add_type(&TypeIdentity::new("demo", "Node"));

        let schemas = generator.get_schemas();
        assert_eq!(schemas.len(), 1);
        let properties = schemas["Node"].properties.as_ref().unwrap();
        assert_eq!(
            properties["parent"].reference,
            Some("#/components/schemas/Node".to_string())
        );
    }

    #[test]
    fn test_unknown_type_fallback() {
        let mut generator = create_generator_from_code("");
        let schema = generator.generate_schema(&TypeInfo::new("UnknownType".to_string()));

        assert_eq!(schema.schema_type, Some("object".to_string()));
        assert!(schema.reference.is_none());
        assert!(generator.get_schemas().is_empty());
    }

    #[test]
    fn test_same_named_types_get_separate_components() {
        let recorder = Recorder::default();
        let mut generator = create_generator_from_modules(&[
            (
                "demo::a",
                "pub struct User { pub id: u32 }\npub struct Account { pub owner: User }",
            ),
            ("demo::b", "pub struct User { pub name: String }"),
        ])
        .with_customizer(recorder.clone());

        let schema = generator.add_type(&TypeIdentity::new("demo::b", "User"));
        assert_eq!(schema.reference, Some("#/components/schemas/User".to_string()));
        let properties = generator.get_schemas()["User"].properties.as_ref().unwrap();
        assert_eq!(properties.keys().collect::<Vec<_>>(), vec!["name"]);

        generator.add_type(&TypeIdentity::new("demo::a", "Account"));
        let schemas = generator.get_schemas();
        let owner = &schemas["Account"].properties.as_ref().unwrap()["owner"];
        assert_eq!(
            owner.reference,
            Some("#/components/schemas/demo.a.User".to_string())
        );
        let properties = schemas["demo.a.User"].properties.as_ref().unwrap();
        assert_eq!(properties.keys().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(schemas["User"].properties.as_ref().unwrap().len(), 1);

        generator.add_type(&TypeIdentity::new("demo::a", "User"));
        assert_eq!(generator.get_schemas().len(), 3);
    }

    #[test]
    fn test_flattened_fields_are_merged_into_parent() {
        let code = r#"
            pub struct Page {
                pub size: u32,
                #[serde(flatten)]
                pub meta: Meta,
                #[serde(flatten)]
                pub extra: Option<Extra>,
            }

            pub struct Meta {
                pub total: u64,
                pub cursor: Option<String>,
            }

            pub struct Extra {
                pub note: String,
            }
        "#;

        let mut generator = create_generator_from_code(code);
        generator.add_type(&TypeIdentity::new("demo", "Page"));

        let page = &generator.get_schemas()["Page"];
        let properties = page.properties.as_ref().unwrap();
        assert_eq!(
            properties.keys().collect::<Vec<_>>(),
            vec!["cursor", "note", "size", "total"]
        );
        assert_eq!(
            page.required.as_ref().unwrap(),
            &vec!["size".to_string(), "total".to_string()]
        );
    }

    #[test]
    fn test_flatten_of_unknown_type_stays_a_property() {
        let code = r#"
            pub struct Event {
                #[serde(flatten)]
                pub rest: HashMap<String, String>,
            }
        "#;

        let mut generator = create_generator_from_code(code);
        generator.add_type(&TypeIdentity::new("demo", "Event"));

        let properties = generator.get_schemas()["Event"].properties.as_ref().unwrap();
        assert_eq!(properties["rest"].schema_type, Some("object".to_string()));
    }
}
