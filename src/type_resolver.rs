use crate::identity::TypeIdentity;
use crate::loader::ParsedModule;
use log::{debug, warn};
use std::collections::HashMap;

/// Type resolver - resolves type names to structured type information across a crate's modules
///
/// Several modules may declare a type with the same name. [`resolve_identity`] only looks in the
/// module it is given, [`resolve_from`] prefers the module a reference appears in, and
/// [`resolve_type`] takes the first declaration in any module.
///
/// [`resolve_identity`]: TypeResolver::resolve_identity
/// [`resolve_from`]: TypeResolver::resolve_from
/// [`resolve_type`]: TypeResolver::resolve_type
pub struct TypeResolver {
    /// All parsed modules of the crate
    modules: Vec<ParsedModule>,
    /// Cache of parsed definitions, keyed by qualified type name
    type_cache: HashMap<String, ResolvedType>,
}

/// Which modules a lookup by name may match
#[derive(Debug, Clone, Copy)]
enum Scope<'a> {
    Any,
    Exact(&'a str),
    Prefer(&'a str),
}

/// Type information extracted from a field's declared type.
///
/// Captures what schema generation needs to know about a Rust type, including generic
/// arguments and the `Option`/`Vec` wrappers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// The base type name (e.g., "String", "User", "i32")
    pub name: String,
    /// Whether this is a generic type with type parameters
    pub is_generic: bool,
    /// Generic type arguments (e.g., for `Vec<String>`, contains TypeInfo for String)
    pub generic_args: Vec<TypeInfo>,
    /// Whether this type is wrapped in `Option<T>`
    pub is_option: bool,
    /// Whether this type is a `Vec<T>` (array type)
    pub is_vec: bool,
}

impl TypeInfo {
    /// Create a new TypeInfo for a simple type
    pub fn new(name: String) -> Self {
        Self {
            name,
            is_generic: false,
            generic_args: Vec::new(),
            is_option: false,
            is_vec: false,
        }
    }

    /// Create a TypeInfo for an `Option<T>` type
    pub fn option(inner: TypeInfo) -> Self {
        Self {
            name: inner.name.clone(),
            is_generic: false,
            generic_args: vec![inner],
            is_option: true,
            is_vec: false,
        }
    }

    /// Create a TypeInfo for a `Vec<T>` type
    pub fn vec(inner: TypeInfo) -> Self {
        Self {
            name: inner.name.clone(),
            is_generic: false,
            generic_args: vec![inner],
            is_option: false,
            is_vec: true,
        }
    }
}

/// Resolved type information
#[derive(Debug, Clone)]
pub struct ResolvedType {
    /// Where the type is declared; primitives have an empty module path
    pub identity: TypeIdentity,
    /// The kind of type (struct, enum, primitive, etc.)
    pub kind: TypeKind,
}

/// Type kind - represents different categories of types
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// A struct type with fields
    Struct(StructDef),
    /// An enum type with variants
    Enum(EnumDef),
    /// A primitive type (String, i32, etc.)
    Primitive(PrimitiveType),
}

/// Struct definition with fields
#[derive(Debug, Clone)]
pub struct StructDef {
    /// The named fields of the struct
    pub fields: Vec<FieldDef>,
}

/// Field definition in a struct
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Type information for the field
    pub type_info: TypeInfo,
    /// Whether the field is optional (wrapped in `Option<T>`)
    pub optional: bool,
    /// Serde attributes applied to this field
    pub serde_attrs: SerdeAttributes,
}

/// Enum definition with variants
#[derive(Debug, Clone)]
pub struct EnumDef {
    /// The variants of the enum
    pub variants: Vec<String>,
}

/// Primitive types supported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    I8,
    I16,
    I32,
    I64,
    I128,
    U8,
    U16,
    U32,
    U64,
    U128,
    F32,
    F64,
    Bool,
    Char,
}

/// Serde attributes for a field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerdeAttributes {
    /// Renamed field name
    pub rename: Option<String>,
    /// Whether to skip this field during serialization
    pub skip: bool,
    /// Whether to flatten this field; the schema generator merges the properties of a flattened
    /// struct into its parent
    pub flatten: bool,
}

impl TypeResolver {
    /// Create a new TypeResolver over parsed modules
    pub fn new(modules: Vec<ParsedModule>) -> Self {
        debug!("Initializing TypeResolver with {} modules", modules.len());
        Self {
            modules,
            type_cache: HashMap::new(),
        }
    }

    /// Find the struct or enum named `name` among the modules accepted by `scope`
    fn find_definition(&self, name: &str, scope: Scope<'_>) -> Option<(&ParsedModule, &syn::Item)> {
        let found = match scope {
            Scope::Any => self.find_in(name, |_| true),
            Scope::Exact(module_path) => self.find_in(name, |m| m.module_path == module_path),
            Scope::Prefer(module_path) => self
                .find_in(name, |m| m.module_path == module_path)
                .or_else(|| self.find_in(name, |_| true)),
        };

        match found {
            Some((module, _)) => debug!("Found {} in {}", name, module.module_path),
            None => debug!("Definition of {} not found ({:?})", name, scope),
        }
        found
    }

    fn find_in(
        &self,
        name: &str,
        accept: impl Fn(&ParsedModule) -> bool,
    ) -> Option<(&ParsedModule, &syn::Item)> {
        self.modules
            .iter()
            .filter(|module| accept(module))
            .find_map(|module| {
                module
                    .items
                    .iter()
                    .find(|item| match item {
                        syn::Item::Struct(item_struct) => item_struct.ident == name,
                        syn::Item::Enum(item_enum) => item_enum.ident == name,
                        _ => false,
                    })
                    .map(|item| (module, item))
            })
    }

    /// Resolve a type by name, taking the first declaration in any module
    pub fn resolve_type(&mut self, type_name: &str) -> Option<ResolvedType> {
        self.resolve(type_name, Scope::Any)
    }

    /// Resolve the type declared exactly at `ty`
    pub fn resolve_identity(&mut self, ty: &TypeIdentity) -> Option<ResolvedType> {
        if ty.module_path.is_empty() {
            return self.resolve(&ty.name, Scope::Any);
        }
        self.resolve(&ty.name, Scope::Exact(&ty.module_path))
    }

    /// Resolve a type named inside `module_path`, preferring a declaration in that module
    pub fn resolve_from(&mut self, type_name: &str, module_path: &str) -> Option<ResolvedType> {
        self.resolve(type_name, Scope::Prefer(module_path))
    }

    fn resolve(&mut self, type_name: &str, scope: Scope<'_>) -> Option<ResolvedType> {
        debug!("Resolving type: {}", type_name);

        if let Some(primitive) = Self::parse_primitive_type(type_name) {
            return Some(ResolvedType {
                identity: TypeIdentity::new("", type_name),
                kind: TypeKind::Primitive(primitive),
            });
        }

        let Some((module, item)) = self.find_definition(type_name, scope) else {
            warn!("Could not resolve type: {}", type_name);
            return None;
        };

        let key = TypeIdentity::new(module.module_path.as_str(), type_name).qualified_name();
        if let Some(cached) = self.type_cache.get(&key) {
            debug!("Type {} found in cache", key);
            return Some(cached.clone());
        }

        let resolved = match item {
            syn::Item::Struct(item_struct) => {
                Self::parse_struct_definition(&module.module_path, item_struct)
            }
            syn::Item::Enum(item_enum) => Self::parse_enum_definition(&module.module_path, item_enum),
            _ => return None,
        };

        self.type_cache.insert(key, resolved.clone());
        Some(resolved)
    }

    /// The identity of a type named inside `module_path`: its declaring module when it is
    /// declared in the crate, otherwise an empty module path.
    pub fn identity_from(&mut self, type_name: &str, module_path: &str) -> TypeIdentity {
        self.resolve_from(type_name, module_path)
            .map(|resolved| resolved.identity)
            .unwrap_or_else(|| TypeIdentity::new("", type_name))
    }

    fn parse_struct_definition(module_path: &str, item_struct: &syn::ItemStruct) -> ResolvedType {
        let struct_name = item_struct.ident.to_string();
        debug!("Parsing struct definition: {}", struct_name);

        let fields: Vec<FieldDef> = match &item_struct.fields {
            syn::Fields::Named(named_fields) => {
                named_fields.named.iter().filter_map(Self::parse_field).collect()
            }
            _ => Vec::new(),
        };
        debug!("Parsed {} fields", fields.len());

        ResolvedType {
            identity: TypeIdentity::new(module_path, struct_name),
            kind: TypeKind::Struct(StructDef { fields }),
        }
    }

    fn parse_enum_definition(module_path: &str, item_enum: &syn::ItemEnum) -> ResolvedType {
        let enum_name = item_enum.ident.to_string();
        debug!("Parsing enum definition: {}", enum_name);

        let variants: Vec<String> = item_enum
            .variants
            .iter()
            .map(|v| v.ident.to_string())
            .collect();

        ResolvedType {
            identity: TypeIdentity::new(module_path, enum_name),
            kind: TypeKind::Enum(EnumDef { variants }),
        }
    }

    fn parse_field(field: &syn::Field) -> Option<FieldDef> {
        let field_name = field.ident.as_ref()?.to_string();
        debug!("Parsing field: {}", field_name);

        let type_info = Self::extract_type_info(&field.ty);
        let optional = type_info.is_option;
        let serde_attrs = Self::parse_serde_attributes(&field.attrs);

        Some(FieldDef {
            name: field_name,
            type_info,
            optional,
            serde_attrs,
        })
    }

    /// Parse `#[serde(...)]` field attributes
    fn parse_serde_attributes(attrs: &[syn::Attribute]) -> SerdeAttributes {
        let mut serde_attrs = SerdeAttributes::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            let parsed = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value: syn::LitStr = meta.value()?.parse()?;
                    serde_attrs.rename = Some(value.value());
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    serde_attrs.skip = true;
                } else if meta.path.is_ident("flatten") {
                    serde_attrs.flatten = true;
                } else if meta.input.peek(syn::Token![=]) {
                    // Consume values of attributes we don't track, e.g. `default = "path"`
                    let _: syn::Expr = meta.value()?.parse()?;
                } else if meta.input.peek(syn::token::Paren) {
                    let _content;
                    syn::parenthesized!(_content in meta.input);
                }
                Ok(())
            });
            if let Err(e) = parsed {
                debug!("Ignoring unparsable serde attribute: {}", e);
            }
        }

        serde_attrs
    }

    /// Extract TypeInfo from a syn::Type
    fn extract_type_info(ty: &syn::Type) -> TypeInfo {
        match ty {
            syn::Type::Path(type_path) => Self::extract_type_info_from_path(&type_path.path),
            syn::Type::Reference(reference) => Self::extract_type_info(&reference.elem),
            syn::Type::Slice(slice) => TypeInfo::vec(Self::extract_type_info(&slice.elem)),
            syn::Type::Array(array) => TypeInfo::vec(Self::extract_type_info(&array.elem)),
            _ => TypeInfo::new("Unknown".to_string()),
        }
    }

    fn first_type_arg(segment: &syn::PathSegment) -> Option<&syn::Type> {
        match &segment.arguments {
            syn::PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
                syn::GenericArgument::Type(inner_ty) => Some(inner_ty),
                _ => None,
            }),
            _ => None,
        }
    }

    fn extract_type_info_from_path(path: &syn::Path) -> TypeInfo {
        let Some(segment) = path.segments.last() else {
            return TypeInfo::new("Unknown".to_string());
        };
        let type_name = segment.ident.to_string();

        match (type_name.as_str(), Self::first_type_arg(segment)) {
            ("Option", Some(inner)) => return TypeInfo::option(Self::extract_type_info(inner)),
            ("Vec" | "VecDeque" | "HashSet" | "BTreeSet", Some(inner)) => {
                return TypeInfo::vec(Self::extract_type_info(inner))
            }
            // Smart pointers are transparent to serialization
            ("Box" | "Rc" | "Arc", Some(inner)) => return Self::extract_type_info(inner),
            _ => {}
        }

        let generic_args: Vec<TypeInfo> = match &segment.arguments {
            syn::PathArguments::AngleBracketed(args) => args
                .args
                .iter()
                .filter_map(|arg| match arg {
                    syn::GenericArgument::Type(inner_ty) => Some(Self::extract_type_info(inner_ty)),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        TypeInfo {
            name: type_name,
            is_generic: !generic_args.is_empty(),
            generic_args,
            is_option: false,
            is_vec: false,
        }
    }

    /// Parse a primitive type name
    fn parse_primitive_type(type_name: &str) -> Option<PrimitiveType> {
        match type_name {
            "String" | "str" => Some(PrimitiveType::String),
            "i8" => Some(PrimitiveType::I8),
            "i16" => Some(PrimitiveType::I16),
            "i32" => Some(PrimitiveType::I32),
            "i64" | "isize" => Some(PrimitiveType::I64),
            "i128" => Some(PrimitiveType::I128),
            "u8" => Some(PrimitiveType::U8),
            "u16" => Some(PrimitiveType::U16),
            "u32" => Some(PrimitiveType::U32),
            "u64" | "usize" => Some(PrimitiveType::U64),
            "u128" => Some(PrimitiveType::U128),
            "f32" => Some(PrimitiveType::F32),
            "f64" => Some(PrimitiveType::F64),
            "bool" => Some(PrimitiveType::Bool),
            "char" => Some(PrimitiveType::Char),
            _ => None,
        }
    }
}
