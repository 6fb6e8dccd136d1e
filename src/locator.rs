//! Finds the declarations matching a type name or function identity in a parsed module.

use crate::error::{Error, Result};
use crate::identity::{FunctionIdentity, PATH_SEPARATOR};
use crate::loader::{ParsedModule, SourceLoader};
use log::debug;
use syn::{Attribute, Ident, ImplItem, Item, Signature};

/// A syntactic unit grouping one or more type entries, with its own documentation.
///
/// In a file module every type item is a block of its own. In an inline module all type items
/// form a single block documented by the `mod` item's doc comment.
#[derive(Debug, Clone)]
pub struct DeclarationBlock<'m> {
    pub docs: &'m [Attribute],
    pub entries: Vec<TypeEntry<'m>>,
}

/// One named type declaration.
#[derive(Debug, Clone, Copy)]
pub struct TypeEntry<'m> {
    pub ident: &'m Ident,
    pub docs: &'m [Attribute],
    pub kind: TypeEntryKind<'m>,
}

#[derive(Debug, Clone, Copy)]
pub enum TypeEntryKind<'m> {
    Struct(&'m syn::ItemStruct),
    Enum(&'m syn::ItemEnum),
    Union(&'m syn::ItemUnion),
    Alias(&'m syn::ItemType),
}

impl<'m> TypeEntry<'m> {
    fn from_item(item: &'m Item) -> Option<Self> {
        let (ident, attrs, kind) = match item {
            Item::Struct(s) => (&s.ident, &s.attrs, TypeEntryKind::Struct(s)),
            Item::Enum(e) => (&e.ident, &e.attrs, TypeEntryKind::Enum(e)),
            Item::Union(u) => (&u.ident, &u.attrs, TypeEntryKind::Union(u)),
            Item::Type(t) => (&t.ident, &t.attrs, TypeEntryKind::Alias(t)),
            _ => return None,
        };
        Some(Self {
            ident,
            docs: attrs,
            kind,
        })
    }

    pub fn name(&self) -> String {
        self.ident.to_string()
    }
}

/// Splits a module's items into declaration blocks.
pub fn declaration_blocks(module: &ParsedModule) -> Vec<DeclarationBlock<'_>> {
    let entries = module.items.iter().filter_map(TypeEntry::from_item);

    if module.inline {
        let entries: Vec<TypeEntry<'_>> = entries.collect();
        if entries.is_empty() {
            return Vec::new();
        }
        vec![DeclarationBlock {
            docs: &module.attrs,
            entries,
        }]
    } else {
        entries
            .map(|entry| DeclarationBlock {
                docs: entry.docs,
                entries: vec![entry],
            })
            .collect()
    }
}

/// Finds the type named `name` in `module`, returning its block and entry.
///
/// # Errors
///
/// Returns [`Error::TypeNotFound`] if the module declares no such type.
pub fn locate_type<'m>(
    module: &'m ParsedModule,
    name: &str,
) -> Result<(DeclarationBlock<'m>, TypeEntry<'m>)> {
    debug!("Searching for type {} in {}", name, module.module_path);

    for block in declaration_blocks(module) {
        if let Some(entry) = block.entries.iter().find(|e| e.ident == name).copied() {
            debug!("Found type {} in {}", name, module.file.display());
            return Ok((block, entry));
        }
    }

    debug!("Type {} not found in {}", name, module.module_path);
    Err(Error::TypeNotFound {
        module: module.module_path.clone(),
        name: name.to_string(),
    })
}

/// A located function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeclaration {
    pub module_path: String,
    /// Self type of the `impl` block declaring the method, `None` for free functions
    pub receiver: Option<String>,
    pub signature: Signature,
    pub attrs: Vec<Attribute>,
}

impl FunctionDeclaration {
    pub fn name(&self) -> String {
        self.signature.ident.to_string()
    }
}

/// Finds the function `name` in `module`.
///
/// Free functions and methods of inherent or trait `impl` blocks are scanned in source order.
/// With a `receiver`, only methods of `impl` blocks for that self type match.
///
/// # Errors
///
/// Returns [`Error::FunctionNotFound`] if nothing matches.
pub fn locate_function(
    module: &ParsedModule,
    name: &str,
    receiver: Option<&str>,
) -> Result<FunctionDeclaration> {
    debug!(
        "Searching for function {} (receiver: {:?}) in {}",
        name, receiver, module.module_path
    );

    for item in &module.items {
        match item {
            Item::Fn(f) if receiver.is_none() && f.sig.ident == name => {
                return Ok(FunctionDeclaration {
                    module_path: module.module_path.clone(),
                    receiver: None,
                    signature: f.sig.clone(),
                    attrs: f.attrs.clone(),
                });
            }
            Item::Impl(item_impl) => {
                let self_ty = self_type_name(&item_impl.self_ty);
                if receiver.is_some() && self_ty.as_deref() != receiver {
                    continue;
                }
                for impl_item in &item_impl.items {
                    if let ImplItem::Fn(method) = impl_item {
                        if method.sig.ident == name {
                            return Ok(FunctionDeclaration {
                                module_path: module.module_path.clone(),
                                receiver: self_ty,
                                signature: method.sig.clone(),
                                attrs: method.attrs.clone(),
                            });
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Err(Error::FunctionNotFound {
        module: module.module_path.clone(),
        name: name.to_string(),
    })
}

/// Loads the module named by `identity` and locates the function in it.
///
/// A plain symbol of an associated function, `demo::models::MyType::describe`, decodes to the
/// module path `demo::models::MyType`. When that path does not resolve and no receiver is
/// known, its last segment is retried as the receiver type in the parent module.
pub fn resolve_function(
    loader: &SourceLoader,
    identity: &FunctionIdentity,
) -> Result<FunctionDeclaration> {
    match loader.load(&identity.module_path) {
        Ok(module) => locate_function(&module, &identity.name, identity.receiver.as_deref()),
        Err(Error::ModuleNotFound { module }) if identity.receiver.is_none() => {
            let Some((parent, receiver)) = module
                .rsplit_once(PATH_SEPARATOR)
                .map(|(parent, receiver)| (parent.to_string(), receiver.to_string()))
            else {
                return Err(Error::ModuleNotFound { module });
            };
            debug!("Retrying {} as a method of {}", identity.name, receiver);
            let parent_module = loader.load(&parent)?;
            locate_function(&parent_module, &identity.name, Some(&receiver))
        }
        Err(e) => Err(e),
    }
}

/// The last path segment of an `impl` self type, e.g. `Store` for `Store<T>`.
fn self_type_name(ty: &syn::Type) -> Option<String> {
    match ty {
        syn::Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        _ => None,
    }
}
