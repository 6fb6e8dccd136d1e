//! Builds the name → description index of a type and answers description queries.
//!
//! Every query here loads and parses the module again, so results always reflect the source as
//! it is on disk at the time of the call.

use crate::error::{Error, Result};
use crate::extractor::description_of;
use crate::identity::{FunctionIdentity, TypeIdentity};
use crate::loader::SourceLoader;
use crate::locator::{locate_type, resolve_function, DeclarationBlock, TypeEntry, TypeEntryKind};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key under which a [`CommentIndex`] stores the owning type's own description.
pub const ROOT_KEY: &str = "";

/// Field name → description of one type, with the type's own description under [`ROOT_KEY`].
///
/// Undocumented fields map to the empty string; they are never left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentIndex(BTreeMap<String, String>);

impl CommentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The type's own description, empty if none was recorded.
    pub fn root(&self) -> &str {
        self.0.get(ROOT_KEY).map(String::as_str).unwrap_or_default()
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        if name == ROOT_KEY {
            return None;
        }
        self.0.get(name).map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, description: impl Into<String>) {
        self.0.insert(key.into(), description.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The description of a type entry.
///
/// A block holding exactly one entry is documented by the block's comment; when that is empty,
/// or the block groups several entries, the entry's own comment is used.
pub fn root_description(block: &DeclarationBlock<'_>, entry: &TypeEntry<'_>) -> String {
    let mut description = String::new();
    if block.entries.len() == 1 {
        description = description_of(block.docs);
    }
    if description.is_empty() {
        description = description_of(entry.docs);
    }
    description
}

/// Builds the comment index of a type entry.
///
/// Struct fields are documented only by their own comments. Named fields are keyed by name,
/// tuple fields by position. Non-struct types only get the root entry.
pub fn build_index(block: &DeclarationBlock<'_>, entry: &TypeEntry<'_>) -> CommentIndex {
    let mut index = CommentIndex::new();
    index.insert(ROOT_KEY, root_description(block, entry));

    let TypeEntryKind::Struct(item_struct) = entry.kind else {
        debug!("{}", Error::NotAStruct { name: entry.name() });
        return index;
    };

    for (position, field) in item_struct.fields.iter().enumerate() {
        let key = match &field.ident {
            Some(ident) => ident.to_string(),
            None => position.to_string(),
        };
        index.insert(key, description_of(&field.attrs));
    }

    debug!("Indexed {} fields of {}", index.len() - 1, entry.name());
    index
}

/// The comment index of `ty`, read fresh from source.
///
/// A type that cannot be found yields an empty index.
///
/// # Errors
///
/// Returns an error if the type's module cannot be loaded.
pub fn comment_index(loader: &SourceLoader, ty: &TypeIdentity) -> Result<CommentIndex> {
    let module = loader.load(&ty.module_path)?;
    match locate_type(&module, &ty.name) {
        Ok((block, entry)) => Ok(build_index(&block, &entry)),
        Err(e @ Error::TypeNotFound { .. }) => {
            warn!("{}", e);
            Ok(CommentIndex::new())
        }
        Err(e) => Err(e),
    }
}

/// The description of `ty` itself.
///
/// # Errors
///
/// Returns [`Error::TypeNotFound`] if the type is not declared in its module, or a load error.
pub fn type_description(loader: &SourceLoader, ty: &TypeIdentity) -> Result<String> {
    let module = loader.load(&ty.module_path)?;
    let (block, entry) = locate_type(&module, &ty.name)?;
    Ok(root_description(&block, &entry))
}

/// The description of field `field` of `ty`.
///
/// # Errors
///
/// Returns [`Error::TypeNotFound`] or [`Error::FieldNotFound`] when either is missing, or a load
/// error.
pub fn field_description(loader: &SourceLoader, ty: &TypeIdentity, field: &str) -> Result<String> {
    let module = loader.load(&ty.module_path)?;
    let (block, entry) = locate_type(&module, &ty.name)?;
    build_index(&block, &entry)
        .field(field)
        .map(str::to_string)
        .ok_or_else(|| Error::FieldNotFound {
            ty: ty.qualified_name(),
            field: field.to_string(),
        })
}

/// The description of a function or method.
///
/// # Errors
///
/// Returns [`Error::FunctionNotFound`] if no declaration matches, or a load error.
pub fn function_description(loader: &SourceLoader, function: &FunctionIdentity) -> Result<String> {
    let declaration = resolve_function(loader, function)?;
    Ok(description_of(&declaration.attrs))
}
