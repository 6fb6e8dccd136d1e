//! Identities of the declarations whose documentation is looked up.
//!
//! Rust has no runtime reflection over fields, but `std::any::type_name` gives the full path of
//! any type and `std::any::type_name_of_val` the path of a function item. These are split into a
//! module path and a bare name, which is all the loader and locator need to find a declaration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Path separator used by module paths and runtime symbols.
pub const PATH_SEPARATOR: &str = "::";

/// Suffix marking a symbol that refers to a method of a receiver type rather than a free
/// function, e.g. `demo::models::MyType::describe::{{method}}`.
pub const BOUND_METHOD_MARKER: &str = "::{{method}}";

/// A type, identified by the module it is declared in and its bare name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeIdentity {
    /// Module path, e.g. `demo::models`
    pub module_path: String,
    /// Bare type name without generic arguments, e.g. `MyType`
    pub name: String,
}

impl TypeIdentity {
    pub fn new(module_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module_path: module_path.into(),
            name: name.into(),
        }
    }

    /// Derives the identity of `T` from `std::any::type_name`.
    ///
    /// Generic arguments are dropped, so `demo::Page<demo::User>` becomes `demo::Page`.
    /// Types without a path (primitives, references) get an empty module path.
    pub fn of<T: ?Sized>() -> Self {
        Self::from_type_name(std::any::type_name::<T>())
    }

    /// Splits a full type path at its last separator.
    pub fn from_type_name(type_name: &str) -> Self {
        let path = strip_generic_args(type_name);
        match path.rsplit_once(PATH_SEPARATOR) {
            Some((module, name)) => Self::new(module, name),
            None => Self::new("", path),
        }
    }

    /// The fully qualified path, `module::Name`.
    pub fn qualified_name(&self) -> String {
        if self.module_path.is_empty() {
            self.name.clone()
        } else {
            format!("{}{}{}", self.module_path, PATH_SEPARATOR, self.name)
        }
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

/// A named field of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldIdentity {
    pub ty: TypeIdentity,
    pub field: String,
}

impl FieldIdentity {
    pub fn new(ty: TypeIdentity, field: impl Into<String>) -> Self {
        Self {
            ty,
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.ty, self.field)
    }
}

/// A free function or a method, identified by module path, optional receiver type and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionIdentity {
    pub module_path: String,
    /// The `impl` self type for methods, when known
    pub receiver: Option<String>,
    pub name: String,
}

impl FunctionIdentity {
    /// Explicitly registers a function by module path and name.
    pub fn new(module_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module_path: module_path.into(),
            receiver: None,
            name: name.into(),
        }
    }

    /// Explicitly registers a method of `receiver` declared in `module_path`.
    pub fn method(
        module_path: impl Into<String>,
        receiver: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            module_path: module_path.into(),
            receiver: Some(receiver.into()),
            name: name.into(),
        }
    }

    /// Identity of a function item, from its runtime symbol.
    pub fn of_fn<F: ?Sized>(f: &F) -> Result<Self> {
        Self::from_symbol(std::any::type_name_of_val(f))
    }

    /// Identity of a method item, treating the last path segment before the name as the
    /// receiver type.
    pub fn of_method<F: ?Sized>(f: &F) -> Result<Self> {
        Self::from_symbol(&format!(
            "{}{}",
            std::any::type_name_of_val(f),
            BOUND_METHOD_MARKER
        ))
    }

    /// Decodes a runtime symbol such as `demo::api::handler` or
    /// `demo::api::Server::start::{{method}}`.
    ///
    /// With the bound-method marker, everything but the last two segments is the module path,
    /// the segment before the marker is the name and the one before it the receiver. Without
    /// it, everything but the last segment is the module path.
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        let (path, bound) = match symbol.strip_suffix(BOUND_METHOD_MARKER) {
            Some(rest) => (rest, true),
            None => (symbol, false),
        };
        let path = strip_generic_args(path);
        let segments: Vec<&str> = path
            .split(PATH_SEPARATOR)
            .filter(|s| !s.is_empty())
            .collect();

        let identity = if bound {
            if segments.len() < 3 {
                return Err(Error::InvalidSymbol(symbol.to_string()));
            }
            let n = segments.len();
            Self::method(segments[..n - 2].join(PATH_SEPARATOR), segments[n - 2], segments[n - 1])
        } else {
            match segments.split_last() {
                Some((name, module)) if !module.is_empty() => {
                    Self::new(module.join(PATH_SEPARATOR), *name)
                }
                _ => return Err(Error::InvalidSymbol(symbol.to_string())),
            }
        };

        Ok(identity)
    }
}

impl fmt::Display for FunctionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.receiver {
            Some(receiver) => write!(f, "{}::{}::{}", self.module_path, receiver, self.name),
            None => write!(f, "{}::{}", self.module_path, self.name),
        }
    }
}

/// Splits a module path into its non-empty segments.
pub fn path_segments(module_path: &str) -> Vec<&str> {
    module_path
        .split(PATH_SEPARATOR)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Removes every `<...>` group, including nested ones.
fn strip_generic_args(path: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}
