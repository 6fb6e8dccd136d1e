use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for declaration lookup and description extraction
#[derive(Debug)]
pub enum Error {
    /// A source file of the module could not be read or parsed
    Load { module: String, file: PathBuf, message: String },
    /// The module path does not resolve to any file or inline module of the crate
    ModuleNotFound { module: String },
    TypeNotFound { module: String, name: String },
    FieldNotFound { ty: String, field: String },
    FunctionNotFound { module: String, name: String },
    /// The type was found but is not a struct, so it has no fields to index
    NotAStruct { name: String },
    InvalidSymbol(String),
    SerializationError(String),
}

impl Error {
    /// Soft errors mean "nothing documented here"; anything else is a load failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::TypeNotFound { .. }
                | Error::FieldNotFound { .. }
                | Error::FunctionNotFound { .. }
                | Error::NotAStruct { .. }
        )
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Load { module, file, message } => {
                write!(f, "failed to load module {} from {}: {}", module, file.display(), message)
            }
            Error::ModuleNotFound { module } => write!(f, "module not found: {}", module),
            Error::TypeNotFound { module, name } => {
                write!(f, "type {} not found in module {}", name, module)
            }
            Error::FieldNotFound { ty, field } => {
                write!(f, "field {} not found in type {}", field, ty)
            }
            Error::FunctionNotFound { module, name } => {
                write!(f, "function {} not found in module {}", name, module)
            }
            Error::NotAStruct { name } => write!(f, "type {} is not a struct", name),
            Error::InvalidSymbol(symbol) => write!(f, "cannot decode function symbol: {}", symbol),
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML serialization error: {}", err))
    }
}
