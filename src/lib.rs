//! schema-doc-comments - Rust doc comments as schema descriptions.
//!
//! Given the identity of a type, a field, or a function, this library finds the matching
//! declaration in a crate's source and returns the text of its `///` comment. A
//! [`SchemaCustomizer`](customizer::SchemaCustomizer) hook copies those descriptions into the
//! schemas built by [`schema_generator`].
//!
//! # Architecture
//!
//! 1. [`identity`] - Type, field and function identities, derived from `std::any::type_name`
//! 2. [`scanner`] / [`loader`] - Finds and parses the source of a module path
//! 3. [`locator`] - Finds type and function declarations in a parsed module
//! 4. [`extractor`] - Normalizes doc comments into description strings
//! 5. [`indexer`] - Builds per-type comment indexes and answers live description queries
//! 6. [`registry`] - Pre-built description table for a whole crate
//! 7. [`customizer`] - The schema hook and the description customizer
//! 8. [`type_resolver`] / [`schema_generator`] / [`openapi_builder`] - Generate schemas
//! 9. [`serializer`] - Serializes documents to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use schema_doc_comments::{
//!     customizer::DescriptionCustomizer,
//!     identity::TypeIdentity,
//!     indexer::comment_index,
//!     loader::SourceLoader,
//!     openapi_builder::OpenApiBuilder,
//!     schema_generator::SchemaGenerator,
//!     serializer::serialize_yaml,
//!     type_resolver::TypeResolver,
//! };
//!
//! let loader = SourceLoader::new("./my-crate/src", "my_crate");
//!
//! // Descriptions of one type
//! let index = comment_index(&loader, &TypeIdentity::new("my_crate::models", "User")).unwrap();
//! println!("{}", index.root());
//!
//! // Documented schemas
//! let sources = loader.load_crate().unwrap();
//! let mut schema_gen = SchemaGenerator::new(TypeResolver::new(sources.modules))
//!     .with_customizer(DescriptionCustomizer::new(loader.clone()));
//! let mut builder = OpenApiBuilder::new();
//! builder.add_type(&TypeIdentity::new("my_crate::models", "User"), &mut schema_gen);
//! println!("{}", serialize_yaml(&builder.build(schema_gen)).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod customizer;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod indexer;
pub mod loader;
pub mod locator;
pub mod openapi_builder;
pub mod registry;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod type_resolver;
