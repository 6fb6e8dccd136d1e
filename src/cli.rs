use crate::customizer::DescriptionCustomizer;
use crate::identity::{FunctionIdentity, TypeIdentity};
use crate::indexer::function_description;
use crate::loader::SourceLoader;
use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use crate::registry::DescriptionRegistry;
use crate::schema_generator::SchemaGenerator;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::type_resolver::TypeResolver;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Extract Rust doc comments as descriptions for generated schemas
#[derive(Parser, Debug)]
#[command(name = "schema-doc-comments")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the crate directory
    #[arg(value_name = "CRATE_PATH")]
    pub crate_path: PathBuf,

    /// Crate name used as the first module path segment (defaults to the directory name)
    #[arg(long = "crate-name", value_name = "NAME")]
    pub crate_name: Option<String>,

    /// Source directory, relative to the crate path
    #[arg(long = "src", value_name = "DIR", default_value = "src")]
    pub src_dir: PathBuf,

    /// Root type to generate a documented schema for, e.g. my_crate::models::User
    #[arg(short = 't', long = "type", value_name = "TYPE_PATH")]
    pub types: Vec<String>,

    /// Function symbol to describe, e.g. my_crate::api::handler or my_crate::Server::run::{{method}}
    #[arg(long = "function", value_name = "SYMBOL", conflicts_with = "types")]
    pub functions: Vec<String>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

impl CliArgs {
    /// The crate name given on the command line, or the crate directory's name.
    pub fn crate_name(&self) -> Result<String> {
        if let Some(name) = &self.crate_name {
            return Ok(name.clone());
        }
        let path = self
            .crate_path
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", self.crate_path.display()))?;
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("Cannot infer crate name from {}", path.display()))
    }
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.crate_path.exists() {
        anyhow::bail!("Crate path does not exist: {}", args.crate_path.display());
    }

    if !args.crate_path.is_dir() {
        anyhow::bail!("Crate path is not a directory: {}", args.crate_path.display());
    }

    info!("Crate path: {}", args.crate_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    let crate_name = args.crate_name()?;
    let loader = SourceLoader::new(args.crate_path.join(&args.src_dir), &crate_name);
    info!(
        "Reading crate {} from {}",
        loader.crate_name(),
        loader.src_root().display()
    );

    let content = if !args.types.is_empty() {
        let document = build_document(&loader, &args.types)?;
        render(&document, args.output_format)?
    } else if !args.functions.is_empty() {
        let descriptions = describe_functions(&loader, &args.functions)?;
        render(&descriptions, args.output_format)?
    } else {
        let registry = DescriptionRegistry::build(&loader)
            .with_context(|| format!("Failed to index {}", loader.src_root().display()))?;
        for warning in registry.warnings() {
            warn!("{}", warning);
        }
        info!("Indexed {} types", registry.len());
        render(&registry, args.output_format)?
    };

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
    } else {
        println!("{}", content);
    }

    Ok(())
}

/// Generates an OpenAPI document for the given root types, with descriptions read live from
/// the crate's source.
pub fn build_document(
    loader: &SourceLoader,
    type_paths: &[String],
) -> Result<OpenApiDocument> {
    let sources = loader
        .load_crate()
        .with_context(|| format!("Failed to load {}", loader.src_root().display()))?;
    for warning in &sources.warnings {
        warn!("{}", warning);
    }
    info!("Loaded {} modules", sources.modules.len());

    let mut schema_gen = SchemaGenerator::new(TypeResolver::new(sources.modules))
        .with_customizer(DescriptionCustomizer::new(loader.clone()));
    let mut builder = OpenApiBuilder::new().with_info(
        loader.crate_name().to_string(),
        "1.0.0".to_string(),
        None,
    );

    for type_path in type_paths {
        builder.add_type(&TypeIdentity::from_type_name(type_path), &mut schema_gen);
    }

    Ok(builder.build(schema_gen))
}

/// Looks up the description of each function symbol.
pub fn describe_functions(
    loader: &SourceLoader,
    symbols: &[String],
) -> Result<BTreeMap<String, String>> {
    let mut descriptions = BTreeMap::new();
    for symbol in symbols {
        let function = FunctionIdentity::from_symbol(symbol)?;
        let description = function_description(loader, &function)
            .with_context(|| format!("Failed to describe {}", symbol))?;
        descriptions.insert(symbol.clone(), description);
    }
    Ok(descriptions)
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    info!("Serializing to {:?} format...", format);
    match format {
        OutputFormat::Yaml => serialize_yaml(value),
        OutputFormat::Json => serialize_json(value),
    }
}
