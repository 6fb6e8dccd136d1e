//! schema-doc-comments - command-line tool exposing Rust doc comments as schema descriptions.
//!
//! # Usage
//!
//! ```bash
//! schema-doc-comments [OPTIONS] <CRATE_PATH>
//! ```
//!
//! # Examples
//!
//! Print the description registry of a crate:
//! ```bash
//! schema-doc-comments ./my-crate -f json -o descriptions.json
//! ```
//!
//! Generate documented schemas for root types:
//! ```bash
//! schema-doc-comments ./my-crate -t my_crate::models::User -o openapi.yaml
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use schema_doc_comments::cli;

fn main() -> Result<()> {
    // Parse once to read the verbose flag, validate after the logger is up
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("schema-doc-comments starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;
    cli::run(args)?;

    info!("Done");

    Ok(())
}
