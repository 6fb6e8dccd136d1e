//! Resolves module paths to parsed source.
//!
//! A module path such as `demo::models::user` is resolved the way rustc lays out modules by
//! default: the crate root is `lib.rs` (or `main.rs`), and every further segment is either an
//! inline `mod name { ... }` of the current module or a `name.rs` / `name/mod.rs` file next to
//! it. Nothing is cached; every call reads and parses the files again.

use crate::error::{Error, Result};
use crate::identity::{path_segments, PATH_SEPARATOR};
use crate::scanner::SourceScanner;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use syn::{Attribute, Item};

/// Loads modules of a single crate from its source directory.
///
/// # Example
///
/// ```no_run
/// use schema_doc_comments::loader::SourceLoader;
///
/// let loader = SourceLoader::new("./my-crate/src", "my-crate");
/// let module = loader.load("my_crate::models").unwrap();
/// println!("Loaded {} items from {}", module.items.len(), module.file.display());
/// ```
#[derive(Debug, Clone)]
pub struct SourceLoader {
    src_root: PathBuf,
    crate_name: String,
}

/// The parsed contents of one module.
#[derive(Debug, Clone)]
pub struct ParsedModule {
    /// Canonical module path, always starting with the crate name
    pub module_path: String,
    /// The file the module's items were parsed from
    pub file: PathBuf,
    /// Whether the module is an inline `mod name { ... }` block
    pub inline: bool,
    /// Outer attributes of the inline `mod` item, including its doc comment
    pub attrs: Vec<Attribute>,
    /// The module's items
    pub items: Vec<Item>,
}

/// Every module of a crate, as produced by [`SourceLoader::load_crate`].
#[derive(Debug, Default)]
pub struct CrateSources {
    pub modules: Vec<ParsedModule>,
    /// Files that could not be parsed and were skipped
    pub warnings: Vec<String>,
}

impl SourceLoader {
    /// Creates a loader for the crate whose sources live under `src_root`.
    ///
    /// Hyphens in `crate_name` are normalized to underscores, matching the paths reported by
    /// `std::any::type_name`.
    pub fn new(src_root: impl Into<PathBuf>, crate_name: &str) -> Self {
        Self {
            src_root: src_root.into(),
            crate_name: crate_name.replace('-', "_"),
        }
    }

    pub fn crate_name(&self) -> &str {
        &self.crate_name
    }

    pub fn src_root(&self) -> &Path {
        &self.src_root
    }

    /// Loads and parses the module at `module_path`.
    ///
    /// The first segment must be the crate name or `crate`.
    ///
    /// # Errors
    ///
    /// - [`Error::ModuleNotFound`] if the path does not resolve to a module of this crate
    /// - [`Error::Load`] if a file on the way cannot be read or parsed
    pub fn load(&self, module_path: &str) -> Result<ParsedModule> {
        debug!("Loading module: {}", module_path);

        let not_found = || Error::ModuleNotFound {
            module: module_path.to_string(),
        };

        let segments = path_segments(module_path);
        let (first, rest) = segments.split_first().ok_or_else(not_found)?;
        if *first != self.crate_name && *first != "crate" {
            return Err(not_found());
        }

        let root_file = ["lib.rs", "main.rs"]
            .iter()
            .map(|name| self.src_root.join(name))
            .find(|path| path.is_file())
            .ok_or_else(not_found)?;

        let mut canonical = self.crate_name.clone();
        let mut module = ParsedModule {
            module_path: canonical.clone(),
            items: self.parse_file(&canonical, &root_file)?.items,
            file: root_file,
            inline: false,
            attrs: Vec::new(),
        };
        let mut child_dir = self.src_root.clone();

        for segment in rest {
            canonical.push_str(PATH_SEPARATOR);
            canonical.push_str(segment);
            child_dir = child_dir.join(segment);

            module = match take_inline_module(&mut module.items, segment) {
                Some((attrs, items)) => {
                    debug!("Resolved {} to an inline module in {}", canonical, module.file.display());
                    ParsedModule {
                        module_path: canonical.clone(),
                        file: module.file,
                        inline: true,
                        attrs,
                        items,
                    }
                }
                None => {
                    let file = module_file_candidates(&child_dir)
                        .into_iter()
                        .find(|path| path.is_file())
                        .ok_or_else(not_found)?;
                    ParsedModule {
                        module_path: canonical.clone(),
                        items: self.parse_file(&canonical, &file)?.items,
                        file,
                        inline: false,
                        attrs: Vec::new(),
                    }
                }
            };
        }

        debug!("Loaded module {} ({} items)", module.module_path, module.items.len());
        Ok(module)
    }

    /// Parses every module of the crate, including inline ones.
    ///
    /// Files that fail to parse are skipped with a warning instead of failing the whole crate.
    ///
    /// # Errors
    ///
    /// Returns an error only if the source root cannot be scanned.
    pub fn load_crate(&self) -> Result<CrateSources> {
        let scanner = SourceScanner::new(self.src_root.clone(), &self.crate_name);
        let scan_result = scanner.scan().map_err(|e| Error::Load {
            module: self.crate_name.clone(),
            file: self.src_root.clone(),
            message: format!("{:#}", e),
        })?;

        let mut sources = CrateSources {
            modules: Vec::new(),
            warnings: scan_result.warnings,
        };

        for source_file in scan_result.files {
            match self.parse_file(&source_file.module_path, &source_file.path) {
                Ok(syntax_tree) => {
                    let module = ParsedModule {
                        module_path: source_file.module_path,
                        file: source_file.path,
                        inline: false,
                        attrs: Vec::new(),
                        items: syntax_tree.items,
                    };
                    push_with_inline_modules(module, &mut sources.modules);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", source_file.path.display(), e);
                    sources.warnings.push(e.to_string());
                }
            }
        }

        debug!(
            "Loaded {} modules from {} ({} warnings)",
            sources.modules.len(),
            self.src_root.display(),
            sources.warnings.len()
        );
        Ok(sources)
    }

    fn parse_file(&self, module_path: &str, path: &Path) -> Result<syn::File> {
        debug!("Parsing file: {}", path.display());

        let load_error = |message: String| Error::Load {
            module: module_path.to_string(),
            file: path.to_path_buf(),
            message,
        };

        let content = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        syn::parse_file(&content)
            .map_err(|e| load_error(format!("failed to parse Rust syntax: {}", e)))
    }
}

fn module_file_candidates(child_dir: &Path) -> [PathBuf; 2] {
    [child_dir.with_extension("rs"), child_dir.join("mod.rs")]
}

/// Removes the inline module `name` from `items`, returning its attributes and contents.
fn take_inline_module(items: &mut Vec<Item>, name: &str) -> Option<(Vec<Attribute>, Vec<Item>)> {
    let index = items.iter().position(|item| {
        matches!(item, Item::Mod(m) if m.ident == name && m.content.is_some())
    })?;
    match items.swap_remove(index) {
        Item::Mod(m) => m.content.map(|(_, content)| (m.attrs, content)),
        _ => None,
    }
}

/// Pushes `module` and, recursively, a copy of every inline module declared in it.
fn push_with_inline_modules(module: ParsedModule, out: &mut Vec<ParsedModule>) {
    let children: Vec<ParsedModule> = module
        .items
        .iter()
        .filter_map(|item| match item {
            Item::Mod(m) => m.content.as_ref().map(|(_, content)| ParsedModule {
                module_path: format!("{}{}{}", module.module_path, PATH_SEPARATOR, m.ident),
                file: module.file.clone(),
                inline: true,
                attrs: m.attrs.clone(),
                items: content.clone(),
            }),
            _ => None,
        })
        .collect();

    out.push(module);
    for child in children {
        push_with_inline_modules(child, out);
    }
}
