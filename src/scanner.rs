use crate::identity::PATH_SEPARATOR;
use anyhow::Result;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Source scanner for traversing a crate's source directory.
///
/// The `SourceScanner` recursively walks the source root to find all Rust files and derives the
/// module path each file defines. It skips `target` and hidden directories (those starting
/// with `.`).
///
/// Only the library target is scanned when the crate has one: a top-level `main.rs` beside
/// `lib.rs` is skipped, as is `bin/`, whose files are crates of their own.
///
/// # Example
///
/// ```no_run
/// use schema_doc_comments::scanner::SourceScanner;
/// use std::path::PathBuf;
///
/// let scanner = SourceScanner::new(PathBuf::from("./my-crate/src"), "my_crate");
/// let result = scanner.scan().unwrap();
/// for file in &result.files {
///     println!("{} -> {}", file.path.display(), file.module_path);
/// }
/// ```
pub struct SourceScanner {
    root_path: PathBuf,
    crate_name: String,
}

/// A Rust source file together with the module path it defines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// e.g. `my_crate::models::user` for `src/models/user.rs`
    pub module_path: String,
}

/// Result of a scan.
///
/// Contains the discovered source files and any warnings encountered during scanning.
pub struct ScanResult {
    /// Discovered `.rs` files in walk order, siblings sorted by file name
    pub files: Vec<SourceFile>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl SourceScanner {
    /// Creates a new `SourceScanner` for the source root of the crate named `crate_name`.
    pub fn new(root_path: PathBuf, crate_name: &str) -> Self {
        Self {
            root_path,
            crate_name: crate_name.to_string(),
        }
    }

    /// Scans the directory tree and collects all `.rs` files with their module paths.
    ///
    /// Inaccessible entries are logged and recorded as warnings; scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory does not exist.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            anyhow::bail!("Source root is not a directory: {}", self.root_path.display());
        }

        let mut files = Vec::new();
        let mut warnings = Vec::new();
        let has_lib = self.root_path.join("lib.rs").is_file();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.depth() == 0 {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                if e.depth() == 1 && (file_name == "bin" || (has_lib && file_name == "main.rs")) {
                    debug!("Skipping {}: not part of the library target", e.path().display());
                    return false;
                }
                !file_name.starts_with('.') && file_name != "target"
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("rs") {
                        if let Some(module_path) =
                            module_path_for_file(&self.root_path, &self.crate_name, path)
                        {
                            files.push(SourceFile {
                                path: path.to_path_buf(),
                                module_path,
                            });
                        }
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult { files, warnings })
    }
}

/// Derives the module path a file defines, following the default module layout:
/// `lib.rs`/`main.rs` are the crate root, `a/mod.rs` is `a` and `a/b.rs` is `a::b`.
pub fn module_path_for_file(root: &Path, crate_name: &str, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let mut segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    let file_name = segments.pop()?;
    let stem = file_name.strip_suffix(".rs")?;
    let is_crate_root = segments.is_empty() && (stem == "lib" || stem == "main");
    if stem != "mod" && !is_crate_root {
        segments.push(stem.to_string());
    }

    let mut module_path = crate_name.to_string();
    for segment in segments {
        module_path.push_str(PATH_SEPARATOR);
        module_path.push_str(&segment);
    }
    Some(module_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn module_paths(result: &ScanResult) -> Vec<&str> {
        result.files.iter().map(|f| f.module_path.as_str()).collect()
    }

    #[test]
    fn test_scan_crate_layout() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("models")).unwrap();
        fs::create_dir_all(root.join("api")).unwrap();
        fs::write(root.join("lib.rs"), "pub mod models; pub mod api;").unwrap();
        fs::write(root.join("models/mod.rs"), "pub mod user;").unwrap();
        fs::write(root.join("models/user.rs"), "pub struct User;").unwrap();
        fs::write(root.join("api.rs"), "").unwrap();
        fs::write(root.join("api/handlers.rs"), "pub fn get() {}").unwrap();
        fs::write(root.join("README.md"), "# README").unwrap();

        let scanner = SourceScanner::new(root.to_path_buf(), "demo");
        let result = scanner.scan().unwrap();

        assert!(result.warnings.is_empty());
        assert_eq!(
            module_paths(&result),
            vec![
                "demo::api::handlers",
                "demo::api",
                "demo",
                "demo::models",
                "demo::models::user",
            ]
        );
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let scanner = SourceScanner::new(temp_dir.path().to_path_buf(), "demo");
        let result = scanner.scan().unwrap();

        assert!(result.files.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_missing_root() {
        let scanner = SourceScanner::new(PathBuf::from("/nonexistent/src"), "demo");
        assert!(scanner.scan().is_err());
    }

    #[test]
    fn test_scan_skips_target_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("target")).unwrap();
        fs::write(root.join("target/build.rs"), "fn main() {}").unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git/config.rs"), "// config").unwrap();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();

        let scanner = SourceScanner::new(root.to_path_buf(), "demo");
        let result = scanner.scan().unwrap();

        assert_eq!(module_paths(&result), vec!["demo"]);
    }

    #[test]
    fn test_scan_prefers_library_target() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("bin")).unwrap();
        fs::write(root.join("bin/tool.rs"), "fn main() {}").unwrap();
        fs::write(root.join("lib.rs"), "pub mod models;").unwrap();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("models.rs"), "pub struct User;").unwrap();

        let scanner = SourceScanner::new(root.to_path_buf(), "demo");
        let result = scanner.scan().unwrap();

        assert_eq!(module_paths(&result), vec!["demo", "demo::models"]);
        assert_eq!(result.files[0].path, root.join("lib.rs"));
    }

    #[test]
    fn test_module_path_for_nested_main_is_not_crate_root() {
        let root = Path::new("/src");
        assert_eq!(
            module_path_for_file(root, "demo", Path::new("/src/bin/main.rs")).as_deref(),
            Some("demo::bin::main")
        );
        assert_eq!(
            module_path_for_file(root, "demo", Path::new("/other/lib.rs")),
            None
        );
    }
}
