//! Module gateway error types.

use std::path::PathBuf;

/// Errors that can occur while querying or loading modules.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// A queued module does not exist in the catalog.
    #[error("no module found for {name}/{version}")]
    NotFound { name: String, version: String },

    /// A module reference string could not be split into name and version.
    #[error("invalid module reference '{reference}': expected <name>/<version>")]
    InvalidReference { reference: String },

    /// A `module.toml` file could not be parsed.
    #[error("invalid module file {}: {detail}", path.display())]
    InvalidModuleFile { path: PathBuf, detail: String },

    /// The module root passed to the scanner is not a directory.
    #[error("module root not found: {}", path.display())]
    RootNotFound { path: PathBuf },

    /// I/O error while scanning a module tree.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for module operations.
pub type Result<T> = std::result::Result<T, ModuleError>;
