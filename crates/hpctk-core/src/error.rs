//! Toolkit preparation errors.
//!
//! Every fatal condition aborts preparation of the toolkit it occurred
//! in; nothing is retried. Non-fatal conditions are logged as warnings
//! and never surface here.

use std::path::PathBuf;

use hpctk_host::HostError;
use hpctk_modules::ModuleError;

/// Broad class of a preparation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unsupported combination of options or libraries.
    Configuration,
    /// A module, version, rule or architecture could not be resolved.
    Resolution,
    /// A required installation root or version is absent from the environment.
    Environment,
}

/// Errors that can occur while configuring or preparing a toolkit.
#[derive(Debug, thiserror::Error)]
pub enum ToolkitError {
    #[error("32-bit builds are not supported for {library}")]
    Unsupported32Bit { library: String },

    #[error("32-bit libraries are not supported for {library} v{version}")]
    Unsupported32BitVersion { library: String, version: String },

    #[error("toolkit preparation with both GCC and Intel compilers loaded is not supported ({library})")]
    CompilerConflict { library: String },

    #[error("don't know which compiler-specific subdir for {library} to use")]
    UnknownCompilerLayout { library: String },

    #[error("no module found for toolkit name '{name}' ({version})")]
    ToolkitNotFound { name: String, version: String },

    #[error("no toolkit version for dependency name {name} (suffix {suffix}) found")]
    NoMatchingVersion { name: String, suffix: String },

    #[error("no module found for dependency {name}/{version}")]
    MissingDependency { name: String, version: String },

    #[error("don't know how to prepare for toolkit dependency {name}")]
    UnknownDependency { name: String },

    #[error("don't know how to prepare toolkit '{name}'")]
    UnknownToolkit { name: String },

    #[error("don't know how to prepare for a non-ScaleMP MPICH2 library (version {version})")]
    UnsupportedMpich2 { version: String },

    #[error("don't know how to set optarch: architecture not detected")]
    UnknownOptArch,

    #[error("{name} was not found in environment")]
    MissingSoftwareRoot { name: String },

    #[error("no version of {name} found in environment")]
    MissingSoftwareVersion { name: String },

    #[error("toolkit {name}/{version} has already been prepared")]
    AlreadyPrepared { name: String, version: String },

    #[error("architecture detection failed: {0}")]
    Host(#[from] HostError),

    #[error("module system error: {0}")]
    Modules(#[from] ModuleError),

    #[error("cannot read toolkit configuration {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toolkit configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl ToolkitError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolkitError::Unsupported32Bit { .. }
            | ToolkitError::Unsupported32BitVersion { .. }
            | ToolkitError::CompilerConflict { .. }
            | ToolkitError::UnknownCompilerLayout { .. }
            | ToolkitError::AlreadyPrepared { .. }
            | ToolkitError::ConfigIo { .. }
            | ToolkitError::ConfigParse(_) => ErrorKind::Configuration,

            ToolkitError::ToolkitNotFound { .. }
            | ToolkitError::NoMatchingVersion { .. }
            | ToolkitError::MissingDependency { .. }
            | ToolkitError::UnknownDependency { .. }
            | ToolkitError::UnknownToolkit { .. }
            | ToolkitError::UnsupportedMpich2 { .. }
            | ToolkitError::UnknownOptArch
            | ToolkitError::Host(_)
            | ToolkitError::Modules(_) => ErrorKind::Resolution,

            ToolkitError::MissingSoftwareRoot { .. }
            | ToolkitError::MissingSoftwareVersion { .. } => ErrorKind::Environment,
        }
    }
}

/// Result type for toolkit operations.
pub type Result<T> = std::result::Result<T, ToolkitError>;
