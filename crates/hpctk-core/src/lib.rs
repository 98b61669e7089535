//! Compiler toolkit preparation engine.
//!
//! Resolves a toolkit declaration (a compiler family plus numerical and
//! communication libraries, e.g. GCC + OpenMPI + ATLAS) into the build
//! environment recipes consume: compiler commands, compile and link
//! flags, and library search paths, as environment variables.
//!
//! # Flow
//!
//! [`Toolkit::prepare`] checks the toolkit module exists, loads it and
//! the declared dependencies through a [`ModuleGateway`], selects the
//! preparation rules implied by the modules the toolkit loaded, runs
//! them in priority order against a shared [`Vars`] mapping and finally
//! applies the result to an [`EnvSink`].
//!
//! Rules are ordered because later ones extend what earlier ones wrote:
//! LAPACK appends to the BLAS link line, ScaLAPACK to BLACS.
//!
//! [`ModuleGateway`]: hpctk_modules::ModuleGateway

pub mod config;
pub mod dependency;
pub mod env;
pub mod error;
pub mod flags;
pub mod options;
pub mod pipeline;
pub mod rules;
pub mod toolkit;
pub mod vars;

// Re-exports for convenience.
pub use config::{EnvironmentConfig, ToolkitConfig};
pub use dependency::{resolve_version, verify_dependencies, Dependency};
pub use env::{apply_vars, EnvSink, Exclusions, ProcessEnv, MIRROR_PREFIX};
pub use error::{ErrorKind, Result, ToolkitError};
pub use options::{OptionValue, ToolkitOptions, OPTION_KEYS};
pub use rules::{PrepareContext, PreparationRule, RuleEntry, RuleTable};
pub use toolkit::{PrepareOptions, Toolkit, ToolkitId, ToolkitState};
pub use vars::Vars;
