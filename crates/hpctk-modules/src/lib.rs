//! Environment module gateway for the hpctk toolkit resolver.
//!
//! A module is a named, versioned unit of environment configuration that
//! is loaded as a whole. The resolver never touches a module system
//! directly; it goes through the [`ModuleGateway`] trait, which answers
//! existence and availability queries, tracks which modules are loaded,
//! and reports the installation root and version of loaded software.
//!
//! Two implementations are provided:
//! - [`MemoryModules`]: an in-memory catalog, used by tests and as the
//!   backing store of the filesystem loader.
//! - [`local::scan`]: builds a catalog from a `<root>/<name>/<version>/`
//!   directory tree.

pub mod error;
pub mod gateway;
pub mod local;
pub mod memory;
pub mod module;
pub mod version;

pub use error::{ModuleError, Result};
pub use gateway::ModuleGateway;
pub use memory::{MemoryModules, ModuleSpec};
pub use module::ModuleId;
pub use version::LooseVersion;
