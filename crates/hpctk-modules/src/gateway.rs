//! The module gateway trait.

use std::path::PathBuf;

use crate::error::Result;
use crate::module::ModuleId;

/// Abstract access to an environment module system.
///
/// Loads are two-phase: [`add_modules`](ModuleGateway::add_modules) queues
/// modules and [`load`](ModuleGateway::load) applies the queue.
pub trait ModuleGateway {
    /// Whether a module with this exact name and version exists.
    fn exists(&self, name: &str, version: &str) -> bool;

    /// Versions of `name` whose version string ends with `suffix`, ordered
    /// oldest first. The last element is the preferred match.
    fn available(&self, name: &str, suffix: &str) -> Vec<String>;

    /// Modules currently loaded, in load order.
    fn loaded_modules(&self) -> Vec<ModuleId>;

    /// Queue modules for loading.
    fn add_modules(&mut self, modules: &[ModuleId]);

    /// Load all queued modules (and whatever they load in turn).
    fn load(&mut self) -> Result<()>;

    /// Installation root of the loaded module named `name`.
    fn software_root(&self, name: &str) -> Option<PathBuf>;

    /// Version of the loaded module named `name`.
    fn software_version(&self, name: &str) -> Option<String>;

    /// Whether a module named `name` is loaded.
    fn is_loaded(&self, name: &str) -> bool {
        self.loaded_modules().iter().any(|m| m.has_name(name))
    }
}
