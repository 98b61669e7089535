//! In-memory module catalog.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ModuleError, Result};
use crate::gateway::ModuleGateway;
use crate::module::ModuleId;
use crate::version::LooseVersion;

/// A module known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    pub id: ModuleId,
    /// Installation root exposed once the module is loaded.
    pub prefix: PathBuf,
    /// Modules loaded together with this one.
    pub dependencies: Vec<ModuleId>,
}

impl ModuleSpec {
    pub fn new(name: &str, version: &str, prefix: impl AsRef<Path>) -> Self {
        Self {
            id: ModuleId::new(name, version),
            prefix: prefix.as_ref().to_path_buf(),
            dependencies: Vec::new(),
        }
    }

    /// Add a module that is loaded whenever this one is.
    pub fn with_dependency(mut self, name: &str, version: &str) -> Self {
        self.dependencies.push(ModuleId::new(name, version));
        self
    }
}

/// A module system held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryModules {
    catalog: Vec<ModuleSpec>,
    queue: Vec<ModuleId>,
    loaded: Vec<ModuleId>,
}

impl MemoryModules {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module to the catalog, replacing any entry with the same identity.
    pub fn insert(&mut self, spec: ModuleSpec) {
        self.catalog.retain(|s| s.id != spec.id);
        self.catalog.push(spec);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_module(mut self, spec: ModuleSpec) -> Self {
        self.insert(spec);
        self
    }

    /// Look up a module definition.
    pub fn spec(&self, id: &ModuleId) -> Option<&ModuleSpec> {
        self.catalog.iter().find(|s| &s.id == id)
    }

    /// All modules in the catalog.
    pub fn modules(&self) -> &[ModuleSpec] {
        &self.catalog
    }

    /// Load a module immediately, bypassing the queue.
    pub fn preload(&mut self, name: &str, version: &str) -> Result<()> {
        self.load_one(&ModuleId::new(name, version))
    }

    fn load_one(&mut self, id: &ModuleId) -> Result<()> {
        if self.loaded.contains(id) {
            return Ok(());
        }
        let spec = self
            .spec(id)
            .cloned()
            .ok_or_else(|| ModuleError::NotFound {
                name: id.name.clone(),
                version: id.version.clone(),
            })?;

        // Loading a module swaps out any other version of the same name.
        self.loaded.retain(|m| m.name != id.name);
        self.loaded.push(id.clone());
        debug!(module = %id, "loaded module");

        for dep in &spec.dependencies {
            self.load_one(dep)?;
        }
        Ok(())
    }

    fn loaded_spec(&self, name: &str) -> Option<&ModuleSpec> {
        self.loaded
            .iter()
            .rev()
            .find(|m| m.has_name(name))
            .and_then(|id| self.spec(id))
    }
}

impl ModuleGateway for MemoryModules {
    fn exists(&self, name: &str, version: &str) -> bool {
        self.catalog
            .iter()
            .any(|s| s.id.name == name && s.id.version == version)
    }

    fn available(&self, name: &str, suffix: &str) -> Vec<String> {
        let mut versions: Vec<LooseVersion> = self
            .catalog
            .iter()
            .filter(|s| s.id.name == name && s.id.version.ends_with(suffix))
            .map(|s| LooseVersion::parse(&s.id.version))
            .collect();
        versions.sort();
        versions.into_iter().map(|v| v.as_str().to_string()).collect()
    }

    fn loaded_modules(&self) -> Vec<ModuleId> {
        self.loaded.clone()
    }

    fn add_modules(&mut self, modules: &[ModuleId]) {
        self.queue.extend(modules.iter().cloned());
    }

    fn load(&mut self) -> Result<()> {
        let queue = std::mem::take(&mut self.queue);
        for id in &queue {
            self.load_one(id)?;
        }
        Ok(())
    }

    fn software_root(&self, name: &str) -> Option<PathBuf> {
        self.loaded_spec(name).map(|s| s.prefix.clone())
    }

    fn software_version(&self, name: &str) -> Option<String> {
        self.loaded_spec(name).map(|s| s.id.version.clone())
    }
}
