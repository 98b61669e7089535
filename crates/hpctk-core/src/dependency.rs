//! Dependency descriptors and their resolution to concrete modules.
//!
//! A dependency built with a toolkit lives in a module whose version is
//! qualified by that toolkit: FFTW 3.3.1 built with GCC 4.6.3 is the
//! module `FFTW/3.3.1-GCC-4.6.3`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use hpctk_modules::{ModuleGateway, ModuleId};

use crate::error::{Result, ToolkitError};
use crate::toolkit::ToolkitId;

/// A requested library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Dependency {
    pub name: String,
    /// Explicit version; the most recent available module is used if absent.
    #[serde(default)]
    pub version: Option<String>,
    /// The module version does not carry the toolkit qualifier.
    #[serde(default)]
    pub toolkit_independent: bool,
    /// Appended to the module version after the toolkit qualifier.
    #[serde(default)]
    pub suffix: Option<String>,
    /// Already-resolved module version.
    #[serde(default)]
    pub module_version: Option<String>,
}

impl Dependency {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            toolkit_independent: false,
            suffix: None,
            module_version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn toolkit_independent(mut self) -> Self {
        self.toolkit_independent = true;
        self
    }

    /// The module this dependency resolved to, once resolved.
    pub fn module(&self) -> Option<ModuleId> {
        self.module_version
            .as_ref()
            .map(|v| ModuleId::new(&self.name, v))
    }
}

/// Toolkit qualifier inserted between a dependency's version and suffix.
pub fn toolkit_qualifier(toolkit: &ToolkitId, dependency: &Dependency) -> String {
    if dependency.toolkit_independent {
        String::new()
    } else if !toolkit.is_dummy() {
        format!("-{}-{}", toolkit.name, toolkit.version)
    } else if toolkit.version != ToolkitId::DUMMY {
        toolkit.version.clone()
    } else {
        String::new()
    }
}

/// Compute the concrete module version for a dependency.
pub fn resolve_version(
    toolkit: &ToolkitId,
    dependency: &Dependency,
    modules: &dyn ModuleGateway,
) -> Result<String> {
    let qualifier = toolkit_qualifier(toolkit, dependency);
    let suffix = dependency.suffix.as_deref().unwrap_or("");

    if let Some(version) = &dependency.version {
        return Ok(format!("{version}{qualifier}{suffix}"));
    }

    let pattern = format!("{qualifier}{suffix}");
    let matches = modules.available(&dependency.name, &pattern);
    debug!(name = %dependency.name, %pattern, ?matches, "looked up available versions");
    matches
        .last()
        .cloned()
        .ok_or_else(|| ToolkitError::NoMatchingVersion {
            name: dependency.name.clone(),
            suffix: pattern,
        })
}

/// Resolve each dependency (unless already resolved) and check that its
/// module exists. Returns the resolved dependencies in input order.
pub fn verify_dependencies(
    toolkit: &ToolkitId,
    dependencies: Vec<Dependency>,
    modules: &dyn ModuleGateway,
) -> Result<Vec<Dependency>> {
    let mut resolved = Vec::with_capacity(dependencies.len());
    for mut dep in dependencies {
        let version = match dep.module_version.take() {
            Some(v) => v,
            None => resolve_version(toolkit, &dep, modules)?,
        };
        if !modules.exists(&dep.name, &version) {
            return Err(ToolkitError::MissingDependency {
                name: dep.name,
                version,
            });
        }
        dep.module_version = Some(version);
        debug!(dependency = %dep.name, module_version = ?dep.module_version, "added toolkit dependency");
        resolved.push(dep);
    }
    Ok(resolved)
}
