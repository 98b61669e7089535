//! TOML toolkit declarations.
//!
//! ```toml
//! [toolkit]
//! name = "GCC"
//! version = "4.6.3"
//!
//! [options]
//! pic = true
//! cstd = "c99"
//!
//! [[dependencies]]
//! name = "FFTW"
//! version = "3.3.1"
//!
//! [environment]
//! only-modules = false
//! exclude = ["CFLAGS"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use hpctk_modules::ModuleGateway;

use crate::dependency::Dependency;
use crate::env::Exclusions;
use crate::error::{Result, ToolkitError};
use crate::options::OptionValue;
use crate::toolkit::{PrepareOptions, Toolkit, ToolkitId};

/// A complete toolkit declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolkitConfig {
    pub toolkit: ToolkitId,
    /// Raw option values; unknown keys are reported when applied.
    #[serde(default)]
    pub options: BTreeMap<String, OptionValue>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub environment: EnvironmentConfig,
}

/// How prepared variables reach the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub only_modules: bool,
    #[serde(default)]
    pub exclude: Exclusions,
}

impl ToolkitConfig {
    /// Read a declaration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ToolkitError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded toolkit configuration");
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// A configured toolkit with options applied and dependencies
    /// resolved against `modules`.
    pub fn build_toolkit(&self, modules: &dyn ModuleGateway) -> Result<Toolkit> {
        let mut toolkit = Toolkit::new(&self.toolkit.name, &self.toolkit.version);
        toolkit.set_options(&self.options);
        toolkit.add_dependencies(self.dependencies.clone(), modules)?;
        Ok(toolkit)
    }

    pub fn prepare_options(&self) -> PrepareOptions {
        PrepareOptions {
            only_modules: self.environment.only_modules,
            exclude: self.environment.exclude.clone(),
        }
    }
}
