//! Module identifiers and on-disk module descriptions.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModuleError;

/// A module identity: `name/version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId {
    pub name: String,
    pub version: String,
}

impl ModuleId {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Case-insensitive name comparison, as module names are matched
    /// against library identifiers.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

impl FromStr for ModuleId {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((name, version)) if !name.is_empty() && !version.is_empty() => {
                Ok(ModuleId::new(name, version))
            }
            _ => Err(ModuleError::InvalidReference {
                reference: s.to_string(),
            }),
        }
    }
}

/// Contents of a `module.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleFile {
    /// Installation prefix of the software this module provides.
    #[serde(default)]
    pub prefix: Option<PathBuf>,
    /// Modules loaded together with this one, as `name/version`.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl ModuleFile {
    /// Parse a module file from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
