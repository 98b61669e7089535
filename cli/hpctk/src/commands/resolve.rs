//! `hpctk resolve`: the modules declared dependencies resolve to.

use std::path::Path;

use anyhow::Result;

use super::{load_config, load_modules};

/// One `name/version` line per declared dependency.
pub fn run(config: &Path, modules: &Path) -> Result<Vec<String>> {
    let config = load_config(config)?;
    let modules = load_modules(modules)?;
    let toolkit = config.build_toolkit(&modules)?;
    Ok(toolkit
        .dependencies()
        .iter()
        .filter_map(|d| d.module())
        .map(|m| m.to_string())
        .collect())
}
