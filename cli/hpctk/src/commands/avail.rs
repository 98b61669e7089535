//! `hpctk avail`: versions of a module in the tree.

use std::path::Path;

use anyhow::Result;

use hpctk_modules::ModuleGateway;

use super::load_modules;

/// Versions of `name` ending with `suffix`, oldest first.
pub fn run(root: &Path, name: &str, suffix: &str) -> Result<Vec<String>> {
    let modules = load_modules(root)?;
    Ok(modules.available(name, suffix))
}
