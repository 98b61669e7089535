//! CLI command implementations.

pub mod arch;
pub mod avail;
pub mod prepare;
pub mod resolve;

use std::path::Path;

use anyhow::{Context, Result};

use hpctk_core::ToolkitConfig;
use hpctk_host::CpuInfoFile;
use hpctk_modules::{local, MemoryModules};

fn load_modules(root: &Path) -> Result<MemoryModules> {
    local::scan(root).with_context(|| format!("failed to read module tree {}", root.display()))
}

fn load_config(path: &Path) -> Result<ToolkitConfig> {
    ToolkitConfig::load(path).with_context(|| format!("failed to load {}", path.display()))
}

fn cpu_info(path: Option<&Path>) -> CpuInfoFile {
    path.map(CpuInfoFile::new).unwrap_or_default()
}
