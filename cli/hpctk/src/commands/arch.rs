//! `hpctk arch`: detected CPU vendor and optimization flag.

use std::path::Path;

use anyhow::{Context, Result};

use hpctk_host::detect_architecture;

use super::cpu_info;

pub fn run(cpuinfo: Option<&Path>) -> Result<String> {
    let host = cpu_info(cpuinfo);
    let vendor = detect_architecture(&host)
        .with_context(|| format!("cannot detect architecture from {}", host.path().display()))?;
    Ok(format!("{vendor} -{}", vendor.optimal_arch_flag()))
}
