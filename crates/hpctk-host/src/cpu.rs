//! CPU vendor detection.
//!
//! The CPU information source uses the `/proc/cpuinfo` format: one
//! `key : value` pair per line, with the vendor under `vendor_id`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{HostError, Result};

/// Default location of the CPU information pseudo-file.
pub const PROC_CPUINFO: &str = "/proc/cpuinfo";

/// CPU vendor class the toolkit knows how to optimize for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CpuVendor {
    Intel,
    #[serde(rename = "AMD")]
    Amd,
}

impl CpuVendor {
    /// Map a raw `vendor_id` value to a vendor class.
    pub fn from_vendor_id(vendor_id: &str) -> Option<Self> {
        match vendor_id {
            "GenuineIntel" => Some(CpuVendor::Intel),
            "AuthenticAMD" => Some(CpuVendor::Amd),
            _ => None,
        }
    }

    /// Compiler flag (without leading dash) selecting the best instruction
    /// set for this vendor.
    pub fn optimal_arch_flag(&self) -> &'static str {
        let flag = match self {
            CpuVendor::Intel => "xHOST",
            CpuVendor::Amd => "msse3",
        };
        info!("using {flag} as optarch for {self}");
        flag
    }
}

impl fmt::Display for CpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuVendor::Intel => f.write_str("Intel"),
            CpuVendor::Amd => f.write_str("AMD"),
        }
    }
}

/// Source of facts about the host machine.
pub trait HostFacts {
    /// Raw CPU information text in `/proc/cpuinfo` format.
    fn cpu_info(&self) -> Result<String>;
}

/// Reads CPU information from a file (normally `/proc/cpuinfo`).
#[derive(Debug, Clone)]
pub struct CpuInfoFile {
    path: PathBuf,
}

impl CpuInfoFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for CpuInfoFile {
    fn default() -> Self {
        Self::new(PROC_CPUINFO)
    }
}

impl HostFacts for CpuInfoFile {
    fn cpu_info(&self) -> Result<String> {
        std::fs::read_to_string(&self.path).map_err(|source| HostError::CpuInfo {
            path: self.path.clone(),
            source,
        })
    }
}

/// Fixed CPU information text.
#[derive(Debug, Clone)]
pub struct StaticCpuInfo(pub String);

impl StaticCpuInfo {
    /// A single-core description carrying only the given vendor id.
    pub fn with_vendor(vendor_id: &str) -> Self {
        Self(format!("processor\t: 0\nvendor_id\t: {vendor_id}\n"))
    }
}

impl HostFacts for StaticCpuInfo {
    fn cpu_info(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Extract the first `vendor_id` value from CPU information text.
pub fn parse_vendor_id(cpuinfo: &str) -> Option<&str> {
    cpuinfo.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim() != "vendor_id" {
            return None;
        }
        let value = value.trim();
        (!value.is_empty() && !value.contains(char::is_whitespace)).then_some(value)
    })
}

/// Determine the CPU vendor class of the host.
pub fn detect_architecture(host: &dyn HostFacts) -> Result<CpuVendor> {
    let text = host.cpu_info()?;
    let vendor_id = parse_vendor_id(&text).ok_or(HostError::MissingVendor)?;
    let vendor = CpuVendor::from_vendor_id(vendor_id).ok_or_else(|| HostError::UnknownVendor {
        vendor: vendor_id.to_string(),
    })?;
    debug!(vendor_id, %vendor, "detected architecture");
    Ok(vendor)
}
