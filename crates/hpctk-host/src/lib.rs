//! Host facts for the hpctk toolkit resolver.
//!
//! Everything the resolver needs to know about the machine it runs on
//! goes through the [`HostFacts`] trait, so preparation logic can be
//! exercised against canned CPU descriptions.

pub mod cpu;
pub mod error;

pub use cpu::{detect_architecture, CpuInfoFile, CpuVendor, HostFacts, StaticCpuInfo};
pub use error::{HostError, Result};
