//! Error types for host detection.

use std::path::PathBuf;

/// Errors that can occur while inspecting the host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The CPU information source could not be read.
    #[error("cannot read CPU information from {}: {source}", path.display())]
    CpuInfo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No `vendor_id` line was present.
    #[error("no vendor_id found in CPU information")]
    MissingVendor,

    /// The vendor id is not one we know how to build for.
    #[error("unknown architecture detected: {vendor}")]
    UnknownVendor { vendor: String },
}

/// Result type for host operations.
pub type Result<T> = std::result::Result<T, HostError>;
