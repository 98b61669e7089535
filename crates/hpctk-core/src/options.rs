//! Toolkit options.
//!
//! The option set is closed: keys outside [`OPTION_KEYS`] are reported
//! with a warning and otherwise ignored.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Every option key a toolkit understands.
pub const OPTION_KEYS: &[&str] = &[
    "usempi",
    "cciscxx",
    "pic",
    "opt",
    "noopt",
    "lowopt",
    "debug",
    "optarch",
    "i8",
    "unroll",
    "verbose",
    "cstd",
    "shared",
    "static",
    "intel-static",
    "loop",
    "f2c",
    "no-icc",
    "packed-groups",
    "32bit",
];

/// A raw option value as written in a toolkit declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Text(String),
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

/// Switches controlling compiler and linker flag synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolkitOptions {
    /// Use the MPI compiler wrappers as the default compilers.
    pub usempi: bool,
    /// The C++ compiler is the C compiler.
    pub cciscxx: bool,
    pub pic: bool,
    pub opt: bool,
    pub noopt: bool,
    pub lowopt: bool,
    pub debug: bool,
    /// Emit the architecture-specific optimization flag.
    pub optarch: bool,
    /// 8-byte default integers.
    pub i8: bool,
    pub unroll: bool,
    pub verbose: bool,
    /// C language standard, e.g. `c99`.
    pub cstd: Option<String>,
    pub shared: bool,
    pub static_link: bool,
    pub intel_static: bool,
    pub loop_transform: bool,
    pub f2c: bool,
    pub no_icc: bool,
    /// Rewrite linker groups into a comma-joined form for tools that
    /// cannot parse `-Wl,--start-group ... -Wl,--end-group`.
    pub packed_groups: bool,
    pub m32: bool,
}

impl Default for ToolkitOptions {
    fn default() -> Self {
        Self {
            usempi: false,
            cciscxx: false,
            pic: false,
            opt: false,
            noopt: false,
            lowopt: false,
            debug: false,
            optarch: true,
            i8: false,
            unroll: false,
            verbose: false,
            cstd: None,
            shared: false,
            static_link: false,
            intel_static: false,
            loop_transform: false,
            f2c: false,
            no_icc: false,
            packed_groups: false,
            m32: false,
        }
    }
}

impl ToolkitOptions {
    fn bool_slot(&mut self, key: &str) -> Option<&mut bool> {
        let slot = match key {
            "usempi" => &mut self.usempi,
            "cciscxx" => &mut self.cciscxx,
            "pic" => &mut self.pic,
            "opt" => &mut self.opt,
            "noopt" => &mut self.noopt,
            "lowopt" => &mut self.lowopt,
            "debug" => &mut self.debug,
            "optarch" => &mut self.optarch,
            "i8" => &mut self.i8,
            "unroll" => &mut self.unroll,
            "verbose" => &mut self.verbose,
            "shared" => &mut self.shared,
            "static" => &mut self.static_link,
            "intel-static" => &mut self.intel_static,
            "loop" => &mut self.loop_transform,
            "f2c" => &mut self.f2c,
            "no-icc" => &mut self.no_icc,
            "packed-groups" => &mut self.packed_groups,
            "32bit" => &mut self.m32,
            _ => return None,
        };
        Some(slot)
    }

    /// Set a single option. Returns `false` if the key is not recognized
    /// or the value has the wrong type; both cases are logged.
    pub fn set(&mut self, key: &str, value: &OptionValue) -> bool {
        if key == "cstd" {
            return match value {
                OptionValue::Text(s) => {
                    self.cstd = Some(s.clone());
                    true
                }
                OptionValue::Bool(false) => {
                    self.cstd = None;
                    true
                }
                OptionValue::Bool(true) => {
                    warn!("toolkit option cstd expects a language standard, got 'true'");
                    false
                }
            };
        }

        match (self.bool_slot(key), value) {
            (Some(slot), OptionValue::Bool(b)) => {
                *slot = *b;
                true
            }
            (Some(_), OptionValue::Text(s)) => {
                warn!("toolkit option {key} expects a boolean, got '{s}'");
                false
            }
            (None, _) => {
                warn!("undefined toolkit option {key} specified");
                false
            }
        }
    }

    /// Apply a set of options. Unknown keys are skipped with a warning.
    pub fn apply(&mut self, options: &BTreeMap<String, OptionValue>) {
        for (key, value) in options {
            self.set(key, value);
        }
    }
}
