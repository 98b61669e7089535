//! Flag composition: options to compiler flags, optimization level, and
//! include/library path flags for installation roots.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::options::ToolkitOptions;
use crate::vars::Vars;

/// Include subdirectories searched under an installation root.
pub const INCLUDE_SUBDIRS: &[&str] = &["include"];

/// Library subdirectories searched under an installation root.
pub const LIB_SUBDIRS: &[&str] = &["lib64", "lib"];

/// Options that translate directly into compiler flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOption {
    Pic,
    Debug,
    I8,
    Static,
    Unroll,
    Verbose,
    Shared,
    IntelStatic,
    Loop,
    F2c,
    NoIcc,
}

impl FlagOption {
    /// All flag options, in emission order.
    pub const ALL: [FlagOption; 11] = [
        FlagOption::Pic,
        FlagOption::Debug,
        FlagOption::I8,
        FlagOption::Static,
        FlagOption::Unroll,
        FlagOption::Verbose,
        FlagOption::Shared,
        FlagOption::IntelStatic,
        FlagOption::Loop,
        FlagOption::F2c,
        FlagOption::NoIcc,
    ];

    pub fn is_enabled(&self, opts: &ToolkitOptions) -> bool {
        match self {
            FlagOption::Pic => opts.pic,
            FlagOption::Debug => opts.debug,
            FlagOption::I8 => opts.i8,
            FlagOption::Static => opts.static_link,
            FlagOption::Unroll => opts.unroll,
            FlagOption::Verbose => opts.verbose,
            FlagOption::Shared => opts.shared,
            FlagOption::IntelStatic => opts.intel_static,
            FlagOption::Loop => opts.loop_transform,
            FlagOption::F2c => opts.f2c,
            FlagOption::NoIcc => opts.no_icc,
        }
    }

    /// Compiler-neutral spelling, if the option has one.
    pub fn default_spelling(&self) -> Option<Spelling> {
        let spelling = match self {
            FlagOption::Pic => Spelling::One("fPIC"),
            FlagOption::Debug => Spelling::One("g"),
            FlagOption::I8 => Spelling::One("i8"),
            FlagOption::Static => Spelling::One("static"),
            FlagOption::Unroll => Spelling::One("unroll"),
            FlagOption::Verbose => Spelling::One("v"),
            FlagOption::Shared => Spelling::One("shared"),
            FlagOption::IntelStatic | FlagOption::Loop | FlagOption::F2c | FlagOption::NoIcc => {
                return None
            }
        };
        Some(spelling)
    }
}

/// Flag tokens (without the leading dash) for one option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spelling {
    One(&'static str),
    Many(&'static [&'static str]),
}

impl Spelling {
    fn extend_into(&self, flags: &mut Vec<String>) {
        match self {
            Spelling::One(flag) => flags.push((*flag).to_string()),
            Spelling::Many(list) => flags.extend(list.iter().map(|f| f.to_string())),
        }
    }
}

/// Flags for every enabled option. `overrides` replaces (or supplies) the
/// spelling of an option for a particular compiler family.
pub fn options_to_flags(opts: &ToolkitOptions, overrides: &[(FlagOption, Spelling)]) -> Vec<String> {
    let mut flags = Vec::new();
    for option in FlagOption::ALL {
        if !option.is_enabled(opts) {
            continue;
        }
        let spelling = overrides
            .iter()
            .find(|(o, _)| *o == option)
            .map(|(_, s)| *s)
            .or_else(|| option.default_spelling());
        if let Some(spelling) = spelling {
            spelling.extend_into(&mut flags);
        }
    }
    flags
}

/// Optimization level flag. One level is always emitted so that e.g. `-g`
/// does not silently fall back to `-O0`.
pub fn optimization_level(opts: &ToolkitOptions) -> &'static str {
    if opts.noopt {
        "O0"
    } else if opts.opt {
        "O3"
    } else if opts.lowopt {
        "O1"
    } else {
        "O2"
    }
}

/// Render flag tokens as a command-line fragment: `-a -b -c`.
pub fn render(flags: &[String]) -> String {
    flags
        .iter()
        .map(|f| format!("-{f}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Append `<prefix><root>/<subdir>` to `key` for every subdirectory that
/// exists. Missing subdirectories are logged and returned.
pub fn path_flags(
    vars: &mut Vars,
    root: &Path,
    subdirs: &[&str],
    prefix: &str,
    key: &str,
) -> Vec<PathBuf> {
    let mut flags = Vec::new();
    let mut missing = Vec::new();
    for subdir in subdirs {
        let dir = root.join(subdir);
        if dir.is_dir() {
            flags.push(format!("{prefix}{}", dir.display()));
        } else {
            warn!("directory {} was not found", dir.display());
            missing.push(dir);
        }
    }
    vars.append(key, &flags.join(" "));
    missing
}

/// Add the standard include and library search paths of an installation
/// root to `CPPFLAGS` and `LDFLAGS`.
pub fn dependency_paths(vars: &mut Vars, root: &Path) -> Vec<PathBuf> {
    let mut missing = path_flags(vars, root, INCLUDE_SUBDIRS, "-I", "CPPFLAGS");
    missing.extend(path_flags(vars, root, LIB_SUBDIRS, "-L", "LDFLAGS"));
    missing
}
