//! Filesystem-backed module tree.
//!
//! Layout:
//! ```text
//! <root>/
//!   <module-name>/
//!     <version>/
//!       module.toml   (optional)
//! ```
//!
//! `module.toml` may name an installation `prefix` (defaults to the version
//! directory itself) and a list of `dependencies` as `name/version`.

use std::path::Path;

use tracing::debug;

use crate::error::{ModuleError, Result};
use crate::memory::{MemoryModules, ModuleSpec};
use crate::module::{ModuleFile, ModuleId};

/// File name of the per-version module description.
pub const MODULE_FILE: &str = "module.toml";

/// Scan a module tree into an in-memory catalog.
pub fn scan(root: &Path) -> Result<MemoryModules> {
    if !root.is_dir() {
        return Err(ModuleError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut modules = MemoryModules::new();
    let mut names: Vec<_> = std::fs::read_dir(root)?.collect::<std::io::Result<_>>()?;
    names.sort_by_key(|e| e.file_name());

    for name_entry in names {
        if !name_entry.path().is_dir() {
            continue;
        }
        let Some(name) = name_entry.file_name().to_str().map(str::to_string) else {
            continue;
        };

        let mut versions: Vec<_> =
            std::fs::read_dir(name_entry.path())?.collect::<std::io::Result<_>>()?;
        versions.sort_by_key(|e| e.file_name());

        for version_entry in versions {
            let dir = version_entry.path();
            if !dir.is_dir() {
                continue;
            }
            let Some(version) = version_entry.file_name().to_str().map(str::to_string) else {
                continue;
            };

            let file = read_module_file(&dir.join(MODULE_FILE))?;
            let prefix = file.prefix.as_deref().unwrap_or(dir.as_path());
            let mut spec = ModuleSpec::new(&name, &version, prefix);
            for reference in &file.dependencies {
                spec.dependencies.push(reference.parse::<ModuleId>()?);
            }
            debug!(module = %spec.id, prefix = %spec.prefix.display(), "found module");
            modules.insert(spec);
        }
    }

    Ok(modules)
}

fn read_module_file(path: &Path) -> Result<ModuleFile> {
    if !path.is_file() {
        return Ok(ModuleFile::default());
    }
    let content = std::fs::read_to_string(path)?;
    ModuleFile::parse(&content).map_err(|e| ModuleError::InvalidModuleFile {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ModuleGateway;

    fn write_module(root: &Path, name: &str, version: &str, body: Option<&str>) {
        let dir = root.join(name).join(version);
        std::fs::create_dir_all(&dir).unwrap();
        if let Some(body) = body {
            std::fs::write(dir.join(MODULE_FILE), body).unwrap();
        }
    }

    #[test]
    fn scan_module_tree() {
        let tmp = tempfile::tempdir().unwrap();
        write_module(tmp.path(), "GCC", "4.6.3", None);
        write_module(
            tmp.path(),
            "goalf",
            "1.1.0",
            Some("dependencies = [\"GCC/4.6.3\"]\n"),
        );
        write_module(
            tmp.path(),
            "ATLAS",
            "3.8.4-goalf-1.1.0",
            Some("prefix = \"/opt/atlas\"\n"),
        );

        let mut modules = scan(tmp.path()).unwrap();
        assert_eq!(modules.modules().len(), 3);
        assert!(modules.exists("GCC", "4.6.3"));

        modules.add_modules(&[ModuleId::new("goalf", "1.1.0")]);
        modules.load().unwrap();
        assert!(modules.is_loaded("GCC"));
        assert_eq!(
            modules.software_root("GCC"),
            Some(tmp.path().join("GCC").join("4.6.3"))
        );

        modules.preload("ATLAS", "3.8.4-goalf-1.1.0").unwrap();
        assert_eq!(
            modules.software_root("ATLAS").as_deref(),
            Some(Path::new("/opt/atlas"))
        );
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = scan(&tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, ModuleError::RootNotFound { .. }));
    }

    #[test]
    fn invalid_module_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_module(tmp.path(), "GCC", "4.6.3", Some("prefix = [1, 2"));
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(err, ModuleError::InvalidModuleFile { .. }));
    }

    #[test]
    fn invalid_dependency_reference_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_module(tmp.path(), "goalf", "1.1.0", Some("dependencies = [\"GCC\"]\n"));
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(err, ModuleError::InvalidReference { .. }));
    }
}
