//! `hpctk prepare`: load a toolkit and print its environment.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};

use hpctk_core::Exclusions;

use super::{cpu_info, load_config, load_modules};
use crate::OutputFormat;

pub struct PrepareArgs {
    pub config: PathBuf,
    pub modules: PathBuf,
    pub only_modules: bool,
    pub exclude: Option<String>,
    pub format: OutputFormat,
    pub cpuinfo: Option<PathBuf>,
}

/// Quote a value for a POSIX shell.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Prepare the declared toolkit and render every assignment it made.
pub fn run(args: &PrepareArgs) -> Result<String> {
    let config = load_config(&args.config)?;
    let mut modules = load_modules(&args.modules)?;
    let host = cpu_info(args.cpuinfo.as_deref());

    let mut how = config.prepare_options();
    how.only_modules |= args.only_modules;
    if let Some(extra) = &args.exclude {
        how.exclude.extend(&Exclusions::parse(extra));
    }

    let mut toolkit = config.build_toolkit(&modules)?;
    let mut assignments: Vec<(String, String)> = Vec::new();
    toolkit
        .prepare(&mut modules, &host, &mut assignments, &how)
        .with_context(|| format!("failed to prepare toolkit {}", toolkit.id()))?;

    let mut out = String::new();
    match args.format {
        OutputFormat::Shell => {
            for (key, value) in &assignments {
                writeln!(out, "export {key}={}", shell_quote(value))?;
            }
        }
        OutputFormat::Json => {
            let map: BTreeMap<&str, &str> = assignments
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            out = serde_json::to_string_pretty(&map)?;
            out.push('\n');
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn fixture(dir: &Path, exclude: &str) -> PrepareArgs {
        let tree = dir.join("modules");
        fs::create_dir_all(tree.join("GCC/4.6.3")).unwrap();
        let config = dir.join("toolkit.toml");
        fs::write(
            &config,
            format!(
                "[toolkit]\nname = \"GCC\"\nversion = \"4.6.3\"\n\n[environment]\nexclude = \"{exclude}\"\n"
            ),
        )
        .unwrap();
        let cpuinfo = dir.join("cpuinfo");
        fs::write(&cpuinfo, "vendor_id\t: GenuineIntel\n").unwrap();
        PrepareArgs {
            config,
            modules: tree,
            only_modules: false,
            exclude: None,
            format: OutputFormat::Shell,
            cpuinfo: Some(cpuinfo),
        }
    }

    #[test]
    fn shell_output_exports_variables_and_mirrors() {
        let dir = tempfile::tempdir().unwrap();
        let out = run(&fixture(dir.path(), "")).unwrap();
        assert!(out.contains("export CC='gcc'\n"));
        assert!(out.contains("export SOFTVARCC='gcc'\n"));
        assert!(out.contains("export CFLAGS='-march=native -O2'\n"));
    }

    #[test]
    fn excluded_variables_keep_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = fixture(dir.path(), "CFLAGS");
        args.exclude = Some("CXXFLAGS".into());
        let out = run(&args).unwrap();
        assert!(!out.contains("export CFLAGS="));
        assert!(!out.contains("export CXXFLAGS="));
        assert!(out.contains("export SOFTVARCXXFLAGS="));
    }

    #[test]
    fn json_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = fixture(dir.path(), "");
        args.format = OutputFormat::Json;
        let out = run(&args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["F77"], "gfortran");
        assert_eq!(value["SOFTVARFLIBS"], "-lgfortran");
    }

    #[test]
    fn only_modules_prints_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = fixture(dir.path(), "");
        args.only_modules = true;
        assert_eq!(run(&args).unwrap(), "");
    }

    #[test]
    fn missing_toolkit_module_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let args = fixture(dir.path(), "");
        fs::remove_dir_all(args.modules.join("GCC")).unwrap();
        let err = run(&args).unwrap_err();
        assert!(format!("{err:#}").contains("no module found for toolkit name 'GCC'"));
    }

    #[test]
    fn quotes_single_quotes() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }
}
