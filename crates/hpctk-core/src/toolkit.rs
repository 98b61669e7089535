//! The toolkit aggregate: identity, options, dependencies and the
//! variables produced by preparing it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use hpctk_host::{detect_architecture, CpuVendor, HostFacts};
use hpctk_modules::{ModuleGateway, ModuleId};

use crate::dependency::{verify_dependencies, Dependency};
use crate::env::{apply_vars, EnvSink, Exclusions};
use crate::error::{Result, ToolkitError};
use crate::flags;
use crate::options::{OptionValue, ToolkitOptions};
use crate::pipeline;
use crate::rules::{PrepareContext, RuleTable};
use crate::vars::Vars;

/// Name and version of a compiler toolkit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolkitId {
    pub name: String,
    pub version: String,
}

impl ToolkitId {
    /// Name (and version) of the toolkit that builds with the system compilers.
    pub const DUMMY: &'static str = "dummy";

    /// Version suffix selecting a 32-bit toolkit.
    pub const M32_SUFFIX: &'static str = "32bit";

    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.name == Self::DUMMY
    }

    pub fn is_32bit(&self) -> bool {
        self.version.ends_with(Self::M32_SUFFIX)
    }

    pub fn module(&self) -> ModuleId {
        ModuleId::new(&self.name, &self.version)
    }
}

impl fmt::Display for ToolkitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// Lifecycle of a toolkit. Preparation happens at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolkitState {
    Configured,
    Prepared,
    Failed,
}

/// How the result of a preparation is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareOptions {
    /// Only load modules; compute variables but leave the environment alone.
    pub only_modules: bool,
    /// Variables not to set directly (their mirrors are still set).
    pub exclude: Exclusions,
}

/// A compiler toolkit and the build environment it resolves to.
#[derive(Debug)]
pub struct Toolkit {
    id: ToolkitId,
    options: ToolkitOptions,
    dependencies: Vec<Dependency>,
    toolkit_deps: Vec<ModuleId>,
    vars: Vars,
    arch: Option<CpuVendor>,
    state: ToolkitState,
    rules: RuleTable,
}

impl Toolkit {
    /// A toolkit using the standard rule table.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::with_rules(name, version, RuleTable::standard())
    }

    pub fn with_rules(name: impl Into<String>, version: impl Into<String>, rules: RuleTable) -> Self {
        let id = ToolkitId::new(name, version);
        let options = ToolkitOptions {
            m32: id.is_32bit(),
            ..ToolkitOptions::default()
        };
        Self {
            id,
            options,
            dependencies: Vec::new(),
            toolkit_deps: Vec::new(),
            vars: Vars::new(),
            arch: None,
            state: ToolkitState::Configured,
            rules,
        }
    }

    pub fn id(&self) -> &ToolkitId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn version(&self) -> &str {
        &self.id.version
    }

    pub fn options(&self) -> &ToolkitOptions {
        &self.options
    }

    /// Declared dependencies, resolved to module versions.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Modules the toolkit module loaded by itself during preparation.
    pub fn toolkit_deps(&self) -> &[ModuleId] {
        &self.toolkit_deps
    }

    /// Variables computed by the last successful preparation.
    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    pub fn arch(&self) -> Option<CpuVendor> {
        self.arch
    }

    pub fn state(&self) -> ToolkitState {
        self.state
    }

    /// Apply options; unknown keys are logged and skipped. A `32bit`
    /// toolkit version keeps 32-bit mode on.
    pub fn set_options(&mut self, options: &BTreeMap<String, OptionValue>) {
        self.options.apply(options);
        if self.id.is_32bit() {
            self.options.m32 = true;
        }
    }

    /// Resolve and verify dependencies, then add them in order.
    pub fn add_dependencies(
        &mut self,
        dependencies: Vec<Dependency>,
        modules: &dyn ModuleGateway,
    ) -> Result<()> {
        debug!(toolkit = %self.id, "adding toolkit dependencies");
        let resolved = verify_dependencies(&self.id, dependencies, modules)?;
        self.dependencies.extend(resolved);
        Ok(())
    }

    /// CPU vendor of the host, detected once per toolkit.
    pub fn architecture(&mut self, host: &dyn HostFacts) -> Result<CpuVendor> {
        if let Some(arch) = self.arch {
            return Ok(arch);
        }
        let arch = detect_architecture(host)?;
        self.arch = Some(arch);
        Ok(arch)
    }

    fn dependency_modules(&self) -> Vec<ModuleId> {
        self.dependencies.iter().filter_map(Dependency::module).collect()
    }

    /// Load the toolkit and its dependencies, compute the build
    /// variables and (unless `only_modules`) write them to `env`.
    ///
    /// On failure nothing is written to `env` and the toolkit is left
    /// in the [`ToolkitState::Failed`] state.
    pub fn prepare(
        &mut self,
        modules: &mut dyn ModuleGateway,
        host: &dyn HostFacts,
        env: &mut dyn EnvSink,
        how: &PrepareOptions,
    ) -> Result<()> {
        if self.state != ToolkitState::Configured {
            return Err(ToolkitError::AlreadyPrepared {
                name: self.id.name.clone(),
                version: self.id.version.clone(),
            });
        }
        let result = self.prepare_once(modules, host, env, how);
        self.state = if result.is_ok() {
            ToolkitState::Prepared
        } else {
            ToolkitState::Failed
        };
        result
    }

    fn prepare_once(
        &mut self,
        modules: &mut dyn ModuleGateway,
        host: &dyn HostFacts,
        env: &mut dyn EnvSink,
        how: &PrepareOptions,
    ) -> Result<()> {
        if !self.id.is_dummy() && !modules.exists(&self.id.name, &self.id.version) {
            return Err(ToolkitError::ToolkitNotFound {
                name: self.id.name.clone(),
                version: self.id.version.clone(),
            });
        }

        if self.id.is_dummy() {
            if self.id.version == ToolkitId::DUMMY {
                info!("toolkit: dummy mode");
            } else {
                info!("toolkit: dummy mode, but loading dependencies");
                modules.add_modules(&self.dependency_modules());
                modules.load()?;
            }
            return Ok(());
        }

        let previous = modules.loaded_modules();
        debug!(?previous, "previously loaded modules");

        modules.add_modules(&[self.id.module()]);
        modules.load()?;
        self.toolkit_deps = modules
            .loaded_modules()
            .into_iter()
            .filter(|m| !previous.contains(m) && m.name != self.id.name)
            .collect();
        debug!(toolkit_deps = ?self.toolkit_deps, "modules loaded by the toolkit");

        modules.add_modules(&self.dependency_modules());
        modules.load()?;

        let arch = self.architecture(host)?;

        let mut vars = Vars::new();
        let names: Vec<&str> = self.toolkit_deps.iter().map(|m| m.name.as_str()).collect();
        let mut cx = PrepareContext::new(&self.options, Some(arch), &*modules, &mut vars);
        let ran = pipeline::run(&self.rules, &self.id.name, &names, &mut cx)?;
        debug!(?ran, "preparation rules done");

        if how.only_modules {
            debug!("only loading modules, environment left untouched");
        } else {
            for dep in &self.dependencies {
                let root = modules.software_root(&dep.name).ok_or_else(|| {
                    ToolkitError::MissingSoftwareRoot {
                        name: dep.name.clone(),
                    }
                })?;
                flags::dependency_paths(&mut vars, &root);
            }
            apply_vars(&vars, &how.exclude, env);
        }

        self.vars = vars;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use hpctk_host::StaticCpuInfo;
    use hpctk_modules::{MemoryModules, ModuleSpec};

    struct CountingHost(Cell<usize>);

    impl HostFacts for CountingHost {
        fn cpu_info(&self) -> hpctk_host::Result<String> {
            self.0.set(self.0.get() + 1);
            Ok("vendor_id : AuthenticAMD\n".to_string())
        }
    }

    fn intel() -> StaticCpuInfo {
        StaticCpuInfo::with_vendor("GenuineIntel")
    }

    fn catalog() -> MemoryModules {
        MemoryModules::new()
            .with_module(ModuleSpec::new("GCC", "4.6.3", "/nonexistent/GCC"))
            .with_module(ModuleSpec::new("zlib", "1.2.7", "/nonexistent/zlib"))
            .with_module(ModuleSpec::new("bzip2", "1.0.6", "/nonexistent/bzip2"))
    }

    #[test]
    fn version_suffix_selects_32bit() {
        let mut tk = Toolkit::new("ictce", "4.0.6-32bit");
        assert!(tk.options().m32);
        let mut options = BTreeMap::new();
        options.insert("32bit".to_string(), OptionValue::from(false));
        tk.set_options(&options);
        assert!(tk.options().m32);
        assert!(!Toolkit::new("ictce", "4.0.6").options().m32);
    }

    #[test]
    fn architecture_is_cached() {
        let host = CountingHost(Cell::new(0));
        let mut tk = Toolkit::new("GCC", "4.6.3");
        assert_eq!(tk.architecture(&host).unwrap(), CpuVendor::Amd);
        assert_eq!(tk.architecture(&host).unwrap(), CpuVendor::Amd);
        assert_eq!(host.0.get(), 1);
        assert_eq!(tk.arch(), Some(CpuVendor::Amd));
    }

    #[test]
    fn dummy_toolkit_does_nothing() {
        let mut modules = catalog();
        let mut env: BTreeMap<String, String> = BTreeMap::new();
        let mut tk = Toolkit::new("dummy", "dummy");
        tk.add_dependencies(vec![Dependency::new("zlib").with_version("1.2.7")], &modules)
            .unwrap();
        tk.prepare(&mut modules, &intel(), &mut env, &PrepareOptions::default())
            .unwrap();

        assert!(modules.loaded_modules().is_empty());
        assert!(tk.vars().is_empty());
        assert!(env.is_empty());
        assert_eq!(tk.state(), ToolkitState::Prepared);
    }

    #[test]
    fn versioned_dummy_loads_dependencies() {
        let mut modules = catalog();
        let mut env: BTreeMap<String, String> = BTreeMap::new();
        let mut tk = Toolkit::new("dummy", "");
        tk.add_dependencies(vec![Dependency::new("zlib").with_version("1.2.7")], &modules)
            .unwrap();
        tk.prepare(&mut modules, &intel(), &mut env, &PrepareOptions::default())
            .unwrap();

        assert_eq!(modules.loaded_modules(), vec![ModuleId::new("zlib", "1.2.7")]);
        assert!(tk.vars().is_empty());
    }

    #[test]
    fn missing_toolkit_module_fails_once() {
        let mut modules = catalog();
        let mut env: BTreeMap<String, String> = BTreeMap::new();
        let mut tk = Toolkit::new("GCC", "4.7.0");
        let err = tk
            .prepare(&mut modules, &intel(), &mut env, &PrepareOptions::default())
            .unwrap_err();
        assert!(matches!(err, ToolkitError::ToolkitNotFound { .. }));
        assert_eq!(tk.state(), ToolkitState::Failed);

        let again = tk
            .prepare(&mut modules, &intel(), &mut env, &PrepareOptions::default())
            .unwrap_err();
        assert!(matches!(again, ToolkitError::AlreadyPrepared { .. }));
    }

    #[test]
    fn toolkit_deps_exclude_preloaded_and_self() {
        let mut modules = catalog().with_module(
            ModuleSpec::new("goolf", "1.4.10", "/nonexistent/goolf")
                .with_dependency("GCC", "4.6.3")
                .with_dependency("zlib", "1.2.7"),
        );
        modules.preload("zlib", "1.2.7").unwrap();

        let mut env: BTreeMap<String, String> = BTreeMap::new();
        let mut tk = Toolkit::new("goolf", "1.4.10");
        let how = PrepareOptions {
            only_modules: true,
            ..PrepareOptions::default()
        };
        tk.prepare(&mut modules, &intel(), &mut env, &how).unwrap();

        assert_eq!(tk.toolkit_deps(), &[ModuleId::new("GCC", "4.6.3")]);
        assert_eq!(tk.vars().get("CC"), Some("gcc"));
        assert!(env.is_empty());
    }

    #[test]
    fn dependency_without_root_is_fatal() {
        let mut modules = catalog();
        let mut tk = Toolkit::new("GCC", "4.6.3");
        tk.add_dependencies(vec![Dependency::new("bzip2").with_version("1.0.6").toolkit_independent()], &modules)
            .unwrap();
        // Declared, but never loaded: the gateway knows no root for it.
        tk.dependencies[0].name = "bzip".into();
        tk.dependencies[0].module_version = None;

        let mut env: BTreeMap<String, String> = BTreeMap::new();
        let err = tk
            .prepare(&mut modules, &intel(), &mut env, &PrepareOptions::default())
            .unwrap_err();
        assert!(matches!(err, ToolkitError::MissingSoftwareRoot { ref name } if name == "bzip"));
        assert!(env.is_empty());
        assert!(tk.vars().is_empty());
    }
}
