//! Library preparation rules.
//!
//! One rule per supported compiler family or library. A rule reads the
//! toolkit options and the loaded modules, and writes into the shared
//! variable mapping carried by [`PrepareContext`]. Rules with a higher
//! priority number read what lower-numbered rules wrote (LAPACK extends
//! the BLAS link line, ScaLAPACK extends BLACS), so the table is ordered
//! by priority once, at construction.

pub mod blas;
pub mod compilers;
pub mod mkl;
pub mod mpi;
pub mod scalapack;

use std::fmt;
use std::path::PathBuf;

use hpctk_host::CpuVendor;
use hpctk_modules::ModuleGateway;

use crate::error::{Result, ToolkitError};
use crate::flags;
use crate::options::ToolkitOptions;
use crate::vars::Vars;

/// Priority of compiler rules.
pub const PRIORITY_COMPILER: u8 = 1;
/// Priority of MPI rules.
pub const PRIORITY_MPI: u8 = 2;
/// Priority of BLAS-family rules (and FFTW).
pub const PRIORITY_BLAS: u8 = 3;
/// Priority of the LAPACK rule.
pub const PRIORITY_LAPACK: u8 = 4;
/// Priority of BLACS and FLAME.
pub const PRIORITY_BLACS: u8 = 5;
/// Priority of the ScaLAPACK rule.
pub const PRIORITY_SCALAPACK: u8 = 6;

/// State shared by all rules during one preparation.
pub struct PrepareContext<'a> {
    pub opts: &'a ToolkitOptions,
    pub arch: Option<CpuVendor>,
    pub modules: &'a dyn ModuleGateway,
    pub vars: &'a mut Vars,
}

impl<'a> PrepareContext<'a> {
    pub fn new(
        opts: &'a ToolkitOptions,
        arch: Option<CpuVendor>,
        modules: &'a dyn ModuleGateway,
        vars: &'a mut Vars,
    ) -> Self {
        Self {
            opts,
            arch,
            modules,
            vars,
        }
    }

    /// `-m32` when building 32-bit, else empty.
    pub fn m32_flag(&self) -> &'static str {
        if self.opts.m32 {
            "-m32"
        } else {
            ""
        }
    }

    /// A command with the 32-bit flag attached when building 32-bit.
    pub fn with_m32(&self, command: &str) -> String {
        if self.opts.m32 {
            format!("{command} -m32")
        } else {
            command.to_string()
        }
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.modules.is_loaded(name)
    }

    /// Installation root of a loaded library.
    pub fn software_root(&self, name: &str) -> Result<PathBuf> {
        self.modules
            .software_root(name)
            .ok_or_else(|| ToolkitError::MissingSoftwareRoot {
                name: name.to_string(),
            })
    }

    /// Version of a loaded library.
    pub fn software_version(&self, name: &str) -> Result<String> {
        self.modules
            .software_version(name)
            .ok_or_else(|| ToolkitError::MissingSoftwareVersion {
                name: name.to_string(),
            })
    }

    /// Add the include and library directories of a loaded library to
    /// `CPPFLAGS` and `LDFLAGS`.
    pub fn add_dependency_paths(&mut self, name: &str) -> Result<()> {
        let root = self.software_root(name)?;
        flags::dependency_paths(self.vars, &root);
        Ok(())
    }

    /// Architecture-specific optimization flag for the detected CPU.
    pub fn optimal_arch_flag(&self) -> Result<&'static str> {
        self.arch
            .map(|arch| arch.optimal_arch_flag())
            .ok_or(ToolkitError::UnknownOptArch)
    }

    /// With `usempi`, make the MPI wrappers the default compilers.
    pub fn promote_mpi_wrappers(&mut self) {
        if self.opts.usempi {
            for key in ["CC", "CXX", "F77", "F90"] {
                self.vars.copy(&format!("MPI{key}"), key);
            }
        }
    }
}

/// Preparation logic for one library or compiler family.
pub trait PreparationRule: fmt::Debug {
    fn prepare(&self, cx: &mut PrepareContext<'_>) -> Result<()>;
}

/// A rule together with its ordering priority and the module names it
/// handles.
#[derive(Debug)]
pub struct RuleEntry {
    pub priority: u8,
    /// Module names this rule prepares for; the first is its canonical name.
    pub libraries: &'static [&'static str],
    pub rule: Box<dyn PreparationRule>,
}

impl RuleEntry {
    pub fn new(priority: u8, libraries: &'static [&'static str], rule: impl PreparationRule + 'static) -> Self {
        Self {
            priority,
            libraries,
            rule: Box::new(rule),
        }
    }

    /// Canonical library name.
    pub fn name(&self) -> &'static str {
        self.libraries.first().copied().unwrap_or("")
    }

    /// Case-insensitive match against a module name.
    pub fn handles(&self, library: &str) -> bool {
        self.libraries.iter().any(|l| l.eq_ignore_ascii_case(library))
    }
}

/// The set of known rules, ordered by priority.
#[derive(Debug)]
pub struct RuleTable {
    entries: Vec<RuleEntry>,
}

impl RuleTable {
    /// Build a table; entries are stably sorted by priority.
    pub fn new(mut entries: Vec<RuleEntry>) -> Self {
        entries.sort_by_key(|e| e.priority);
        Self { entries }
    }

    /// Every rule this crate ships.
    pub fn standard() -> Self {
        use blas::{Acml, Atlas, Fftw, GotoBlas, Lapack};
        use compilers::{Gcc, IntelCompilers};
        use mkl::Imkl;
        use mpi::{IntelMpi, Mpich2, QLogicMpi, SimpleMpi};
        use scalapack::{Blacs, Flame, ScaLapack};

        Self::new(vec![
            RuleEntry::new(PRIORITY_COMPILER, &["GCC"], Gcc),
            RuleEntry::new(PRIORITY_COMPILER, &["icc", "ifort"], IntelCompilers),
            RuleEntry::new(PRIORITY_MPI, &["impi"], IntelMpi),
            RuleEntry::new(PRIORITY_MPI, &["MPICH2"], Mpich2),
            RuleEntry::new(PRIORITY_MPI, &["MVAPICH2"], SimpleMpi),
            RuleEntry::new(PRIORITY_MPI, &["OpenMPI"], SimpleMpi),
            RuleEntry::new(PRIORITY_MPI, &["QLogicMPI"], QLogicMpi),
            RuleEntry::new(PRIORITY_BLAS, &["ACML"], Acml),
            RuleEntry::new(PRIORITY_BLAS, &["ATLAS"], Atlas),
            RuleEntry::new(PRIORITY_BLAS, &["FFTW"], Fftw),
            RuleEntry::new(PRIORITY_BLAS, &["GotoBLAS"], GotoBlas),
            RuleEntry::new(PRIORITY_BLAS, &["imkl"], Imkl),
            RuleEntry::new(PRIORITY_LAPACK, &["LAPACK"], Lapack),
            RuleEntry::new(PRIORITY_BLACS, &["BLACS"], Blacs),
            RuleEntry::new(PRIORITY_BLACS, &["FLAME"], Flame),
            RuleEntry::new(PRIORITY_SCALAPACK, &["ScaLAPACK"], ScaLapack),
        ])
    }

    /// Index of the rule handling `library`.
    pub fn position(&self, library: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.handles(library))
    }

    pub fn find(&self, library: &str) -> Option<&RuleEntry> {
        self.position(library).map(|i| &self.entries[i])
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_is_sorted() {
        let table = RuleTable::standard();
        let priorities: Vec<u8> = table.entries().iter().map(|e| e.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
        assert_eq!(table.entries().len(), 16);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let table = RuleTable::standard();
        assert_eq!(table.find("openmpi").map(|e| e.name()), Some("OpenMPI"));
        assert_eq!(table.find("SCALAPACK").map(|e| e.priority), Some(PRIORITY_SCALAPACK));
        assert_eq!(table.find("ifort").map(|e| e.name()), Some("icc"));
        assert!(table.find("unknownlib").is_none());
    }

    #[test]
    fn new_sorts_by_priority() {
        let table = RuleTable::new(vec![
            RuleEntry::new(PRIORITY_LAPACK, &["LAPACK"], blas::Lapack),
            RuleEntry::new(PRIORITY_COMPILER, &["GCC"], compilers::Gcc),
            RuleEntry::new(PRIORITY_BLAS, &["ATLAS"], blas::Atlas),
        ]);
        let names: Vec<&str> = table.entries().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["GCC", "ATLAS", "LAPACK"]);
    }

    #[test]
    fn m32_helpers() {
        let modules = testing::loaded(&[]);
        let mut vars = Vars::new();
        let mut opts = ToolkitOptions::default();
        testing::run(&opts, &modules, &mut vars, |cx| {
            assert_eq!(cx.with_m32("mpicc"), "mpicc");
            assert_eq!(cx.m32_flag(), "");
        });
        opts.m32 = true;
        testing::run(&opts, &modules, &mut vars, |cx| {
            assert_eq!(cx.with_m32("mpicc"), "mpicc -m32");
        });
    }

    #[test]
    fn missing_root_is_environment_error() {
        let modules = testing::loaded(&[]);
        let mut vars = Vars::new();
        let opts = ToolkitOptions::default();
        let err = testing::run(&opts, &modules, &mut vars, |cx| cx.add_dependency_paths("ATLAS"))
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Environment);
    }

    #[test]
    fn optarch_requires_detected_arch() {
        let modules = testing::loaded(&[]);
        let mut vars = Vars::new();
        let opts = ToolkitOptions::default();
        let mut cx = PrepareContext::new(&opts, None, &modules, &mut vars);
        assert!(matches!(cx.optimal_arch_flag(), Err(ToolkitError::UnknownOptArch)));
        cx.arch = Some(CpuVendor::Amd);
        assert_eq!(cx.optimal_arch_flag().unwrap(), "msse3");
    }
}
