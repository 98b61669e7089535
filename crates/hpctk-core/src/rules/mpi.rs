//! MPI libraries. Each rule defines `MPICC`, `MPICXX`, `MPIF77` and
//! `MPIF90`; with `usempi` those wrappers also become `CC`, `CXX`, `F77`
//! and `F90`.

use super::{PrepareContext, PreparationRule};
use crate::error::{Result, ToolkitError};

/// Version marker of ScaleMP's MPICH2 build.
const SCALEMP_MARKER: &str = "vSMP";

fn set_wrappers(cx: &mut PrepareContext<'_>, cc: String, cxx: String, f77: String, f90: String) {
    cx.vars.set("MPICC", cc);
    cx.vars.set("MPICXX", cxx);
    cx.vars.set("MPIF77", f77);
    cx.vars.set("MPIF90", f90);
    if cx.opts.cciscxx {
        cx.vars.copy("MPICC", "MPICXX");
    }
    cx.promote_mpi_wrappers();
}

/// Intel MPI.
#[derive(Debug)]
pub struct IntelMpi;

impl PreparationRule for IntelMpi {
    fn prepare(&self, cx: &mut PrepareContext<'_>) -> Result<()> {
        let intel_toolkit = cx.is_loaded("icc") && cx.is_loaded("ifort") && !cx.is_loaded("GCC");

        if intel_toolkit {
            let (cc, cxx, f77, f90) = (
                cx.with_m32("mpiicc"),
                cx.with_m32("mpiicpc"),
                cx.with_m32("mpiifort"),
                cx.with_m32("mpiifort"),
            );
            set_wrappers(cx, cc, cxx, f77, f90);
            // Make mpicc/mpicxx call the Intel compilers.
            cx.vars.set("I_MPI_CC", "icc");
            cx.vars.set("I_MPI_CXX", "icpc");
        } else {
            let wrap = |cx: &PrepareContext<'_>, wrapper: &str, option: &str, key: &str| {
                cx.with_m32(&format!("{wrapper} -{option}={}", cx.vars.get_or_empty(key)))
            };
            let (cc, cxx, f77, f90) = (
                wrap(cx, "mpicc", "cc", "CC"),
                wrap(cx, "mpicxx", "cxx", "CXX"),
                wrap(cx, "mpif77", "fc", "F77"),
                wrap(cx, "mpif90", "fc", "F90"),
            );
            set_wrappers(cx, cc, cxx, f77, f90);
        }
        Ok(())
    }
}

/// MPI libraries with plain `mpicc`-style wrappers (OpenMPI, MVAPICH2).
#[derive(Debug)]
pub struct SimpleMpi;

impl PreparationRule for SimpleMpi {
    fn prepare(&self, cx: &mut PrepareContext<'_>) -> Result<()> {
        let (cc, cxx, f77, f90) = (
            cx.with_m32("mpicc"),
            cx.with_m32("mpicxx"),
            cx.with_m32("mpif77"),
            cx.with_m32("mpif90"),
        );
        set_wrappers(cx, cc, cxx, f77, f90);
        Ok(())
    }
}

/// QLogic MPI: wrappers are told which compiler to run.
#[derive(Debug)]
pub struct QLogicMpi;

impl PreparationRule for QLogicMpi {
    fn prepare(&self, cx: &mut PrepareContext<'_>) -> Result<()> {
        let v = |key: &str| cx.vars.get_or_empty(key).to_string();
        let (cc, cxx, f77, f90) = (
            format!("mpicc -cc=\"{}\"", v("CC")),
            format!("mpicxx -CC=\"{}\"", v("CXX")),
            format!("mpif77 -fc=\"{}\"", v("F77")),
            format!("mpif90 -f90=\"{}\"", v("F90")),
        );
        set_wrappers(cx, cc, cxx, f77, f90);
        Ok(())
    }
}

/// MPICH2; only ScaleMP's build is supported.
#[derive(Debug)]
pub struct Mpich2;

impl PreparationRule for Mpich2 {
    fn prepare(&self, cx: &mut PrepareContext<'_>) -> Result<()> {
        let version = cx.software_version("MPICH2")?;
        if !version.contains(SCALEMP_MARKER) {
            return Err(ToolkitError::UnsupportedMpich2 { version });
        }

        let v = |key: &str| cx.with_m32(cx.vars.get_or_empty(key));
        let (cc, cxx, f77, f90) = (
            format!("mpicc -cc=\"{}\"", v("CC")),
            format!("mpicxx -CC=\"{}\"", v("CXX")),
            format!("mpif77 -fc=\"{}\"", v("F77")),
            format!("mpif90 -f90=\"{}\"", v("F90")),
        );
        set_wrappers(cx, cc, cxx, f77, f90);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ToolkitOptions;
    use crate::rules::testing;
    use crate::vars::Vars;

    fn gcc_vars() -> Vars {
        let mut vars = Vars::new();
        vars.set("CC", "gcc");
        vars.set("CXX", "g++");
        vars.set("F77", "gfortran");
        vars.set("F90", "gfortran");
        vars
    }

    #[test]
    fn simple_mpi_wrappers() {
        let modules = testing::loaded(&[("OpenMPI", "1.4.5")]);
        let mut vars = gcc_vars();
        let opts = ToolkitOptions::default();
        testing::run(&opts, &modules, &mut vars, |cx| SimpleMpi.prepare(cx)).unwrap();

        assert_eq!(vars.get("MPICC"), Some("mpicc"));
        assert_eq!(vars.get("MPICXX"), Some("mpicxx"));
        assert_eq!(vars.get("MPIF77"), Some("mpif77"));
        assert_eq!(vars.get("MPIF90"), Some("mpif90"));
        assert_eq!(vars.get("CC"), Some("gcc"));
    }

    #[test]
    fn usempi_promotes_wrappers() {
        let modules = testing::loaded(&[("OpenMPI", "1.4.5")]);
        let mut vars = gcc_vars();
        let opts = ToolkitOptions {
            usempi: true,
            cciscxx: true,
            ..ToolkitOptions::default()
        };
        testing::run(&opts, &modules, &mut vars, |cx| SimpleMpi.prepare(cx)).unwrap();

        assert_eq!(vars.get("CC"), Some("mpicc"));
        assert_eq!(vars.get("CXX"), Some("mpicc"));
        assert_eq!(vars.get("F90"), Some("mpif90"));
    }

    #[test]
    fn intel_mpi_with_intel_compilers() {
        let modules = testing::loaded(&[("icc", "2011.6.233"), ("ifort", "2011.6.233"), ("impi", "4.0.2")]);
        let mut vars = Vars::new();
        let opts = ToolkitOptions::default();
        testing::run(&opts, &modules, &mut vars, |cx| IntelMpi.prepare(cx)).unwrap();

        assert_eq!(vars.get("MPICC"), Some("mpiicc"));
        assert_eq!(vars.get("MPICXX"), Some("mpiicpc"));
        assert_eq!(vars.get("MPIF90"), Some("mpiifort"));
        assert_eq!(vars.get("I_MPI_CC"), Some("icc"));
        assert_eq!(vars.get("I_MPI_CXX"), Some("icpc"));
    }

    #[test]
    fn intel_mpi_with_gcc() {
        let modules = testing::loaded(&[("GCC", "4.6.3"), ("impi", "4.0.2")]);
        let mut vars = gcc_vars();
        let opts = ToolkitOptions::default();
        testing::run(&opts, &modules, &mut vars, |cx| IntelMpi.prepare(cx)).unwrap();

        assert_eq!(vars.get("MPICC"), Some("mpicc -cc=gcc"));
        assert_eq!(vars.get("MPICXX"), Some("mpicxx -cxx=g++"));
        assert_eq!(vars.get("MPIF77"), Some("mpif77 -fc=gfortran"));
        assert!(!vars.contains("I_MPI_CC"));
    }

    #[test]
    fn qlogic_quotes_current_compilers() {
        let modules = testing::loaded(&[("QLogicMPI", "2.5")]);
        let mut vars = gcc_vars();
        let opts = ToolkitOptions::default();
        testing::run(&opts, &modules, &mut vars, |cx| QLogicMpi.prepare(cx)).unwrap();

        assert_eq!(vars.get("MPICC"), Some("mpicc -cc=\"gcc\""));
        assert_eq!(vars.get("MPICXX"), Some("mpicxx -CC=\"g++\""));
        assert_eq!(vars.get("MPIF90"), Some("mpif90 -f90=\"gfortran\""));
    }

    #[test]
    fn scalemp_mpich2() {
        let modules = testing::loaded(&[("MPICH2", "1.1-vSMP")]);
        let mut vars = gcc_vars();
        let opts = ToolkitOptions {
            m32: true,
            ..ToolkitOptions::default()
        };
        testing::run(&opts, &modules, &mut vars, |cx| Mpich2.prepare(cx)).unwrap();
        assert_eq!(vars.get("MPICC"), Some("mpicc -cc=\"gcc -m32\""));
    }

    #[test]
    fn plain_mpich2_is_rejected() {
        let modules = testing::loaded(&[("MPICH2", "1.4.1")]);
        let mut vars = gcc_vars();
        let opts = ToolkitOptions::default();
        let err = testing::run(&opts, &modules, &mut vars, |cx| Mpich2.prepare(cx)).unwrap_err();
        assert!(matches!(err, ToolkitError::UnsupportedMpich2 { ref version } if version == "1.4.1"));
        assert!(!vars.contains("MPICC"));
    }
}
