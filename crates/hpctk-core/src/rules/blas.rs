//! BLAS implementations, LAPACK on top of them, and FFTW.

use super::{PrepareContext, PreparationRule};
use crate::error::{Result, ToolkitError};

/// ATLAS (ships its own LAPACK subset).
#[derive(Debug)]
pub struct Atlas;

impl PreparationRule for Atlas {
    fn prepare(&self, cx: &mut PrepareContext<'_>) -> Result<()> {
        cx.vars.set("LIBBLAS", "-latlas -llapack -lcblas -lf77blas");
        cx.vars.set(
            "LIBBLAS_MT",
            "-latlas -llapack -lptcblas -lptf77blas -lpthread",
        );
        cx.add_dependency_paths("ATLAS")
    }
}

/// GotoBLAS.
#[derive(Debug)]
pub struct GotoBlas;

impl PreparationRule for GotoBlas {
    fn prepare(&self, cx: &mut PrepareContext<'_>) -> Result<()> {
        cx.vars.set("LIBBLAS", "-lgoto");
        cx.vars.copy("LIBBLAS", "LIBBLAS_MT");
        cx.add_dependency_paths("GotoBLAS")
    }
}

/// AMD Core Math Library. Archives live in a compiler-specific subdirectory.
#[derive(Debug)]
pub struct Acml;

impl PreparationRule for Acml {
    fn prepare(&self, cx: &mut PrepareContext<'_>) -> Result<()> {
        if cx.opts.m32 {
            return Err(ToolkitError::Unsupported32Bit {
                library: "ACML".into(),
            });
        }
        if !cx.is_loaded("GCC") {
            return Err(ToolkitError::UnknownCompilerLayout {
                library: "ACML".into(),
            });
        }
        let compiler = "gfortran";

        cx.add_dependency_paths("ACML")?;
        let root = cx.software_root("ACML")?;
        let libdir = root.join(format!("{compiler}64")).join("lib");
        cx.vars.set(
            "LIBBLAS",
            format!(
                "{} {} -lpthread",
                libdir.join("libacml_mv.a").display(),
                libdir.join("libacml.a").display()
            ),
        );
        cx.vars.copy("LIBBLAS", "LIBBLAS_MT");
        Ok(())
    }
}

/// Reference LAPACK, linked after whichever BLAS ran before it.
#[derive(Debug)]
pub struct Lapack;

impl PreparationRule for Lapack {
    fn prepare(&self, cx: &mut PrepareContext<'_>) -> Result<()> {
        let blas = cx.vars.get_or_empty("LIBBLAS").to_string();
        let blas_mt = cx.vars.get_or_empty("LIBBLAS_MT").to_string();
        cx.vars.set("LIBLAPACK", format!("{blas} -llapack"));
        cx.vars.set("LIBLAPACK_MT", format!("{blas_mt} -llapack -lpthread"));
        cx.add_dependency_paths("LAPACK")
    }
}

/// FFTW; version 3 libraries carry a `3` suffix.
#[derive(Debug)]
pub struct Fftw;

impl PreparationRule for Fftw {
    fn prepare(&self, cx: &mut PrepareContext<'_>) -> Result<()> {
        let version = cx.software_version("FFTW")?;
        let suffix = if version.starts_with("3.") { "3" } else { "" };

        cx.vars.set("LIBFFT", format!("-lfftw{suffix}"));
        if cx.opts.usempi {
            cx.vars.append("LIBFFT", &format!("-lfftw{suffix}_mpi"));
        }
        cx.add_dependency_paths("FFTW")
    }
}
