//! Compiler families: GCC and the Intel compilers.

use hpctk_modules::version::is_older_than;

use super::{PrepareContext, PreparationRule};
use crate::error::{Result, ToolkitError};
use crate::flags::{optimization_level, options_to_flags, render, FlagOption, Spelling};

/// Fortran runtime linked explicitly to avoid picking up a system libgfortranbegin.
const GCC_FLIBS: &str = "-lgfortran";

/// Intel compilers older than this also need `-lguide`.
const ICC_GUIDE_BEFORE: &str = "2011";

const GCC_LOOP_FLAGS: &[&str] = &[
    "ftree-switch-conversion",
    "floop-interchange",
    "floop-strip-mine",
    "floop-block",
];

/// Set the compiler flag variables from a common flag list.
fn set_compiler_flags(cx: &mut PrepareContext<'_>, flags: &[String]) {
    let mut cflags = flags.to_vec();
    if let Some(cstd) = &cx.opts.cstd {
        cflags.push(format!("std={cstd}"));
    }
    cx.vars.set("CFLAGS", render(&cflags));
    let common = render(flags);
    for key in ["CXXFLAGS", "FFLAGS", "F90FLAGS"] {
        cx.vars.set(key, common.clone());
    }
}

/// GNU compilers: gcc, g++, gfortran.
#[derive(Debug)]
pub struct Gcc;

impl PreparationRule for Gcc {
    fn prepare(&self, cx: &mut PrepareContext<'_>) -> Result<()> {
        if cx.opts.m32 {
            return Err(ToolkitError::Unsupported32Bit {
                library: "GCC based toolkits".into(),
            });
        }

        cx.vars.set("CC", "gcc");
        cx.vars.set("CXX", "g++");
        cx.vars.set("F77", "gfortran");
        cx.vars.set("F90", "gfortran");
        if cx.opts.cciscxx {
            cx.vars.copy("CC", "CXX");
        }

        let mut flags = Vec::new();
        if cx.opts.optarch {
            flags.push("march=native".to_string());
        }
        flags.push(optimization_level(cx.opts).to_string());
        flags.extend(options_to_flags(
            cx.opts,
            &[
                (FlagOption::I8, Spelling::One("fdefault-integer-8")),
                (FlagOption::Unroll, Spelling::One("funroll-loops")),
                (FlagOption::F2c, Spelling::One("ff2c")),
                (FlagOption::Loop, Spelling::Many(GCC_LOOP_FLAGS)),
            ],
        ));
        set_compiler_flags(cx, &flags);

        cx.vars.set("FLIBS", GCC_FLIBS);
        Ok(())
    }
}

/// Intel compilers: icc, icpc, ifort.
#[derive(Debug)]
pub struct IntelCompilers;

impl PreparationRule for IntelCompilers {
    fn prepare(&self, cx: &mut PrepareContext<'_>) -> Result<()> {
        let cc = cx.with_m32("icc");
        let cxx = cx.with_m32("icpc");
        let fc = cx.with_m32("ifort");
        cx.vars.set("CC", cc);
        cx.vars.set("CXX", cxx);
        cx.vars.set("F77", fc.clone());
        cx.vars.set("F90", fc);
        if cx.opts.cciscxx {
            cx.vars.copy("CC", "CXX");
        }

        let mut flags = Vec::new();
        if cx.opts.optarch {
            flags.push(cx.optimal_arch_flag()?.to_string());
        }
        flags.push(optimization_level(cx.opts).to_string());
        flags.extend(options_to_flags(
            cx.opts,
            &[
                (FlagOption::IntelStatic, Spelling::One("static-intel")),
                (FlagOption::NoIcc, Spelling::One("no-icc")),
            ],
        ));
        set_compiler_flags(cx, &flags);

        let version = cx.software_version("icc")?;
        let runtime = if is_older_than(&version, ICC_GUIDE_BEFORE) {
            "-liomp5 -lguide -lpthread"
        } else {
            "-liomp5 -lpthread"
        };
        cx.vars.append("LIBS", runtime);
        Ok(())
    }
}
