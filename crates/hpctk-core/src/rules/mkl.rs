//! Intel Math Kernel Library.
//!
//! MKL is linked statically through linker groups. The archive names
//! depend on the word size, and the directory layout changed in 10.3
//! (`lib/em64t` became `mkl/lib/intel64`).

use std::path::Path;

use hpctk_modules::version::is_older_than;

use super::{PrepareContext, PreparationRule};
use crate::error::{Result, ToolkitError};
use crate::flags::path_flags;

/// First MKL release with the `mkl/lib/intel64` layout.
const MKL_LAYOUT_CHANGE: &str = "10.3";

const STATIC_VARS: [&str; 6] = [
    "LIBBLAS",
    "LIBBLAS_MT",
    "LIBLAPACK",
    "LIBLAPACK_MT",
    "LIBSCALAPACK",
    "LIBSCALAPACK_MT",
];

/// Variables rewritten with packed linker groups.
const PACKED_VARS: [&str; 5] = [
    "LIBBLAS",
    "LIBBLAS_MT",
    "LIBLAPACK",
    "LIBLAPACK_MT",
    "LIBSCALAPACK",
];

/// Archive naming for one word size.
struct Naming {
    libdir: &'static str,
    suffix: &'static str,
    scalapack_suffix: &'static str,
}

impl Naming {
    fn for_m32(m32: bool) -> Self {
        if m32 {
            Naming {
                libdir: "32",
                suffix: "",
                scalapack_suffix: "_core",
            }
        } else {
            Naming {
                libdir: "em64t",
                suffix: "_lp64",
                scalapack_suffix: "_lp64",
            }
        }
    }
}

/// Static archive `libmkl_<name>.a` under the legacy layout.
fn archive(root: &Path, naming: &Naming, name: &str) -> String {
    root.join("lib")
        .join(naming.libdir)
        .join(format!("libmkl_{name}.a"))
        .display()
        .to_string()
}

fn group(members: &[String]) -> String {
    format!("-Wl,--start-group {} -Wl,--end-group", members.join(" "))
}

/// Rewrite `-Wl,--start-group a b -Wl,--end-group` as one comma-joined
/// token, for tools that cannot handle linker groups.
fn pack_groups(line: &str) -> String {
    line.replace(' ', ",")
        .replace("-Wl,--end-group", "--end-group")
}

#[derive(Debug)]
pub struct Imkl;

impl PreparationRule for Imkl {
    fn prepare(&self, cx: &mut PrepareContext<'_>) -> Result<()> {
        let root = cx.software_root("imkl")?;
        let version = cx.software_version("imkl")?;
        let legacy = is_older_than(&version, MKL_LAYOUT_CHANGE);
        if !legacy && cx.opts.m32 {
            return Err(ToolkitError::Unsupported32BitVersion {
                library: "IMKL".into(),
                version,
            });
        }

        let gcc = cx.is_loaded("GCC");
        if gcc && (cx.is_loaded("icc") || cx.is_loaded("ifort")) {
            return Err(ToolkitError::CompilerConflict {
                library: "IMKL".into(),
            });
        }

        let naming = Naming::for_m32(cx.opts.m32);
        let lib = |name: &str| archive(&root, &naming, name);
        let interface = lib(&format!("intel{}", naming.suffix));

        let sequential = group(&[interface.clone(), lib("sequential"), lib("core")]);
        let threaded = format!(
            "{} -liomp5 -lpthread",
            group(&[interface.clone(), lib("intel_thread"), lib("core")])
        );
        let scalapack = format!(
            "{} {} {}",
            lib(&format!("scalapack{}", naming.scalapack_suffix)),
            lib(&format!("solver{}_sequential", naming.suffix)),
            group(&[
                interface,
                lib("sequential"),
                lib("core"),
                lib(&format!("blacs_intelmpi{}", naming.suffix)),
            ])
        );

        cx.vars.set("LIBLAPACK", sequential);
        cx.vars.copy("LIBLAPACK", "LIBBLAS");
        cx.vars.set("LIBLAPACK_MT", threaded);
        cx.vars.copy("LIBLAPACK_MT", "LIBBLAS_MT");
        cx.vars.set("LIBSCALAPACK", scalapack);

        if cx.opts.packed_groups {
            for key in PACKED_VARS {
                let packed = pack_groups(cx.vars.get_or_empty(key));
                cx.vars.set(key, packed);
            }
        }

        let scalapack_mt = format!(
            "{} -liomp5 -lpthread",
            cx.vars
                .get_or_empty("LIBSCALAPACK")
                .replace(&format!("libmkl_solver{}_sequential", naming.suffix), "libmkl_solver")
                .replace("libmkl_sequential", "libmkl_intel_thread")
        );
        cx.vars.set("LIBSCALAPACK_MT", scalapack_mt);

        let (libdirs, includedirs): (&[&str], &[&str]) = if legacy {
            let libdirs: &[&str] = if cx.opts.m32 {
                &["lib/32"][..]
            } else {
                &["lib/em64t"][..]
            };
            (libdirs, &["include", "include/fftw"][..])
        } else {
            for key in STATIC_VARS {
                let moved = cx.vars.get_or_empty(key).replace("/lib/em64t/", "/mkl/lib/intel64/");
                cx.vars.set(key, moved);
            }
            (
                &["lib/intel64", "mkl/lib/intel64"][..],
                &["mkl/include", "mkl/include/fftw"][..],
            )
        };
        path_flags(cx.vars, &root, libdirs, "-L", "LDFLAGS");
        path_flags(cx.vars, &root, includedirs, "-I", "CPPFLAGS");

        if gcc {
            for key in STATIC_VARS {
                let swapped = cx.vars.get_or_empty(key).replace("mkl_intel_lp64", "mkl_gf_lp64");
                cx.vars.set(key, swapped);
            }
        }
        Ok(())
    }
}
