//! Distributed linear algebra: BLACS, ScaLAPACK, and FLAME on top of LAPACK.

use super::{PrepareContext, PreparationRule};
use crate::error::Result;

#[derive(Debug)]
pub struct Blacs;

impl PreparationRule for Blacs {
    fn prepare(&self, cx: &mut PrepareContext<'_>) -> Result<()> {
        for key in ["LIBSCALAPACK", "LIBSCALAPACK_MT"] {
            cx.vars.append(key, "-lblacsF77init -lblacs");
        }
        cx.add_dependency_paths("BLACS")
    }
}

/// libFLAME, used through its LAPACK compatibility layer.
#[derive(Debug)]
pub struct Flame;

impl PreparationRule for Flame {
    fn prepare(&self, cx: &mut PrepareContext<'_>) -> Result<()> {
        for key in ["LIBLAPACK", "LIBLAPACK_MT"] {
            cx.vars.append(key, "-llapack2flame -lflame");
        }
        cx.add_dependency_paths("FLAME")
    }
}

#[derive(Debug)]
pub struct ScaLapack;

impl PreparationRule for ScaLapack {
    fn prepare(&self, cx: &mut PrepareContext<'_>) -> Result<()> {
        cx.vars.append("LIBSCALAPACK", "-lscalapack");
        cx.vars.append("LIBSCALAPACK_MT", "-lscalapack -lpthread");
        cx.add_dependency_paths("ScaLAPACK")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ToolkitOptions;
    use crate::rules::blas::{Atlas, Lapack};
    use crate::rules::testing;
    use crate::vars::Vars;

    #[test]
    fn blacs_then_scalapack() {
        let modules = testing::loaded(&[("BLACS", "1.1"), ("ScaLAPACK", "1.8.0")]);
        let mut vars = Vars::new();
        let opts = ToolkitOptions::default();
        testing::run(&opts, &modules, &mut vars, |cx| {
            Blacs.prepare(cx)?;
            ScaLapack.prepare(cx)
        })
        .unwrap();

        assert_eq!(
            vars.get("LIBSCALAPACK"),
            Some("-lblacsF77init -lblacs -lscalapack")
        );
        assert_eq!(
            vars.get("LIBSCALAPACK_MT"),
            Some("-lblacsF77init -lblacs -lscalapack -lpthread")
        );
    }

    #[test]
    fn blacs_keeps_existing_line() {
        let modules = testing::loaded(&[("BLACS", "1.1")]);
        let mut vars = Vars::new();
        vars.set("LIBSCALAPACK", "-lmpiblacs");
        let opts = ToolkitOptions::default();
        testing::run(&opts, &modules, &mut vars, |cx| Blacs.prepare(cx)).unwrap();
        assert_eq!(vars.get("LIBSCALAPACK"), Some("-lmpiblacs -lblacsF77init -lblacs"));
    }

    #[test]
    fn flame_extends_lapack() {
        let modules = testing::loaded(&[("ATLAS", "3.8.4"), ("LAPACK", "3.4.0"), ("FLAME", "5.0")]);
        let mut vars = Vars::new();
        let opts = ToolkitOptions::default();
        testing::run(&opts, &modules, &mut vars, |cx| {
            Atlas.prepare(cx)?;
            Lapack.prepare(cx)?;
            Flame.prepare(cx)
        })
        .unwrap();

        assert_eq!(
            vars.get("LIBLAPACK"),
            Some("-latlas -llapack -lcblas -lf77blas -llapack -llapack2flame -lflame")
        );
        assert!(vars.get("LIBLAPACK_MT").unwrap().ends_with("-lpthread -llapack2flame -lflame"));
    }
}
