//! Bracketed root finding with Brent's method.

use thiserror::Error;

#[derive(Debug, Error, Copy, Clone, PartialEq)]
pub enum RootError {
    #[error("function values at the bracket endpoints must have opposite signs")]
    NoSignChange,
    #[error("root finding did not converge after {0} iterations")]
    NotConverged(usize),
}

/// Termination parameters for [`brent()`].
#[derive(Debug, Copy, Clone)]
pub struct Tolerance {
    pub xtol: f64,
    pub rtol: f64,
    pub max_iterations: usize,
}

impl Default for Tolerance {
    fn default() -> Tolerance {
        Tolerance {
            xtol: 2e-12,
            rtol: 4.0 * f64::EPSILON,
            max_iterations: 100,
        }
    }
}

/// Finds a root of `f` in the bracket `[lo, hi]`.
///
/// Combines bisection, secant and inverse quadratic interpolation steps. The
/// bracket is kept throughout, so the result is guaranteed to lie within
/// `[lo, hi]` whenever `f(lo)` and `f(hi)` differ in sign.
pub fn brent<F>(mut f: F, lo: f64, hi: f64, tolerance: Tolerance) -> Result<f64, RootError>
where
    F: FnMut(f64) -> f64,
{
    let mut xpre = lo;
    let mut xcur = hi;
    let mut fpre = f(xpre);
    let mut fcur = f(xcur);

    if fpre.is_nan() || fcur.is_nan() {
        return Err(RootError::NoSignChange);
    }
    if fpre == 0.0 {
        return Ok(xpre);
    }
    if fcur == 0.0 {
        return Ok(xcur);
    }
    if fpre.signum() == fcur.signum() {
        return Err(RootError::NoSignChange);
    }

    let mut xblk = 0.0;
    let mut fblk = 0.0;
    let mut spre = 0.0;
    let mut scur = 0.0;

    for _ in 0..tolerance.max_iterations {
        if fpre != 0.0 && fcur != 0.0 && fpre.signum() != fcur.signum() {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;

            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = (tolerance.xtol + tolerance.rtol * xcur.abs()) / 2.0;
        let sbis = (xblk - xcur) / 2.0;
        if fcur == 0.0 || sbis.abs() < delta {
            return Ok(xcur);
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // secant
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                // inverse quadratic interpolation
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };
            if 2.0 * stry.abs() < f64::min(spre.abs(), 3.0 * sbis.abs() - delta) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > delta {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { delta } else { -delta };
        }
        fcur = f(xcur);
    }

    Err(RootError::NotConverged(tolerance.max_iterations))
}
