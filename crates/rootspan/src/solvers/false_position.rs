//! Regula falsi with Galdino reduction factors.

use crate::error::{SolverError, SolverResult};
use crate::scalar::Scalar;
use crate::solvers::{
    is_terminal, lossy, normalize, opposite_signs, tole, Normalized, Options, Solution,
};

/// Reduction factor applied to the retained endpoint's cached value.
///
/// Plain regula falsi stagnates against one endpoint on convex or
/// concave stretches because the anchor's function value never shrinks.
/// The twelve factors studied by Galdino deflate that cached value each
/// time the anchor survives an iteration. The classic methods are
/// members of the family and available as aliases: [`Reduction::PEGASUS`],
/// [`Reduction::ILLINOIS`], and [`Reduction::ANDERSON_BJORCK`] (the
/// default).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// `fa * fb / (fb + fx)` (pegasus).
    Galdino1,
    /// `(fa - fb) / 2`.
    Galdino2,
    /// `(fa - fx) / (2 + fx / fb)`.
    Galdino3,
    /// `(fa - fx) / (1 + fx / fb)^2`.
    Galdino4,
    /// `(fa - fx) / (1.5 + fx / fb)^2`.
    Galdino5,
    /// `(fa - fx) / (2 + fx / fb)^2`.
    Galdino6,
    /// `(fa + fx) / (2 + fx / fb)^2`.
    Galdino7,
    /// `fa / 2` (illinois).
    Galdino8,
    /// `fa / (1 + fx / fb)^2`.
    Galdino9,
    /// `(fa - fx) / 4`.
    Galdino10,
    /// `fx * fa / (fb + fx)`.
    Galdino11,
    /// `fa * m` with `m = 1 - fx / fb` when positive, else `1/2`
    /// (anderson-bjorck).
    Galdino12,
}

impl Reduction {
    /// The pegasus method.
    pub const PEGASUS: Self = Self::Galdino1;
    /// The illinois method.
    pub const ILLINOIS: Self = Self::Galdino8;
    /// The Anderson-Bjorck method.
    pub const ANDERSON_BJORCK: Self = Self::Galdino12;

    /// Deflated replacement for the anchor's cached value.
    fn apply<T: Scalar>(self, fa: T, fb: T, fx: T) -> T {
        let one = T::one();
        let two = T::of(2.0);
        match self {
            Self::Galdino1 => fa * fb / (fb + fx),
            Self::Galdino2 => (fa - fb) / two,
            Self::Galdino3 => (fa - fx) / (two + fx / fb),
            Self::Galdino4 => (fa - fx) / (one + fx / fb).powi(2),
            Self::Galdino5 => (fa - fx) / (T::of(1.5) + fx / fb).powi(2),
            Self::Galdino6 => (fa - fx) / (two + fx / fb).powi(2),
            Self::Galdino7 => (fa + fx) / (two + fx / fb).powi(2),
            Self::Galdino8 => fa / two,
            Self::Galdino9 => fa / (one + fx / fb).powi(2),
            Self::Galdino10 => (fa - fx) / T::of(4.0),
            Self::Galdino11 => fx * fa / (fb + fx),
            Self::Galdino12 => {
                let m = one - fx / fb;
                if m > T::zero() {
                    fa * m
                } else {
                    fa * T::of(0.5)
                }
            }
        }
    }
}

impl Default for Reduction {
    fn default() -> Self {
        Self::ANDERSON_BJORCK
    }
}

/// Regula falsi (false position) with a Galdino reduction factor.
///
/// Each step places the next candidate at the secant intersection of the
/// current pair, guarded against stalling within `1e-10` of either
/// endpoint. When the new value shares the moving endpoint's sign, the
/// anchor's cached value is deflated by `reduction` instead of being
/// left to stagnate.
///
/// Requires: `f(a)` and `f(b)` must not both be nonzero with the same
/// sign.
///
/// # Arguments
///
/// * `f` - The function for which to find a root
/// * `a` - One endpoint of the bracket
/// * `b` - The other endpoint of the bracket
/// * `reduction` - The reduction factor to apply to a stagnating anchor
/// * `options` - Solver configuration
///
/// # Errors
///
/// Returns an error if the bracket or tolerances are invalid, or if the
/// iteration caps are exhausted before convergence.
///
/// # Example
///
/// ```rust
/// use rootspan::solvers::{false_position, Options, Reduction};
///
/// let f = |x: f64| x * x * x - 1.0;
///
/// let solution = false_position(f, 0.0, 2.0, Reduction::default(), &Options::default()).unwrap();
/// assert!((solution.root - 1.0).abs() < 1e-9);
/// ```
pub fn false_position<T, F>(
    mut f: F,
    a: T,
    b: T,
    reduction: Reduction,
    options: &Options,
) -> SolverResult<Solution<T>>
where
    T: Scalar,
    F: FnMut(T) -> T,
{
    options.validate()?;
    let mut state = match normalize(&mut f, a, b)? {
        Normalized::Root { x, fx, fn_evals } => {
            return Ok(Solution {
                root: x,
                residual: fx,
                iterations: 0,
                fn_evals,
            })
        }
        Normalized::Bracketed(state) => state,
    };

    let tau = T::of(1e-10);
    // Anchor and moving end; the anchor is replaced only on a sign
    // change, so the pair is not kept ordered.
    let (mut x1, mut f1, mut x2, mut f2) = (state.a, state.fa, state.b, state.fb);
    let mut answer = state.best_estimate();

    while !state.converged && !state.stopped {
        if state.steps >= options.max_iters {
            state.stopped = true;
            state.message = Some("maximum iterations reached".into());
            break;
        }
        if options
            .max_fn_evals
            .is_some_and(|cap| state.fn_evals >= cap)
        {
            state.stopped = true;
            state.message = Some("function evaluation cap reached".into());
            break;
        }

        let mut lambda = f2 / (f2 - f1);
        if !(lambda.abs() > tau && lambda.abs() < T::one() - tau) {
            lambda = T::of(0.5);
        }
        let x = x2 - lambda * (x2 - x1);
        let fx = f(x);
        state.fn_evals += 1;
        state.steps += 1;

        if is_terminal(fx) {
            answer = (x, fx);
            state.converged = true;
            break;
        }
        if opposite_signs(fx, f2) {
            x1 = x2;
            f1 = f2;
        } else {
            f1 = reduction.apply(f1, f2, fx);
        }
        x2 = x;
        f2 = fx;

        if x1 <= x2 {
            state.a = x1;
            state.fa = f1;
            state.b = x2;
            state.fb = f2;
        } else {
            state.a = x2;
            state.fa = f2;
            state.b = x1;
            state.fb = f1;
        }
        if options.verbose {
            log::debug!(
                "false_position step {}: a = {}, b = {}, f({x}) = {fx}",
                state.steps,
                state.a,
                state.b,
            );
        }

        let width = (x2 - x1).abs();
        let threshold = tole(state.a, state.b, state.fa, state.fb, T::of(options.x_abs_tol))
            .max(T::of(options.x_rel_tol) * x.abs());
        if fx.abs() <= T::of(options.residual_tol) || width <= threshold {
            answer = (x, fx);
            state.converged = true;
        }
    }

    if state.converged {
        Ok(Solution {
            root: answer.0,
            residual: answer.1,
            iterations: state.steps,
            fn_evals: state.fn_evals,
        })
    } else {
        if options.verbose {
            if let Some(message) = &state.message {
                log::debug!("false_position stopped: {message}");
            }
        }
        let (x, fx) = state.best_estimate();
        Err(SolverError::convergence_failed(
            state.steps,
            lossy(fx.abs()),
            lossy(x),
        ))
    }
}
