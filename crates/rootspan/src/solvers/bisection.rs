//! Bitwise bisection.

use crate::error::{SolverError, SolverResult};
use crate::scalar::Scalar;
use crate::solvers::{
    is_terminal, lossy, normalize, opposite_signs, toms748, Normalized, Options, Solution,
};

/// Bisection along the representable-value axis.
///
/// Instead of halving the real interval, each step halves the number of
/// representable values between the endpoints (see [`Scalar::middle`]),
/// so a `f64` bracket collapses to an adjacent pair in at most 64 steps
/// regardless of its width. A function value of `0`, `±inf`, or `NaN` at
/// the midpoint terminates the search there, which reports poles of
/// `1/g(x)` as well as roots.
///
/// Scalars without a bitwise midpoint are delegated to [`toms748`],
/// where the algebraic midpoint is meaningful.
///
/// Requires: `f(a)` and `f(b)` must not both be nonzero with the same
/// sign.
///
/// # Arguments
///
/// * `f` - The function for which to find a root
/// * `a` - One endpoint of the bracket
/// * `b` - The other endpoint of the bracket
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
/// use rootspan::solvers::{bisection, Options};
///
/// // Find root of x^2 - 2 (i.e., sqrt(2))
/// let f = |x: f64| x * x - 2.0;
///
/// let solution = bisection(f, 1.0, 2.0, &Options::default()).unwrap();
/// assert!((solution.root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
pub fn bisection<T, F>(mut f: F, a: T, b: T, options: &Options) -> SolverResult<Solution<T>>
where
    T: Scalar,
    F: FnMut(T) -> T,
{
    if !T::BITWISE_MIDPOINT {
        return toms748(f, a, b, options);
    }

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

    let use_width_tol = options.x_abs_tol > 0.0 || options.x_rel_tol > 0.0;
    let mut answer = state.best_estimate();

    while !state.converged && !state.stopped {
        let m = state.a.middle(state.b);

        // The bracket is adjacent at the bit level.
        if !(state.a < m && m < state.b) {
            answer = (m, if m == state.a { state.fa } else { state.fb });
            state.converged = true;
            break;
        }
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

        let fm = f(m);
        state.fn_evals += 1;
        state.steps += 1;
        if options.verbose {
            log::debug!(
                "bisection step {}: a = {}, b = {}, f({m}) = {fm}",
                state.steps,
                state.a,
                state.b,
            );
        }

        if is_terminal(fm) {
            answer = (m, fm);
            state.converged = true;
            break;
        }
        if opposite_signs(state.fa, fm) {
            state.b = m;
            state.fb = fm;
        } else {
            state.a = m;
            state.fa = fm;
        }

        if use_width_tol {
            let threshold = T::of(options.x_abs_tol).max(T::of(options.x_rel_tol) * m.abs());
            if state.width() <= threshold {
                answer = state.best_estimate();
                state.converged = true;
            }
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
                log::debug!("bisection stopped: {message}");
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
