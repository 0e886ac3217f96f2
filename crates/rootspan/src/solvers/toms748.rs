//! Alefeld-Potra-Shi enclosing method (TOMS algorithm 748).

use crate::error::{SolverError, SolverResult};
use crate::scalar::Scalar;
use crate::solvers::{
    is_terminal, lossy, normalize, opposite_signs, tole, Normalized, Options, Solution,
};

/// Derivative-free enclosing method of Alefeld, Potra, and Shi.
///
/// Maintains a sign-opposing bracket plus a third point used for inverse
/// cubic interpolation and a fourth used to check that the interpolation
/// data is well separated. Each iteration performs two interpolation
/// refinements and a guarded double-length secant step; whenever those
/// fail to halve the bracket, a bisection step is forced. Worst-case
/// convergence is therefore bisection-speed while the typical rate is
/// superlinear.
///
/// Degenerate interpolation data is repaired locally by stepping down the
/// ladder cubic -> quadratic -> secant -> midpoint; it is never surfaced
/// as an error.
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
/// use rootspan::solvers::{toms748, Options};
///
/// let f = |x: f64| x * x * x - 1.0;
///
/// let solution = toms748(f, 0.0, 2.0, &Options::default()).unwrap();
/// assert!((solution.root - 1.0).abs() < 1e-12);
/// ```
pub fn toms748<T, F>(mut f: F, a: T, b: T, options: &Options) -> SolverResult<Solution<T>>
where
    T: Scalar,
    F: FnMut(T) -> T,
{
    options.validate()?;
    let state = match normalize(&mut f, a, b)? {
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

    let mut engine = Engine {
        f,
        tol: T::of(options.x_abs_tol),
        fn_evals: state.fn_evals,
    };
    engine.solve(state.a, state.fa, state.b, state.fb, options)
}

/// Outcome of one re-enclosure.
enum Step<T> {
    Narrowed { a: T, fa: T, b: T, fb: T, d: T, fd: T },
    Converged { x: T, fx: T },
}

struct Engine<T, F> {
    f: F,
    tol: T,
    fn_evals: u32,
}

impl<T, F> Engine<T, F>
where
    T: Scalar,
    F: FnMut(T) -> T,
{
    fn eval(&mut self, x: T) -> T {
        self.fn_evals += 1;
        (self.f)(x)
    }

    fn solution(&self, root: T, residual: T, iterations: u32) -> Solution<T> {
        Solution {
            root,
            residual,
            iterations,
            fn_evals: self.fn_evals,
        }
    }

    fn failure(&self, a: T, fa: T, b: T, fb: T, iterations: u32) -> SolverError {
        let (x, fx) = if fa.abs() < fb.abs() { (a, fa) } else { (b, fb) };
        SolverError::convergence_failed(iterations, lossy(fx.abs()), lossy(x))
    }

    /// Secant step, falling back to the midpoint when the candidate is
    /// ill-defined or indistinguishable from an endpoint.
    fn secant_step(&mut self, a: T, fa: T, b: T, fb: T) -> (T, T) {
        let mut c = a - fa * (b - a) / (fb - fa);
        let guard = T::of(5.0) * T::epsilon();
        if c.is_nan() || (c - a).abs() < guard * a.abs() || (c - b).abs() < guard * b.abs() {
            c = a + (b - a) / T::of(2.0);
        }
        let fc = self.eval(c);
        (c, fc)
    }

    /// `k` Newton iterations on the parabola through `(a, fa)`, `(b, fb)`,
    /// `(d, fd)`, falling back to the secant step.
    #[allow(clippy::many_single_char_names)]
    fn newton_quadratic(&mut self, a: T, fa: T, b: T, fb: T, d: T, fd: T, k: u32) -> (T, T) {
        let slope = (fb - fa) / (b - a);
        let curve = ((fd - fb) / (d - b) - slope) / (d - a);
        if curve == T::zero() || !curve.is_finite() {
            return self.secant_step(a, fa, b, fb);
        }
        let mut r = if curve * fa > T::zero() { a } else { b };
        for _ in 0..k {
            let p = fa + (slope + curve * (r - b)) * (r - a);
            let dp = slope + curve * (T::of(2.0) * r - a - b);
            r = r - p / dp;
        }
        if !(a < r && r < b) {
            return self.secant_step(a, fa, b, fb);
        }
        let fr = self.eval(r);
        (r, fr)
    }

    /// Inverse cubic interpolation through four points, falling back to
    /// the quadratic step when the candidate leaves the bracket.
    #[allow(clippy::too_many_arguments, clippy::many_single_char_names)]
    fn ipzero(&mut self, a: T, fa: T, b: T, fb: T, c: T, fc: T, d: T, fd: T) -> (T, T) {
        let q11 = (c - d) * fc / (fd - fc);
        let q21 = (b - c) * fb / (fc - fb);
        let q31 = (a - b) * fa / (fb - fa);
        let d21 = (b - c) * fc / (fc - fb);
        let d31 = (a - b) * fb / (fb - fa);
        let q22 = (d21 - q11) * fb / (fd - fb);
        let q32 = (d31 - q21) * fa / (fc - fa);
        let d32 = (d31 - q21) * fc / (fc - fa);
        let q33 = (d32 - q22) * fa / (fd - fa);
        let r = a + (q31 + q32 + q33);
        if !(a < r && r < b) {
            return self.newton_quadratic(a, fa, b, fb, c, fc, 3);
        }
        let fr = self.eval(r);
        (r, fr)
    }

    /// Moves the candidate into the safe zone, re-encloses the root, and
    /// signals convergence when the bracket is tight enough.
    #[allow(clippy::many_single_char_names)]
    fn rebracket(&mut self, a: T, fa: T, b: T, fb: T, c0: T, fc0: T) -> Step<T> {
        let two = T::of(2.0);
        let delta = T::of(0.7) * tole(a, b, fa, fb, self.tol);
        let mut c = c0;
        let mut fc = fc0;
        if b - a <= T::of(4.0) * delta {
            c = a + (b - a) / two;
        } else if c <= a + two * delta {
            c = a + two * delta;
        } else if c >= b - two * delta {
            c = b - two * delta;
        }
        if c != c0 {
            fc = self.eval(c);
        }
        if is_terminal(fc) {
            return Step::Converged { x: c, fx: fc };
        }

        let (a1, fa1, b1, fb1, d1, fd1) = if opposite_signs(fa, fc) {
            (a, fa, c, fc, b, fb)
        } else {
            (c, fc, b, fb, a, fa)
        };
        if b1 - a1 < two * tole(a1, b1, fa1, fb1, self.tol) {
            let (x, fx) = if fa1.abs() < fb1.abs() {
                (a1, fa1)
            } else {
                (b1, fb1)
            };
            return Step::Converged { x, fx };
        }
        Step::Narrowed {
            a: a1,
            fa: fa1,
            b: b1,
            fb: fb1,
            d: d1,
            fd: fd1,
        }
    }

    #[allow(clippy::too_many_lines)]
    fn solve(&mut self, a0: T, fa0: T, b0: T, fb0: T, options: &Options) -> SolverResult<Solution<T>> {
        let (c, fc) = self.secant_step(a0, fa0, b0, fb0);
        let (mut a, mut fa, mut b, mut fb, mut d, mut fd) =
            match self.rebracket(a0, fa0, b0, fb0, c, fc) {
                Step::Converged { x, fx } => return Ok(self.solution(x, fx, 1)),
                Step::Narrowed { a, fa, b, fb, d, fd } => (a, fa, b, fb, d, fd),
            };
        let (mut e, mut fe) = (d, fd);

        for n in 2..=options.max_iters {
            if options.max_fn_evals.is_some_and(|cap| self.fn_evals >= cap) {
                return Err(self.failure(a, fa, b, fb, n));
            }
            let width0 = b - a;

            // Speculative high-order step: inverse cubic when the four
            // function values are pairwise separated, else quadratic.
            let (c1, fc1) = if n > 2 && all_distinct(fa, fb, fd, fe) {
                self.ipzero(a, fa, b, fb, d, fd, e, fe)
            } else {
                self.newton_quadratic(a, fa, b, fb, d, fd, 2)
            };
            let (a1, fa1, b1, fb1, d1, fd1) = match self.rebracket(a, fa, b, fb, c1, fc1) {
                Step::Converged { x, fx } => return Ok(self.solution(x, fx, n)),
                Step::Narrowed { a, fa, b, fb, d, fd } => (a, fa, b, fb, d, fd),
            };
            let (e1, fe1) = (d, fd);

            let (c2, fc2) = if all_distinct(fa1, fb1, fd1, fe1) {
                self.ipzero(a1, fa1, b1, fb1, d1, fd1, e1, fe1)
            } else {
                self.newton_quadratic(a1, fa1, b1, fb1, d1, fd1, 3)
            };
            let (a2, fa2, b2, fb2, d2, fd2) = match self.rebracket(a1, fa1, b1, fb1, c2, fc2) {
                Step::Converged { x, fx } => return Ok(self.solution(x, fx, n)),
                Step::Narrowed { a, fa, b, fb, d, fd } => (a, fa, b, fb, d, fd),
            };

            // Double-length secant step from the endpoint with the
            // smaller residual, clipped to half the bracket.
            let (u, fu) = if fa2.abs() < fb2.abs() {
                (a2, fa2)
            } else {
                (b2, fb2)
            };
            let mut c3 = u - T::of(2.0) * fu * (b2 - a2) / (fb2 - fa2);
            if (c3 - u).abs() > (b2 - a2) / T::of(2.0) {
                c3 = a2 + (b2 - a2) / T::of(2.0);
            }
            let fc3 = self.eval(c3);
            let (a3, fa3, b3, fb3, d3, fd3) = match self.rebracket(a2, fa2, b2, fb2, c3, fc3) {
                Step::Converged { x, fx } => return Ok(self.solution(x, fx, n)),
                Step::Narrowed { a, fa, b, fb, d, fd } => (a, fa, b, fb, d, fd),
            };

            if b3 - a3 < width0 / T::of(2.0) {
                a = a3;
                fa = fa3;
                b = b3;
                fb = fb3;
                d = d3;
                fd = fd3;
                e = d2;
                fe = fd2;
            } else {
                // The interpolation phases failed to halve the bracket;
                // force a bisection step.
                e = d3;
                fe = fd3;
                let m = a3 + (b3 - a3) / T::of(2.0);
                let fm = self.eval(m);
                match self.rebracket(a3, fa3, b3, fb3, m, fm) {
                    Step::Converged { x, fx } => return Ok(self.solution(x, fx, n)),
                    Step::Narrowed {
                        a: an,
                        fa: fan,
                        b: bn,
                        fb: fbn,
                        d: dn,
                        fd: fdn,
                    } => {
                        a = an;
                        fa = fan;
                        b = bn;
                        fb = fbn;
                        d = dn;
                        fd = fdn;
                    }
                }
            }

            if options.verbose {
                log::debug!("toms748 iteration {n}: a = {a}, b = {b}, f(a) = {fa}");
            }

            // The last candidate sits within one representable step of
            // zero.
            if c3.next_up() * c3.next_down() <= T::zero() {
                return Ok(self.solution(c3, fc3, n));
            }
            // The bracket is adjacent at the bit level.
            if a.next_up() >= b {
                return Ok(self.solution(a, fa, n));
            }
        }

        Err(self.failure(a, fa, b, fb, options.max_iters))
    }
}

/// True when all four function values are pairwise separated enough for
/// the inverse cubic formula to be well conditioned.
fn all_distinct<T: Scalar>(fa: T, fb: T, fd: T, fe: T) -> bool {
    let eta = T::of(32.0) * T::min_positive_value();
    (fa - fb).abs() > eta
        && (fa - fd).abs() > eta
        && (fa - fe).abs() > eta
        && (fb - fd).abs() > eta
        && (fb - fe).abs() > eta
        && (fd - fe).abs() > eta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::bisection;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_exponential_minus_cosine() {
        let f = |x: f64| x.exp() - x.cos();

        let solution = toms748(f, -1.0, 1.0, &Options::default()).unwrap();

        assert!(solution.root.abs() < 1e-12);
    }

    #[test]
    fn test_sin_near_pi() {
        let f = |x: f64| x.sin();

        let solution = toms748(f, 3.0, 4.0, &Options::default()).unwrap();

        assert_relative_eq!(solution.root, std::f64::consts::PI, epsilon = 1e-13);
    }

    #[test]
    fn test_cubic() {
        let f = |x: f64| x * x * x - 1.0;

        let solution = toms748(f, 0.0, 2.0, &Options::default()).unwrap();

        assert_relative_eq!(solution.root, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fewer_evaluations_than_bisection() {
        let f = |x: f64| x.powi(5) - x - 1.0;

        let interpolated = toms748(f, -2.0, 2.0, &Options::default()).unwrap();
        let halved = bisection(f, -2.0, 2.0, &Options::default()).unwrap();

        assert_relative_eq!(interpolated.root, halved.root, max_relative = 1e-12);
        assert!(interpolated.fn_evals < halved.fn_evals);
        assert!(interpolated.fn_evals <= 50);
    }

    #[test]
    fn test_pole_reported_as_root() {
        let f = |x: f64| 1.0 / (x - 0.5);

        let solution = toms748(f, 0.0, 1.0, &Options::default()).unwrap();

        assert_eq!(solution.root, 0.5);
    }

    #[test]
    fn test_invalid_bracket() {
        let f = |x: f64| x * x + 1.0;

        let result = toms748(f, -1.0, 1.0, &Options::default());

        assert!(matches!(result, Err(SolverError::InvalidBracket { .. })));
    }

    #[test]
    fn test_iteration_cap_reports_failure() {
        let f = |x: f64| x.powi(5) - x - 1.0;
        let options = Options::default().with_max_iters(2);

        let result = toms748(f, -2.0, 2.0, &options);

        assert!(matches!(
            result,
            Err(SolverError::ConvergenceFailed { iterations: 2, .. })
        ));
    }

    #[test]
    fn test_flat_tail_falls_back_gracefully() {
        // Nearly-equal function values on one side force the quadratic
        // and secant fallbacks without losing the root.
        let f = |x: f64| if x < 1.0 { (x - 1.0) * 1e-30 } else { (x - 1.0).powi(3) };

        let solution = toms748(f, 0.0, 3.0, &Options::default()).unwrap();

        assert!((solution.root - 1.0).abs() < 1e-7);
    }

    proptest! {
        #[test]
        fn converges_on_monotone_cubics(r in -50.0_f64..50.0) {
            let f = |x: f64| (x - r) + (x - r).powi(3);

            let solution = toms748(f, r - 3.0, r + 5.0, &Options::default()).unwrap();

            prop_assert!((solution.root - r).abs() <= 1e-9 * (1.0 + r.abs()));
        }
    }
}
