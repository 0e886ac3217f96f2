//! Interval subdivision driver.
//!
//! Splits an interval on a randomized grid and dispatches every
//! sign-changing cell to [`bisection`]. The driver is heuristic: it
//! reports the zeros it can bracket (plus whatever an optional open
//! solver recovers in sign-preserving cells) and makes no claim of
//! finding all of them.

use rand::Rng;

use crate::error::{SolverError, SolverResult};
use crate::scalar::Scalar;
use crate::solvers::{bisection, lossy, opposite_signs, Options};

/// Configuration for [`find_zeros`].
#[derive(Debug, Clone, Copy)]
pub struct ZerosConfig {
    /// Number of random interior sample points per pass.
    pub points: usize,
    /// Absolute tolerance for treating a sample as a zero.
    pub abs_tol: f64,
    /// Relative tolerance for treating a sample as a zero.
    pub rel_tol: f64,
    /// Cap on grid-refinement passes of the oscillation heuristic.
    pub max_passes: u32,
}

impl Default for ZerosConfig {
    fn default() -> Self {
        Self {
            points: 100,
            abs_tol: 10.0 * f64::EPSILON,
            rel_tol: 10.0 * f64::EPSILON,
            max_passes: 3,
        }
    }
}

impl ZerosConfig {
    /// Sets the number of interior sample points.
    #[must_use]
    pub fn with_points(mut self, points: usize) -> Self {
        self.points = points;
        self
    }

    /// Sets the absolute zero tolerance.
    #[must_use]
    pub fn with_abs_tol(mut self, abs_tol: f64) -> Self {
        self.abs_tol = abs_tol;
        self
    }

    /// Sets the relative zero tolerance.
    #[must_use]
    pub fn with_rel_tol(mut self, rel_tol: f64) -> Self {
        self.rel_tol = rel_tol;
        self
    }

    /// Caps the grid-refinement passes.
    #[must_use]
    pub fn with_max_passes(mut self, max_passes: u32) -> Self {
        self.max_passes = max_passes;
        self
    }
}

/// Open (non-bracketing) derivative-free solver consumed by
/// [`find_zeros_with`] for cells without a sign change.
pub trait OpenSolver<T: Scalar> {
    /// Refines `x0` toward a nearby zero of `f` within the given budget.
    ///
    /// # Errors
    ///
    /// Implementations report failure to converge however they see fit;
    /// the subdivision driver swallows every error.
    fn refine<F: FnMut(T) -> T>(
        &self,
        f: F,
        x0: T,
        max_fn_evals: u32,
        abs_tol: T,
        rel_tol: T,
    ) -> SolverResult<T>;
}

/// The no-op open solver: sign-preserving cells are skipped entirely.
impl<T: Scalar> OpenSolver<T> for () {
    fn refine<F: FnMut(T) -> T>(
        &self,
        _f: F,
        _x0: T,
        _max_fn_evals: u32,
        _abs_tol: T,
        _rel_tol: T,
    ) -> SolverResult<T> {
        Err(SolverError::invalid_input(
            "no open refinement solver configured",
        ))
    }
}

/// Finds zeros of `f` on `[a, b]` by randomized subdivision.
///
/// Equivalent to [`find_zeros_with`] with the no-op open solver: only
/// zeros that can be bracketed by a sign change (or sampled directly)
/// are reported.
///
/// # Errors
///
/// Returns an error when the interval is ill-formed (NaN or doubly
/// infinite endpoints).
///
/// # Example
///
/// ```rust
/// use rootspan::zeros::{find_zeros, ZerosConfig};
///
/// let roots = find_zeros(|x: f64| x.sin(), 0.0, 10.0, &ZerosConfig::default()).unwrap();
///
/// assert_eq!(roots.len(), 4); // 0, pi, 2*pi, 3*pi
/// ```
pub fn find_zeros<T, F>(f: F, a: T, b: T, config: &ZerosConfig) -> SolverResult<Vec<T>>
where
    T: Scalar,
    F: FnMut(T) -> T,
{
    find_zeros_with(f, a, b, config, &())
}

/// Finds zeros of `f` on `[a, b]`, handing sign-preserving cells to
/// `open`.
///
/// The interval is sampled at `config.points` uniformly random interior
/// points. Each adjacent pair of grid points becomes a cell: a cell
/// whose left sample already evaluates to (almost) zero is accepted
/// directly, a sign-changing cell is dispatched to [`bisection`], and
/// any other cell is offered to `open` with a small budget, swallowing
/// failures. When more than a quarter of the sample count comes back as
/// roots, the pass is discarded as grid resonance and repeated with ten
/// times as many points, up to `config.max_passes` passes.
///
/// Returns the accepted roots, sorted and deduplicated.
///
/// # Errors
///
/// Returns an error when the interval is ill-formed (NaN or doubly
/// infinite endpoints).
pub fn find_zeros_with<T, F, O>(
    mut f: F,
    a: T,
    b: T,
    config: &ZerosConfig,
    open: &O,
) -> SolverResult<Vec<T>>
where
    T: Scalar,
    F: FnMut(T) -> T,
    O: OpenSolver<T>,
{
    if a.is_nan() || b.is_nan() {
        return Err(SolverError::invalid_input("interval endpoint is NaN"));
    }
    let (mut lo, mut hi) = if a > b { (b, a) } else { (a, b) };
    if lo == T::neg_infinity() {
        lo = lo.next_up();
    }
    if hi == T::infinity() {
        hi = hi.next_down();
    }
    if lo.is_infinite() || hi.is_infinite() {
        return Err(SolverError::UnboundedBracket {
            a: lossy(a),
            b: lossy(b),
        });
    }

    let mut points = config.points.max(1);
    let mut pass = 0;
    loop {
        let roots = scan(&mut f, lo, hi, points, config, open)?;
        pass += 1;
        if roots.len().saturating_mul(4) <= points || pass >= config.max_passes {
            return Ok(roots);
        }
        // Implausibly many roots suggests resonance between the grid and
        // an oscillating function; discard and resample finer.
        points = points.saturating_mul(10);
    }
}

fn scan<T, F, O>(
    f: &mut F,
    lo: T,
    hi: T,
    points: usize,
    config: &ZerosConfig,
    open: &O,
) -> SolverResult<Vec<T>>
where
    T: Scalar,
    F: FnMut(T) -> T,
    O: OpenSolver<T>,
{
    let mut rng = rand::thread_rng();
    let mut offsets: Vec<f64> = (0..points).map(|_| rng.gen::<f64>()).collect();
    offsets.sort_by(f64::total_cmp);

    let span = hi - lo;
    let mut grid = Vec::with_capacity(points + 2);
    grid.push(lo);
    for offset in offsets {
        let x = lo + span * T::of(offset);
        if x > lo && x < hi {
            grid.push(x);
        }
    }
    grid.push(hi);

    let abs_tol = T::of(config.abs_tol);
    let rel_tol = T::of(config.rel_tol);
    let near_zero = |x: T, fx: T| fx.abs() <= abs_tol.max(rel_tol * x.abs());
    let solver_options = Options::default();

    let mut roots = Vec::new();
    let mut f_left = f(grid[0]);
    for i in 0..grid.len() - 1 {
        let (xl, xr) = (grid[i], grid[i + 1]);
        let f_right = f(xr);
        if near_zero(xl, f_left) {
            roots.push(xl);
        } else if opposite_signs(f_left, f_right) {
            if let Ok(solution) = bisection(&mut *f, xl, xr, &solver_options) {
                roots.push(solution.root);
            }
        } else {
            let x0 = xl + (xr - xl) / T::of(2.0);
            if let Ok(x) = open.refine(&mut *f, x0, 10, abs_tol, rel_tol) {
                if x > xl && x < xr {
                    roots.push(x);
                }
            }
        }
        f_left = f_right;
    }
    if near_zero(hi, f_left) {
        roots.push(hi);
    }

    roots.sort_by(|p, q| p.partial_cmp(q).unwrap_or(std::cmp::Ordering::Equal));
    roots.dedup_by(|p, q| (*p - *q).abs() <= abs_tol.max(rel_tol * (*p).abs()));
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_roots_on_zero_to_ten() {
        let f = |x: f64| x.sin();

        let roots = find_zeros(f, 0.0, 10.0, &ZerosConfig::default()).unwrap();

        let expected = [0.0, 1.0, 2.0, 3.0].map(|k| k * std::f64::consts::PI);
        assert_eq!(roots.len(), expected.len());
        for (root, want) in roots.iter().zip(expected) {
            assert!(
                (root - want).abs() <= 1e-12 * want.max(1.0),
                "got {root}, wanted {want}"
            );
        }
    }

    #[test]
    fn test_polynomial_roots() {
        let f = |x: f64| x * (x - 1.0) * (x - 2.0);

        let roots = find_zeros(f, -0.5, 2.5, &ZerosConfig::default()).unwrap();

        assert_eq!(roots.len(), 3);
        for (root, want) in roots.iter().zip([0.0, 1.0, 2.0]) {
            assert!((root - want).abs() < 1e-12);
        }
    }

    #[test]
    fn test_no_roots_gives_empty_list() {
        let f = |x: f64| x * x + 1.0;

        let roots = find_zeros(f, -5.0, 5.0, &ZerosConfig::default()).unwrap();

        assert!(roots.is_empty());
    }

    #[test]
    fn test_reversed_interval() {
        let f = |x: f64| x - 2.0;

        let roots = find_zeros(f, 5.0, 0.0, &ZerosConfig::default()).unwrap();

        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_endpoint_root_is_reported() {
        let f = |x: f64| x - 1.0;

        let roots = find_zeros(f, 0.0, 1.0, &ZerosConfig::default()).unwrap();

        assert_eq!(roots, vec![1.0]);
    }

    #[test]
    fn test_oscillating_function_triggers_refinement() {
        let f = |x: f64| (50.0 * x).sin();

        // Roots at k*pi/50: 160 of them in [0, 10], far more than a
        // quarter of the default sample count.
        let roots = find_zeros(f, 0.0, 10.0, &ZerosConfig::default()).unwrap();

        assert!(roots.len() > 120, "found {}", roots.len());
        assert!(roots.len() <= 161);
        for pair in roots.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_nan_endpoint_is_rejected() {
        let f = |x: f64| x;

        let result = find_zeros(f, f64::NAN, 1.0, &ZerosConfig::default());

        assert!(matches!(result, Err(SolverError::InvalidInput { .. })));
    }

    /// Plain secant iteration, the shape of open solver the driver
    /// consumes for sign-preserving cells.
    struct SecantRefiner;

    impl OpenSolver<f64> for SecantRefiner {
        fn refine<F: FnMut(f64) -> f64>(
            &self,
            mut f: F,
            x0: f64,
            max_fn_evals: u32,
            abs_tol: f64,
            _rel_tol: f64,
        ) -> SolverResult<f64> {
            let mut x_prev = x0;
            let mut x_curr = x0 + 1e-4;
            let mut f_prev = f(x_prev);
            let mut f_curr = f(x_curr);
            for _ in 2..max_fn_evals {
                if f_curr.abs() <= abs_tol {
                    return Ok(x_curr);
                }
                if (f_curr - f_prev).abs() < f64::MIN_POSITIVE {
                    break;
                }
                let x_next = x_curr - f_curr * (x_curr - x_prev) / (f_curr - f_prev);
                x_prev = x_curr;
                f_prev = f_curr;
                x_curr = x_next;
                f_curr = f(x_curr);
            }
            Err(SolverError::convergence_failed(
                max_fn_evals,
                f_curr.abs(),
                x_curr,
            ))
        }
    }

    #[test]
    fn test_open_solver_recovers_touching_root() {
        // |x - 1| never changes sign, so subdivision alone misses the
        // zero; the open solver recovers it.
        let f = |x: f64| (x - 1.0).abs();

        let without = find_zeros(f, 0.0, 2.0, &ZerosConfig::default()).unwrap();
        let with =
            find_zeros_with(f, 0.0, 2.0, &ZerosConfig::default(), &SecantRefiner).unwrap();

        assert!(without.is_empty());
        assert_eq!(with.len(), 1);
        assert!((with[0] - 1.0).abs() < 1e-10);
    }
}
