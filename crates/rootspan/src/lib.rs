//! # Rootspan
//!
//! Bracketed root-finding for real scalar functions of one variable.
//!
//! Given `f` and an interval `[a, b]` with `f(a)` and `f(b)` on opposite
//! sides of zero, the solvers locate a point where `f` vanishes, or the
//! tightest representable bracket around one. This crate provides:
//!
//! - **Solvers**: bitwise bisection, the Alefeld-Potra-Shi enclosing
//!   method (TOMS 748), and regula falsi with the Galdino reduction
//!   family
//! - **Subdivision**: a randomized driver that splits an interval and
//!   collects every zero it can bracket
//! - **Scalar abstraction**: binary floats use a bit-level midpoint with
//!   a guaranteed step bound; other representations fall back to the
//!   algebraic midpoint
//!
//! ## Design Philosophy
//!
//! - **Enclosure first**: every accepted step keeps a sign change inside
//!   the bracket, so progress is never lost to a bad interpolation
//! - **Frugal with evaluations**: the function is treated as expensive;
//!   no probe point is evaluated twice
//! - **Poles are answers**: a value of `0`, `±inf`, or `NaN` at a probe
//!   terminates the search there instead of raising an error
//!
//! ## Example
//!
//! ```rust
//! use rootspan::prelude::*;
//!
//! let f = |x: f64| x.exp() - x.cos();
//!
//! let solution = find_zero(f, -1.0, 1.0, Method::Toms748, &Options::default()).unwrap();
//! assert!(solution.root.abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod scalar;
pub mod solvers;
pub mod zeros;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{SolverError, SolverResult};
    pub use crate::scalar::Scalar;
    pub use crate::solvers::{
        bisection, false_position, find_zero, toms748, Method, Options, Reduction, Solution,
    };
    pub use crate::zeros::{find_zeros, find_zeros_with, OpenSolver, ZerosConfig};
}

pub use error::{SolverError, SolverResult};
pub use solvers::{find_zero, Method, Options, Solution};
pub use zeros::find_zeros;
