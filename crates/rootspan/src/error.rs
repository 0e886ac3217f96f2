//! Error types for the bracketing solvers.

use thiserror::Error;

/// A specialized Result type for solver operations.
pub type SolverResult<T> = Result<T, SolverError>;

/// Errors that can occur while locating a root.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The input interval does not bracket a sign change.
    #[error("Invalid bracket: f({a}) = {fa:.2e} and f({b}) = {fb:.2e} have same sign")]
    InvalidBracket {
        /// Lower bound of the bracket.
        a: f64,
        /// Upper bound of the bracket.
        b: f64,
        /// Function value at a.
        fa: f64,
        /// Function value at b.
        fb: f64,
    },

    /// Both endpoints remain infinite after being pulled one step inward.
    #[error("Unbounded bracket: [{a}, {b}] has no finite endpoint")]
    UnboundedBracket {
        /// Lower bound as supplied.
        a: f64,
        /// Upper bound as supplied.
        b: f64,
    },

    /// A tolerance was negative.
    #[error("Invalid tolerance: {value:.2e} is negative")]
    InvalidTolerance {
        /// The offending tolerance.
        value: f64,
    },

    /// The iteration or function-evaluation cap was hit without convergence.
    #[error(
        "Convergence failed after {iterations} iterations \
         (residual {residual:.2e} at x = {estimate})"
    )]
    ConvergenceFailed {
        /// Number of iterations attempted.
        iterations: u32,
        /// Residual at the best estimate.
        residual: f64,
        /// Best estimate when iteration stopped.
        estimate: f64,
    },

    /// Invalid input parameter.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl SolverError {
    /// Creates a convergence failed error.
    #[must_use]
    pub fn convergence_failed(iterations: u32, residual: f64, estimate: f64) -> Self {
        Self::ConvergenceFailed {
            iterations,
            residual,
            estimate,
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SolverError::convergence_failed(100, 1e-6, 1.5);
        assert!(err.to_string().contains("100 iterations"));
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_invalid_bracket_display() {
        let err = SolverError::InvalidBracket {
            a: 1.0,
            b: 2.0,
            fa: 3.0,
            fb: 4.0,
        };
        assert!(err.to_string().contains("same sign"));
    }
}
