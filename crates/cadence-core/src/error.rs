//! Error types for the Cadence library.
//!
//! Every failure in Cadence is immediate and synchronous: values outside a
//! series' range are never errors, only type and input mistakes are.

use thiserror::Error;

/// A specialized Result type for Cadence operations.
pub type CadenceResult<T> = Result<T, CadenceError>;

/// The main error type for Cadence operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CadenceError {
    /// Arithmetic between operands that have no meaningful combination.
    #[error("Unsupported operand for `{op}`: {lhs} and {rhs}")]
    UnsupportedOperand {
        /// Operator symbol.
        op: &'static str,
        /// Left-hand operand type.
        lhs: String,
        /// Right-hand operand type.
        rhs: String,
    },

    /// Merge-addition between incompatible series kinds or a non-series value.
    #[error("Kind mismatch for `{op}`: cannot combine {lhs} with {rhs}")]
    KindMismatch {
        /// Operator symbol.
        op: &'static str,
        /// Left-hand operand type.
        lhs: String,
        /// Right-hand operand type.
        rhs: String,
    },

    /// Error in date construction or parsing.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {reason}")]
    ConfigError {
        /// Description of the configuration error.
        reason: String,
    },
}

impl CadenceError {
    /// Creates an unsupported operand error.
    #[must_use]
    pub fn unsupported_operand(
        op: &'static str,
        lhs: impl Into<String>,
        rhs: impl Into<String>,
    ) -> Self {
        Self::UnsupportedOperand {
            op,
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    /// Creates a kind mismatch error.
    #[must_use]
    pub fn kind_mismatch(op: &'static str, lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        Self::KindMismatch {
            op,
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config_error(reason: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
        }
    }
}
