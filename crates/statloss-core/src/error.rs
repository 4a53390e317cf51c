//! Error taxonomy for the loss operations.
//!
//! Preconditions are checked at call entry; nothing is partially computed
//! when one of these is returned. Numerical trouble (zero bin mass,
//! overflowing exponentials) is handled by clamping, not by errors.

use thiserror::Error;

/// Errors raised by statloss operations.
#[derive(Debug, Error)]
pub enum LossError {
    /// A required operand kind is missing (e.g. no tensor among the KL arguments).
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// Operands that must share (or broadcast to) one shape do not.
    #[error("shape mismatch in {context}: {shapes:?}")]
    ShapeMismatch {
        context: &'static str,
        shapes: Vec<Vec<usize>>,
    },

    /// Two sample batches disagree in their flattened feature dimension.
    #[error("sample dimension mismatch: X has dim {x}, Y has dim {y}")]
    DimensionMismatch { x: usize, y: usize },

    /// An argument is outside its valid domain.
    #[error("invalid argument '{arg}': {reason}")]
    InvalidArgument { arg: &'static str, reason: String },

    /// A configuration file or value could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LossError>;

impl LossError {
    pub fn invalid(arg: &'static str, reason: impl Into<String>) -> Self {
        LossError::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }
}
