use thiserror::Error;

/// Failure of a tensor operation, an estimator fit or a prediction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TensorError {
    #[error("expected shape {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },

    #[error("index {index} is out of range for axis {axis} of length {size}")]
    IndexOutOfBounds { index: usize, axis: usize, size: usize },

    #[error("axis {axis} does not exist on a rank-{ndim} tensor")]
    InvalidAxis { axis: usize, ndim: usize },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("matrix is singular")]
    SingularMatrix,

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("no rows to work with")]
    EmptyTensor,

    #[error("estimator has not been fitted")]
    NotFitted,
}

pub type TensorResult<T> = Result<T, TensorError>;
