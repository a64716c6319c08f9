use crate::error::{TensorError, TensorResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extent of each axis of a [`Tensor`](crate::Tensor), outermost first.
///
/// A feature matrix is `[samples, features]`, a label or weight vector is
/// `[len]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    pub fn dim(&self, axis: usize) -> TensorResult<usize> {
        match self.dims.get(axis) {
            Some(&d) => Ok(d),
            None => Err(TensorError::InvalidAxis {
                axis,
                ndim: self.dims.len(),
            }),
        }
    }

    /// Element count; a rank-0 shape holds one element.
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    /// Elements spanned by one step along axis 0.
    pub fn row_width(&self) -> usize {
        self.dims.iter().skip(1).product()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.dims.clone()
    }

    /// `[rows, cols]` of a matrix shape.
    pub fn matrix(&self) -> TensorResult<(usize, usize)> {
        match self.dims[..] {
            [rows, cols] => Ok((rows, cols)),
            _ => Err(TensorError::InvalidOperation(format!(
                "expected a matrix, got shape {}",
                self
            ))),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.dims.iter().map(|d| d.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}
