pub mod classification;
pub mod regression;

pub use classification::{accuracy, confusion_matrix};
pub use regression::{mse, r2_score, rmse};

use mylearn_core::error::TensorResult;
use mylearn_core::{Float, Tensor, TensorError};

/// Check two label vectors line up and return their common length.
pub(crate) fn paired_len<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>) -> TensorResult<usize> {
    let n = y_true.numel();
    if n != y_pred.numel() {
        return Err(TensorError::DimensionMismatch(format!(
            "y_true has {} values, y_pred has {}",
            n,
            y_pred.numel()
        )));
    }
    if n == 0 {
        return Err(TensorError::EmptyTensor);
    }
    Ok(n)
}
