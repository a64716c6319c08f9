use mylearn_core::error::TensorResult;
use mylearn_core::{Float, Tensor};

use crate::paired_len;

/// Fraction of predictions within 0.5 of the true class id.
pub fn accuracy<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>) -> TensorResult<f64> {
    let n = paired_len(y_true, y_pred)?;
    let correct = y_true
        .data()
        .iter()
        .zip(y_pred.data())
        .filter(|(&a, &b)| (a - b).abs() < T::HALF)
        .count();
    Ok(correct as f64 / n as f64)
}

/// `matrix[true][predicted]` counts over class ids `0..n_classes`.
/// Labels outside that range are skipped.
pub fn confusion_matrix<T: Float>(
    y_true: &Tensor<T>,
    y_pred: &Tensor<T>,
    n_classes: usize,
) -> TensorResult<Vec<Vec<usize>>> {
    paired_len(y_true, y_pred)?;
    let mut matrix = vec![vec![0usize; n_classes]; n_classes];
    for (&t, &p) in y_true.data().iter().zip(y_pred.data()) {
        let (t, p) = (t.to_f64().round(), p.to_f64().round());
        if t < 0.0 || p < 0.0 {
            continue;
        }
        let (ti, pi) = (t as usize, p as usize);
        if ti < n_classes && pi < n_classes {
            matrix[ti][pi] += 1;
        }
    }
    Ok(matrix)
}
