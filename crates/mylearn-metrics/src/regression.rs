use mylearn_core::error::TensorResult;
use mylearn_core::{Float, Tensor};

use crate::paired_len;

fn sum_sq<I: Iterator<Item = f64>>(residuals: I) -> f64 {
    residuals.map(|r| r * r).sum()
}

fn residuals<'a, T: Float>(a: &'a Tensor<T>, b: &'a Tensor<T>) -> impl Iterator<Item = f64> + 'a {
    a.data().iter().zip(b.data()).map(|(&t, &p)| t.to_f64() - p.to_f64())
}

/// Mean of squared residuals.
pub fn mse<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>) -> TensorResult<f64> {
    let n = paired_len(y_true, y_pred)?;
    Ok(sum_sq(residuals(y_true, y_pred)) / n as f64)
}

pub fn rmse<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>) -> TensorResult<f64> {
    mse(y_true, y_pred).map(f64::sqrt)
}

/// Coefficient of determination, `1 - SS_res / SS_tot`.
///
/// A constant `y_true` has no variance to explain and scores `0`.
pub fn r2_score<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>) -> TensorResult<f64> {
    let n = paired_len(y_true, y_pred)?;
    let values = y_true.data().iter().map(|v| v.to_f64());
    let mean = values.clone().sum::<f64>() / n as f64;

    let ss_tot = sum_sq(values.map(|v| v - mean));
    if ss_tot < 1e-15 {
        return Ok(0.0);
    }
    Ok(1.0 - sum_sq(residuals(y_true, y_pred)) / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mse() {
        let y_true: Tensor<f64> = Tensor::from_slice(&[1.0, 2.0, 3.0]);
        let y_pred: Tensor<f64> = Tensor::from_slice(&[1.0, 2.0, 5.0]);
        assert_abs_diff_eq!(mse(&y_true, &y_pred).unwrap(), 4.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rmse(&y_true, &y_true).unwrap(), 0.0);
    }

    #[test]
    fn test_r2() {
        let y_true: Tensor<f64> = Tensor::from_slice(&[1.0, 2.0, 3.0, 4.0]);
        assert_abs_diff_eq!(r2_score(&y_true, &y_true).unwrap(), 1.0, epsilon = 1e-12);
        // predicting the mean explains nothing
        let mean = Tensor::from_slice(&[2.5; 4]);
        assert_abs_diff_eq!(r2_score(&y_true, &mean).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        let a: Tensor<f64> = Tensor::from_slice(&[1.0, 2.0]);
        let b: Tensor<f64> = Tensor::from_slice(&[1.0]);
        assert!(mse(&a, &b).is_err());
        assert!(r2_score(&a, &b).is_err());
    }
}
