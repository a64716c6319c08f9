use crate::dtype::Float;
use crate::error::{TensorError, TensorResult};
use crate::tensor::Tensor;

/// Supervised estimator over a `[samples, features]` matrix and a label vector.
///
/// `fit` hands back the fitted estimator so calls can be chained:
/// `model.fit(&x, &y)?.predict(&x_test)`.
pub trait Estimator<T: Float> {
    fn fit(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<&mut Self>
    where
        Self: Sized;

    fn predict(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>>;
}

/// Validate the shared `(x, y)` training contract and return `(rows, features)`.
///
/// `x` must be 2-D with at least one row, `y` must hold exactly one label per row.
pub fn check_xy<T: Float>(x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<(usize, usize)> {
    if x.ndim() != 2 {
        return Err(TensorError::InvalidOperation(format!(
            "expected a 2D feature matrix, got {} dimensions",
            x.ndim()
        )));
    }
    let n = x.shape().dim(0)?;
    let p = x.shape().dim(1)?;
    if n == 0 {
        return Err(TensorError::EmptyTensor);
    }
    if y.numel() != n {
        return Err(TensorError::DimensionMismatch(format!(
            "X has {} rows but y has {} labels",
            n,
            y.numel()
        )));
    }
    Ok((n, p))
}

/// Validate a prediction matrix against the fitted feature width.
pub fn check_x<T: Float>(x: &Tensor<T>, n_features: usize) -> TensorResult<usize> {
    if x.ndim() != 2 {
        return Err(TensorError::InvalidOperation(format!(
            "expected a 2D feature matrix, got {} dimensions",
            x.ndim()
        )));
    }
    let p = x.shape().dim(1)?;
    if p != n_features {
        return Err(TensorError::DimensionMismatch(format!(
            "model was fitted on {} features, got {}",
            n_features, p
        )));
    }
    x.shape().dim(0)
}

/// Largest number of distinct classes a classifier will allocate for.
pub const MAX_CLASSES: usize = 1 << 16;

/// Read a label as a class id in `0..MAX_CLASSES`.
pub fn class_id<T: Float>(label: T) -> TensorResult<usize> {
    let v = label.to_f64();
    if v.is_nan() || v < 0.0 || v.fract() != 0.0 {
        return Err(TensorError::InvalidOperation(format!(
            "class labels must be non-negative integers, got {}",
            label
        )));
    }
    if v >= MAX_CLASSES as f64 {
        return Err(TensorError::InvalidOperation(format!(
            "class label {} exceeds the limit of {} classes",
            label, MAX_CLASSES
        )));
    }
    Ok(v as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_xy() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let y: Tensor<f64> = Tensor::from_slice(&[0.0, 1.0]);
        assert_eq!(check_xy(&x, &y).unwrap(), (2, 2));

        let short: Tensor<f64> = Tensor::from_slice(&[0.0]);
        assert!(matches!(check_xy(&x, &short), Err(TensorError::DimensionMismatch(_))));

        let empty: Tensor<f64> = Tensor::zeros(vec![0, 2]);
        let no_labels: Tensor<f64> = Tensor::zeros(vec![0]);
        assert_eq!(check_xy(&empty, &no_labels), Err(TensorError::EmptyTensor));
    }

    #[test]
    fn test_check_x_width() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[vec![1.0, 2.0, 3.0]]).unwrap();
        assert_eq!(check_x(&x, 3).unwrap(), 1);
        assert!(check_x(&x, 2).is_err());
    }

    #[test]
    fn test_class_id_bounds() {
        assert_eq!(class_id(3.0f64).unwrap(), 3);
        assert_eq!(class_id((MAX_CLASSES - 1) as f64).unwrap(), MAX_CLASSES - 1);
        for bad in [-1.0, 0.5, f64::NAN, f64::INFINITY, MAX_CLASSES as f64, 1e12, 1e300] {
            assert!(matches!(class_id(bad), Err(TensorError::InvalidOperation(_))), "{}", bad);
        }
    }
}
