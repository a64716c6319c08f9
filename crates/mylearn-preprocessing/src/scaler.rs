use mylearn_core::error::TensorResult;
use mylearn_core::estimator::check_x;
use mylearn_core::{Float, Tensor, TensorError};
use serde::{Deserialize, Serialize};

/// Standardize features by removing the mean and scaling to unit variance.
///
/// Uses the population standard deviation. Constant columns are centered
/// but left unscaled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct StandardScaler<T: Float> {
    mean: Option<Tensor<T>>,
    std: Option<Tensor<T>>,
}

impl<T: Float> StandardScaler<T> {
    pub fn new() -> Self {
        StandardScaler {
            mean: None,
            std: None,
        }
    }

    /// Compute per-feature mean and std from `[samples, features]` data.
    pub fn fit(&mut self, x: &Tensor<T>) -> TensorResult<&mut Self> {
        if x.ndim() != 2 {
            return Err(TensorError::InvalidOperation(
                "StandardScaler expects a 2D feature matrix".to_string(),
            ));
        }
        let mean = x.column_mean()?;
        let std = x.column_std()?;
        self.mean = Some(mean);
        self.std = Some(std);
        Ok(self)
    }

    pub fn transform(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        let (mean, std) = match (&self.mean, &self.std) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(TensorError::NotFitted),
        };
        let p = mean.numel();
        let n = check_x(x, p)?;

        let scale: Vec<T> = std
            .data()
            .iter()
            .map(|&s| if s.abs() < T::EPSILON { T::ONE } else { s })
            .collect();
        let mut out = Vec::with_capacity(n * p);
        for i in 0..n {
            let row = x.row_slice(i)?;
            for j in 0..p {
                out.push((row[j] - mean.data()[j]) / scale[j]);
            }
        }
        Tensor::new(out, vec![n, p])
    }

    pub fn fit_transform(&mut self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        self.fit(x)?.transform(x)
    }

    pub fn mean(&self) -> Option<&Tensor<T>> {
        self.mean.as_ref()
    }

    pub fn std(&self) -> Option<&Tensor<T>> {
        self.std.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_standard_scaler() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[
            vec![1.0, 2.0, 7.0],
            vec![3.0, 4.0, 7.0],
            vec![5.0, 9.0, 7.0],
        ]).unwrap();

        let mut scaler = StandardScaler::new();
        let z = scaler.fit_transform(&x).unwrap();

        let mean = z.column_mean().unwrap();
        let std = z.column_std().unwrap();
        for j in 0..2 {
            assert_abs_diff_eq!(mean.data()[j], 0.0, epsilon = 1e-10);
            assert_abs_diff_eq!(std.data()[j], 1.0, epsilon = 1e-10);
        }
        // constant column is only centered
        assert_eq!(z.col(2).unwrap().data(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_transform_uses_training_statistics() {
        let train: Tensor<f64> = Tensor::from_vec2d(&[vec![0.0], vec![2.0]]).unwrap();
        let mut scaler = StandardScaler::new();
        scaler.fit(&train).unwrap();
        let z = scaler.transform(&Tensor::from_vec2d(&[vec![3.0]]).unwrap()).unwrap();
        assert_abs_diff_eq!(z.data()[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_not_fitted_and_width() {
        let x: Tensor<f64> = Tensor::zeros(vec![2, 2]);
        let scaler: StandardScaler<f64> = StandardScaler::new();
        assert_eq!(scaler.transform(&x).unwrap_err(), TensorError::NotFitted);

        let mut scaler = StandardScaler::new();
        scaler.fit(&x).unwrap();
        assert!(scaler.transform(&Tensor::zeros(vec![2, 3])).is_err());
    }
}
