use log::{debug, warn};
use mylearn_core::error::TensorResult;
use mylearn_core::estimator::check_xy;
use mylearn_core::{Estimator, Float, Tensor, TensorError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::regression::{linear_predict, split_weights, with_intercept_column, LinearModel};

/// Regularization term added to the squared loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Penalty {
    L2,
}

/// Linear regression trained by per-sample stochastic gradient descent on the
/// squared loss.
///
/// Each epoch visits every row once, in input order unless `shuffle` is set.
/// With [`Penalty::L2`] every coefficient except the intercept also decays by
/// `alpha * w / n_samples` per step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct SGDRegressor<T: Float> {
    pub fit_intercept: bool,
    pub max_iter: usize,
    pub learning_rate: T,
    pub penalty: Option<Penalty>,
    pub alpha: T,
    pub shuffle: bool,
    pub seed: Option<u64>,
    weights: Option<Tensor<T>>,
    bias: Option<T>,
}

impl<T: Float> SGDRegressor<T> {
    pub fn new(fit_intercept: bool, max_iter: usize, learning_rate: T) -> Self {
        SGDRegressor {
            fit_intercept,
            max_iter,
            learning_rate,
            penalty: None,
            alpha: T::ZERO,
            shuffle: false,
            seed: None,
            weights: None,
            bias: None,
        }
    }

    pub fn set_penalty(mut self, penalty: Option<Penalty>, alpha: T) -> Self {
        self.penalty = penalty;
        self.alpha = alpha;
        self
    }

    pub fn set_shuffle(mut self, shuffle: bool, seed: Option<u64>) -> Self {
        self.shuffle = shuffle;
        self.seed = seed;
        self
    }

    pub fn fit(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<&mut Self> {
        let (n, _) = check_xy(x, y)?;

        let x_aug = if self.fit_intercept {
            with_intercept_column(x)?
        } else {
            x.clone()
        };
        let dim = x_aug.shape().dim(1)?;
        let first_penalized = usize::from(self.fit_intercept);
        let decay = match self.penalty {
            Some(Penalty::L2) => self.alpha / T::from_usize(n),
            None => T::ZERO,
        };

        let mut w = vec![T::ZERO; dim];
        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let report_every = (self.max_iter / 10).max(1);

        for epoch in 0..self.max_iter {
            if self.shuffle {
                order.shuffle(&mut rng);
            }
            let mut sq_err = T::ZERO;
            for &j in &order {
                let row = x_aug.row_slice(j)?;
                let pred: T = row.iter().zip(&w).map(|(&a, &b)| a * b).sum();
                let error = pred - y.data()[j];
                sq_err += error * error;
                for k in 0..dim {
                    let mut grad = error * row[k];
                    if k >= first_penalized {
                        grad += decay * w[k];
                    }
                    w[k] -= self.learning_rate * grad;
                }
            }

            if w.iter().any(|v| !v.is_finite()) {
                warn!(
                    "SGD diverged at epoch {}; try a smaller learning_rate or standardized features",
                    epoch
                );
                return Err(TensorError::InvalidOperation(
                    "SGD produced non-finite weights".into(),
                ));
            }
            if epoch % report_every == 0 {
                debug!("SGD epoch {}: mse={}", epoch, sq_err / T::from_usize(n));
            }
        }

        let (coef, bias) = split_weights(&w, self.fit_intercept)?;
        self.weights = Some(coef);
        self.bias = bias;
        Ok(self)
    }

    pub fn predict(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        let w = self.weights.as_ref().ok_or(TensorError::NotFitted)?;
        linear_predict(x, w, self.bias)
    }
}

impl<T: Float> Default for SGDRegressor<T> {
    fn default() -> Self {
        Self::new(true, 1000, T::from_f64(0.001))
    }
}

impl<T: Float> LinearModel<T> for SGDRegressor<T> {
    fn intercept(&self) -> TensorResult<T> {
        if self.weights.is_none() {
            return Err(TensorError::NotFitted);
        }
        Ok(self.bias.unwrap_or(T::ZERO))
    }

    fn coef(&self) -> TensorResult<&Tensor<T>> {
        self.weights.as_ref().ok_or(TensorError::NotFitted)
    }
}

impl<T: Float> Estimator<T> for SGDRegressor<T> {
    fn fit(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<&mut Self> {
        SGDRegressor::fit(self, x, y)
    }

    fn predict(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        SGDRegressor::predict(self, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn line() -> (Tensor<f64>, Tensor<f64>) {
        // y = 3x - 1 on a standardized-ish grid
        let xs = [-1.0, -0.5, 0.0, 0.5, 1.0];
        let x = Tensor::new(xs.to_vec(), vec![5, 1]).unwrap();
        let y = Tensor::from_slice(&xs.map(|v| 3.0 * v - 1.0));
        (x, y)
    }

    #[test]
    fn test_sgd_converges() {
        let (x, y) = line();
        let mut model = SGDRegressor::new(true, 2000, 0.05);
        model.fit(&x, &y).unwrap();
        assert_abs_diff_eq!(model.intercept().unwrap(), -1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(model.coef().unwrap().data()[0], 3.0, epsilon = 1e-3);
    }

    #[test]
    fn test_l2_shrinks_coefficients() {
        let (x, y) = line();
        let mut plain = SGDRegressor::new(true, 2000, 0.05);
        plain.fit(&x, &y).unwrap();
        let mut penalized = SGDRegressor::new(true, 2000, 0.05).set_penalty(Some(Penalty::L2), 5.0);
        penalized.fit(&x, &y).unwrap();

        let w_plain = plain.coef().unwrap().data()[0];
        let w_pen = penalized.coef().unwrap().data()[0];
        assert!(w_pen.abs() < w_plain.abs(), "{} !< {}", w_pen, w_plain);
    }

    #[test]
    fn test_refit_restarts_from_zero() {
        let (x, y) = line();
        let mut model = SGDRegressor::new(true, 5, 0.01);
        model.fit(&x, &y).unwrap();
        let first = model.coef().unwrap().clone();
        model.fit(&x, &y).unwrap();
        assert_eq!(model.coef().unwrap(), &first);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let (x, y) = line();
        let mut a = SGDRegressor::new(true, 20, 0.01).set_shuffle(true, Some(7));
        let mut b = SGDRegressor::new(true, 20, 0.01).set_shuffle(true, Some(7));
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.coef().unwrap(), b.coef().unwrap());
        assert_eq!(a.intercept().unwrap(), b.intercept().unwrap());
    }

    #[test]
    fn test_divergence_is_an_error() {
        let x: Tensor<f64> = Tensor::new(vec![1e3, 2e3, 3e3], vec![3, 1]).unwrap();
        let y: Tensor<f64> = Tensor::from_slice(&[1.0, 2.0, 3.0]);
        let mut model = SGDRegressor::new(true, 1000, 1.0);
        assert!(model.fit(&x, &y).is_err());
        assert_eq!(model.coef().unwrap_err(), TensorError::NotFitted);
    }
}
