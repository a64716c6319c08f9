use mylearn_core::error::TensorResult;
use mylearn_core::estimator::{check_x, check_xy};
use mylearn_core::{Estimator, Float, Tensor, TensorError};
use mylearn_linalg::{inv, solve};
use serde::{Deserialize, Serialize};

/// Fitted parameters of a linear model, exposed as typed accessors.
pub trait LinearModel<T: Float> {
    /// Intercept term; `0` when the model was fitted without one.
    fn intercept(&self) -> TensorResult<T>;

    /// Per-feature coefficients, in feature order.
    fn coef(&self) -> TensorResult<&Tensor<T>>;
}

/// Prepend a column of ones to `x`.
pub(crate) fn with_intercept_column<T: Float>(x: &Tensor<T>) -> TensorResult<Tensor<T>> {
    let n = x.shape().dim(0)?;
    let ones_col = Tensor::ones(vec![n, 1]);
    Tensor::hstack(&[&ones_col, x])
}

/// `(XᵀX, Xᵀy)` for the design matrix, with the bias column first when
/// `fit_intercept`.
fn gram_system<T: Float>(
    x: &Tensor<T>,
    y: &Tensor<T>,
    fit_intercept: bool,
) -> TensorResult<(Tensor<T>, Tensor<T>)> {
    let (n, _) = check_xy(x, y)?;
    let design = if fit_intercept {
        with_intercept_column(x)?
    } else {
        x.clone()
    };
    let dt = design.t()?;
    Ok((dt.matmul(&design)?, dt.matmul(&y.reshape(vec![n, 1])?)?))
}

/// Split a solved weight vector into `(coef, intercept)`.
pub(crate) fn split_weights<T: Float>(
    w: &[T],
    fit_intercept: bool,
) -> TensorResult<(Tensor<T>, Option<T>)> {
    if fit_intercept {
        let p = w.len() - 1;
        Ok((Tensor::new(w[1..].to_vec(), vec![p])?, Some(w[0])))
    } else {
        Ok((Tensor::from_slice(w), None))
    }
}

/// `X · coef + intercept`, flattened to `[n]`.
pub(crate) fn linear_predict<T: Float>(
    x: &Tensor<T>,
    coef: &Tensor<T>,
    bias: Option<T>,
) -> TensorResult<Tensor<T>> {
    let p = coef.numel();
    let n = check_x(x, p)?;
    let mut pred = x.matmul(&coef.reshape(vec![p, 1])?)?;
    if let Some(b) = bias {
        pred = pred.map(|v| v + b);
    }
    pred.reshape(vec![n])
}

/// Least-squares fit of `y ≈ X·coef + intercept`, solved in closed form
/// through `(XᵀX)⁻¹ Xᵀy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct LinearRegression<T: Float> {
    pub fit_intercept: bool,
    weights: Option<Tensor<T>>,
    bias: Option<T>,
}

impl<T: Float> LinearRegression<T> {
    pub fn new(fit_intercept: bool) -> Self {
        LinearRegression {
            fit_intercept,
            weights: None,
            bias: None,
        }
    }

    pub fn fit(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<&mut Self> {
        let (xtx, xty) = gram_system(x, y, self.fit_intercept)?;
        let w = inv(&xtx)?.matmul(&xty)?;

        let (coef, bias) = split_weights(w.data(), self.fit_intercept)?;
        self.weights = Some(coef);
        self.bias = bias;
        Ok(self)
    }

    pub fn predict(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        let w = self.weights.as_ref().ok_or(TensorError::NotFitted)?;
        linear_predict(x, w, self.bias)
    }
}

impl<T: Float> Default for LinearRegression<T> {
    fn default() -> Self {
        Self::new(true)
    }
}

/// L2-penalized least squares, `(XᵀX + αL)⁻¹ Xᵀy`.
///
/// `L` is the identity with the intercept slot zeroed, so only the feature
/// coefficients shrink. `alpha` is read, never rescaled, by `fit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct Ridge<T: Float> {
    pub alpha: T,
    pub fit_intercept: bool,
    weights: Option<Tensor<T>>,
    bias: Option<T>,
}

impl<T: Float> Ridge<T> {
    pub fn new(alpha: T, fit_intercept: bool) -> Self {
        Ridge {
            alpha,
            fit_intercept,
            weights: None,
            bias: None,
        }
    }

    pub fn fit(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<&mut Self> {
        let (mut xtx, xty) = gram_system(x, y, self.fit_intercept)?;
        let dim = xtx.shape().dim(0)?;
        // slot 0 is the intercept when present
        for i in usize::from(self.fit_intercept)..dim {
            let v = xtx.get(&[i, i])?;
            xtx.set(&[i, i], v + self.alpha)?;
        }
        let w = solve(&xtx, &xty)?;

        let (coef, bias) = split_weights(w.data(), self.fit_intercept)?;
        self.weights = Some(coef);
        self.bias = bias;
        Ok(self)
    }

    pub fn predict(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        let w = self.weights.as_ref().ok_or(TensorError::NotFitted)?;
        linear_predict(x, w, self.bias)
    }
}

impl<T: Float> Default for Ridge<T> {
    fn default() -> Self {
        Self::new(T::ONE, true)
    }
}

macro_rules! impl_linear_model {
    ($model:ident) => {
        impl<T: Float> LinearModel<T> for $model<T> {
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

        impl<T: Float> Estimator<T> for $model<T> {
            fn fit(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<&mut Self> {
                $model::fit(self, x, y)
            }

            fn predict(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
                $model::predict(self, x)
            }
        }
    };
}

impl_linear_model!(LinearRegression);
impl_linear_model!(Ridge);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn plane() -> (Tensor<f64>, Tensor<f64>) {
        // y = 2*x1 + 3*x2 + 1
        let x = Tensor::from_vec2d(&[
            vec![1.0, 2.0],
            vec![2.0, 1.0],
            vec![3.0, 4.0],
            vec![4.0, 3.0],
            vec![5.0, 5.0],
        ]).unwrap();
        let y = Tensor::from_slice(&[9.0, 8.0, 19.0, 18.0, 26.0]);
        (x, y)
    }

    #[test]
    fn test_linear_regression() {
        let (x, y) = plane();
        let mut model = LinearRegression::new(true);
        let pred = model.fit(&x, &y).unwrap().predict(&x).unwrap();
        for i in 0..5 {
            assert_abs_diff_eq!(pred.data()[i], y.data()[i], epsilon = 1e-6);
        }
        assert_abs_diff_eq!(model.intercept().unwrap(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(model.coef().unwrap().data()[0], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(model.coef().unwrap().data()[1], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_linear_regression_without_intercept() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        let y: Tensor<f64> = Tensor::from_slice(&[2.0, 4.0, 6.0]);
        let mut model = LinearRegression::new(false);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.intercept().unwrap(), 0.0);
        assert_abs_diff_eq!(model.coef().unwrap().data()[0], 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_not_fitted() {
        let model: LinearRegression<f64> = LinearRegression::default();
        let x: Tensor<f64> = Tensor::zeros(vec![1, 2]);
        assert_eq!(model.predict(&x).unwrap_err(), TensorError::NotFitted);
        assert_eq!(model.intercept().unwrap_err(), TensorError::NotFitted);
    }

    #[test]
    fn test_fit_rejects_empty() {
        let x: Tensor<f64> = Tensor::zeros(vec![0, 2]);
        let y: Tensor<f64> = Tensor::zeros(vec![0]);
        let mut model = LinearRegression::new(true);
        assert_eq!(model.fit(&x, &y).unwrap_err(), TensorError::EmptyTensor);
    }

    #[test]
    fn test_ridge_zero_alpha_matches_ols() {
        let (x, y) = plane();
        let mut ols = LinearRegression::new(true);
        ols.fit(&x, &y).unwrap();
        let mut ridge = Ridge::new(0.0, true);
        ridge.fit(&x, &y).unwrap();
        assert_abs_diff_eq!(ridge.intercept().unwrap(), ols.intercept().unwrap(), epsilon = 1e-6);
        for (r, o) in ridge.coef().unwrap().data().iter().zip(ols.coef().unwrap().data()) {
            assert_abs_diff_eq!(*r, *o, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_ridge_leaves_intercept_unpenalized() {
        // Centered feature: the unpenalized intercept is exactly mean(y).
        let x: Tensor<f64> =
            Tensor::from_vec2d(&[vec![-1.5], vec![-0.5], vec![0.5], vec![1.5]]).unwrap();
        let y: Tensor<f64> = Tensor::from_slice(&[1.0, 3.0, 5.0, 7.0]);
        let mut ridge = Ridge::new(10.0, true);
        ridge.fit(&x, &y).unwrap();
        assert_abs_diff_eq!(ridge.intercept().unwrap(), 4.0, epsilon = 1e-10);
        // OLS slope is 2; the penalty shrinks it: 10 / (5 + 10)
        assert_abs_diff_eq!(ridge.coef().unwrap().data()[0], 10.0 / 15.0, epsilon = 1e-10);
    }

    #[test]
    fn test_ridge_refit_keeps_alpha() {
        let (x, y) = plane();
        let mut ridge = Ridge::new(0.5, true);
        ridge.fit(&x, &y).unwrap();
        let first = ridge.coef().unwrap().clone();
        ridge.fit(&x, &y).unwrap();
        assert_eq!(ridge.alpha, 0.5);
        assert_eq!(ridge.coef().unwrap(), &first);
    }
}
