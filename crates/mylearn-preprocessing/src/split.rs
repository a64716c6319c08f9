use mylearn_core::error::TensorResult;
use mylearn_core::estimator::check_xy;
use mylearn_core::{Float, Tensor, TensorError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Result of [`train_test_split`].
#[derive(Debug, Clone)]
pub struct TrainTestSplit<T: Float> {
    pub x_train: Tensor<T>,
    pub x_test: Tensor<T>,
    pub y_train: Tensor<T>,
    pub y_test: Tensor<T>,
}

/// Shuffle rows and hold out `round(n * test_ratio)` of them for testing.
///
/// The same `seed` always yields the same split.
pub fn train_test_split<T: Float>(
    x: &Tensor<T>,
    y: &Tensor<T>,
    test_ratio: f64,
    seed: Option<u64>,
) -> TensorResult<TrainTestSplit<T>> {
    let (n, _) = check_xy(x, y)?;
    if !(0.0..=1.0).contains(&test_ratio) {
        return Err(TensorError::InvalidOperation(format!(
            "test_ratio must be in [0, 1], got {}",
            test_ratio
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    indices.shuffle(&mut rng);

    let test_size = (n as f64 * test_ratio).round() as usize;
    let (train_idx, test_idx) = indices.split_at(n - test_size);

    Ok(TrainTestSplit {
        x_train: x.select_rows(train_idx)?,
        x_test: x.select_rows(test_idx)?,
        y_train: y.select_rows(train_idx)?,
        y_test: y.select_rows(test_idx)?,
    })
}
