use mylearn_core::error::TensorResult;
use mylearn_core::{Tensor, TensorError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Ten rows per species: sepal length, sepal width, petal length, petal width.
const IRIS: [[f64; 4]; 30] = [
    // setosa
    [5.1, 3.5, 1.4, 0.2], [4.9, 3.0, 1.4, 0.2], [4.7, 3.2, 1.3, 0.2], [4.6, 3.1, 1.5, 0.2],
    [5.0, 3.6, 1.4, 0.2], [5.4, 3.9, 1.7, 0.4], [4.6, 3.4, 1.4, 0.3], [5.0, 3.4, 1.5, 0.2],
    [4.4, 2.9, 1.4, 0.2], [4.9, 3.1, 1.5, 0.1],
    // versicolor
    [7.0, 3.2, 4.7, 1.4], [6.4, 3.2, 4.5, 1.5], [6.9, 3.1, 4.9, 1.5], [5.5, 2.3, 4.0, 1.3],
    [6.5, 2.8, 4.6, 1.5], [5.7, 2.8, 4.5, 1.3], [6.3, 3.3, 4.7, 1.6], [4.9, 2.4, 3.3, 1.0],
    [6.6, 2.9, 4.6, 1.3], [5.2, 2.7, 3.9, 1.4],
    // virginica
    [6.3, 3.3, 6.0, 2.5], [5.8, 2.7, 5.1, 1.9], [7.1, 3.0, 5.9, 2.1], [6.3, 2.9, 5.6, 1.8],
    [6.5, 3.0, 5.8, 2.2], [7.6, 3.0, 6.6, 2.1], [4.9, 2.5, 4.5, 1.7], [7.3, 2.9, 6.3, 1.8],
    [6.7, 2.5, 5.8, 1.8], [7.2, 3.6, 6.1, 2.5],
];

/// A 30-row, 3-class subset of the Iris dataset. Labels are `0.0`, `1.0`, `2.0`.
pub fn load_iris() -> TensorResult<(Tensor<f64>, Tensor<f64>)> {
    let features: Vec<f64> = IRIS.iter().flatten().copied().collect();
    let labels: Vec<f64> = (0..IRIS.len()).map(|i| (i / 10) as f64).collect();
    Ok((
        Tensor::new(features, vec![IRIS.len(), 4])?,
        Tensor::new(labels, vec![IRIS.len()])?,
    ))
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Standard normal sample (Box-Muller).
fn gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-10);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Isotropic Gaussian blobs around `n_centers` well-separated centers.
///
/// Rows are grouped by class; the last class absorbs the remainder when
/// `n_samples` is not a multiple of `n_centers`.
pub fn make_blobs(
    n_samples: usize,
    n_features: usize,
    n_centers: usize,
    cluster_std: f64,
    seed: Option<u64>,
) -> TensorResult<(Tensor<f64>, Tensor<f64>)> {
    if n_centers == 0 || n_samples < n_centers {
        return Err(TensorError::InvalidOperation(format!(
            "cannot draw {} samples around {} centers",
            n_samples, n_centers
        )));
    }
    let mut rng = rng_from(seed);

    // centers 5 units apart along the diagonal, jittered
    let centers: Vec<Vec<f64>> = (0..n_centers)
        .map(|c| (0..n_features).map(|_| c as f64 * 5.0 + rng.gen::<f64>()).collect())
        .collect();

    let per_center = n_samples / n_centers;
    let mut features = Vec::with_capacity(n_samples * n_features);
    let mut labels = Vec::with_capacity(n_samples);
    for (c, center) in centers.iter().enumerate() {
        let count = if c + 1 == n_centers {
            n_samples - per_center * (n_centers - 1)
        } else {
            per_center
        };
        for _ in 0..count {
            features.extend(center.iter().map(|&m| m + gaussian(&mut rng) * cluster_std));
            labels.push(c as f64);
        }
    }

    Ok((
        Tensor::new(features, vec![n_samples, n_features])?,
        Tensor::new(labels, vec![n_samples])?,
    ))
}

/// Linear regression data: `y = X·w + noise`, `X ~ U(-1, 1)`, `w ~ U(-5, 5)`.
///
/// Returns `(x, y, w)`.
pub fn make_regression(
    n_samples: usize,
    n_features: usize,
    noise: f64,
    seed: Option<u64>,
) -> TensorResult<(Tensor<f64>, Tensor<f64>, Tensor<f64>)> {
    let mut rng = rng_from(seed);
    let weights: Vec<f64> = (0..n_features).map(|_| rng.gen::<f64>() * 10.0 - 5.0).collect();

    let mut features = Vec::with_capacity(n_samples * n_features);
    let mut labels = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let mut target = 0.0;
        for w in &weights {
            let v = rng.gen::<f64>() * 2.0 - 1.0;
            features.push(v);
            target += v * w;
        }
        labels.push(target + gaussian(&mut rng) * noise);
    }

    Ok((
        Tensor::new(features, vec![n_samples, n_features])?,
        Tensor::new(labels, vec![n_samples])?,
        Tensor::from_slice(&weights),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_iris() {
        let (x, y) = load_iris().unwrap();
        assert_eq!(x.shape_vec(), vec![30, 4]);
        assert_eq!(y.data()[9], 0.0);
        assert_eq!(y.data()[10], 1.0);
        assert_eq!(y.data()[29], 2.0);
        assert_eq!(x.row_slice(10).unwrap(), &[7.0, 3.2, 4.7, 1.4]);
    }

    #[test]
    fn test_make_blobs() {
        let (x, y) = make_blobs(100, 2, 3, 0.5, Some(42)).unwrap();
        assert_eq!(x.shape_vec(), vec![100, 2]);
        assert_eq!(y.numel(), 100);
        // 33 + 33 + 34
        assert_eq!(y.data().iter().filter(|&&l| l == 2.0).count(), 34);
        assert!(make_blobs(2, 2, 3, 0.5, None).is_err());
    }

    #[test]
    fn test_make_regression_is_seeded() {
        let (x, y, w) = make_regression(50, 3, 0.0, Some(42)).unwrap();
        assert_eq!(x.shape_vec(), vec![50, 3]);
        assert_eq!(w.numel(), 3);
        // noiseless targets are exactly X·w
        let row = x.row_slice(0).unwrap();
        let expected: f64 = row.iter().zip(w.data()).map(|(a, b)| a * b).sum();
        assert!((y.data()[0] - expected).abs() < 1e-12);

        let (x2, _, _) = make_regression(50, 3, 0.0, Some(42)).unwrap();
        assert_eq!(x, x2);
    }
}
