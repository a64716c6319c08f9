use mylearn_core::error::TensorResult;
use mylearn_core::estimator::{check_x, check_xy, class_id};
use mylearn_core::{Estimator, Float, Tensor, TensorError};
use serde::{Deserialize, Serialize};

/// Read `y` as class ids `0..k` and count rows per class.
fn class_counts<T: Float>(y: &Tensor<T>) -> TensorResult<Vec<usize>> {
    let mut counts: Vec<usize> = Vec::new();
    for &v in y.data() {
        let cls = class_id(v)?;
        if cls >= counts.len() {
            counts.resize(cls + 1, 0);
        }
        counts[cls] += 1;
    }
    Ok(counts)
}

/// Per-class feature sums: `sums[c][j] = Σ x_ij over rows of class c`.
fn feature_sums<T: Float>(x: &Tensor<T>, y: &Tensor<T>, k: usize) -> TensorResult<Vec<Vec<f64>>> {
    let (n, p) = check_xy(x, y)?;
    let mut sums = vec![vec![0.0f64; p]; k];
    for i in 0..n {
        let cls = y.data()[i].to_f64() as usize;
        for (acc, v) in sums[cls].iter_mut().zip(x.row_slice(i)?) {
            *acc += v.to_f64();
        }
    }
    Ok(sums)
}

/// Fitted class priors and per-feature log probabilities shared by both
/// variants. Only features present in a row (`x_j > 0`) contribute to its score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PresenceModel {
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>, // [n_classes][n_features]
}

impl PresenceModel {
    fn is_fitted(&self) -> bool {
        !self.class_log_prior.is_empty()
    }

    fn n_features(&self) -> usize {
        self.feature_log_prob.first().map_or(0, Vec::len)
    }

    fn log_scores<T: Float>(&self, x: &Tensor<T>) -> TensorResult<Vec<Vec<f64>>> {
        if !self.is_fitted() {
            return Err(TensorError::NotFitted);
        }
        let n = check_x(x, self.n_features())?;
        let mut results = Vec::with_capacity(n);
        for i in 0..n {
            let row = x.row_slice(i)?;
            let scores = self
                .class_log_prior
                .iter()
                .zip(&self.feature_log_prob)
                .map(|(&prior, log_probs)| {
                    prior
                        + row
                            .iter()
                            .zip(log_probs)
                            .filter(|(v, _)| v.to_f64() > 0.0)
                            .map(|(_, &lp)| lp)
                            .sum::<f64>()
                })
                .collect();
            results.push(scores);
        }
        Ok(results)
    }

    fn predict<T: Float>(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        let scores = self.log_scores(x)?;
        let n = scores.len();
        let predictions: Vec<T> = scores
            .iter()
            .map(|s| {
                // First class wins ties.
                let mut best_class = 0;
                for (cls, &score) in s.iter().enumerate() {
                    if score > s[best_class] {
                        best_class = cls;
                    }
                }
                T::from_usize(best_class)
            })
            .collect();
        Tensor::new(predictions, vec![n])
    }
}

/// Multinomial Naive Bayes classifier for count features (e.g. bag of words).
///
/// With two classes each feature probability is smoothed against the class
/// size, `(Σ_c x_j + 1) / (n_c + k)`; with more classes it is normalized
/// against the feature's total count instead, `(Σ_c x_j + 1) / (Σ x_j + k)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MultinomialNB {
    model: PresenceModel,
}

impl MultinomialNB {
    pub fn new() -> Self {
        MultinomialNB::default()
    }

    pub fn n_classes(&self) -> usize {
        self.model.class_log_prior.len()
    }

    pub fn fit<T: Float>(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<&mut Self> {
        let (n, p) = check_xy(x, y)?;
        let counts = class_counts(y)?;
        let k = counts.len();
        let sums = feature_sums(x, y, k)?;

        let column_totals: Vec<f64> = (0..p)
            .map(|j| sums.iter().map(|row| row[j]).sum())
            .collect();

        let class_log_prior = counts.iter().map(|&c| (c as f64 / n as f64).ln()).collect();
        let feature_log_prob = sums
            .iter()
            .zip(&counts)
            .map(|(class_sums, &count)| {
                class_sums
                    .iter()
                    .zip(&column_totals)
                    .map(|(&s, &total)| {
                        let denom = (if k > 2 { total } else { count as f64 }) + k as f64;
                        ((s + 1.0) / denom).ln()
                    })
                    .collect()
            })
            .collect();

        self.model = PresenceModel {
            class_log_prior,
            feature_log_prob,
        };
        Ok(self)
    }

    pub fn predict<T: Float>(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        self.model.predict(x)
    }

    /// Unnormalized per-class log scores, `[n_samples][n_classes]`.
    pub fn predict_log_proba<T: Float>(&self, x: &Tensor<T>) -> TensorResult<Vec<Vec<f64>>> {
        self.model.log_scores(x)
    }
}

/// Bernoulli-style Naive Bayes over feature presence.
///
/// `P(x_j present | c) = (Σ_c x_j + 1) / (n_c + k)`; a row's score sums the log
/// probabilities of the features it contains.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BernoulliNB {
    model: PresenceModel,
}

impl BernoulliNB {
    pub fn new() -> Self {
        BernoulliNB::default()
    }

    pub fn n_classes(&self) -> usize {
        self.model.class_log_prior.len()
    }

    pub fn fit<T: Float>(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<&mut Self> {
        let (n, _) = check_xy(x, y)?;
        let counts = class_counts(y)?;
        let k = counts.len();
        let sums = feature_sums(x, y, k)?;

        let class_log_prior = counts.iter().map(|&c| (c as f64 / n as f64).ln()).collect();
        let feature_log_prob = sums
            .iter()
            .zip(&counts)
            .map(|(class_sums, &count)| {
                class_sums
                    .iter()
                    .map(|&s| ((s + 1.0) / (count + k) as f64).ln())
                    .collect()
            })
            .collect();

        self.model = PresenceModel {
            class_log_prior,
            feature_log_prob,
        };
        Ok(self)
    }

    pub fn predict<T: Float>(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        self.model.predict(x)
    }

    /// Unnormalized per-class log scores, `[n_samples][n_classes]`.
    pub fn predict_log_proba<T: Float>(&self, x: &Tensor<T>) -> TensorResult<Vec<Vec<f64>>> {
        self.model.log_scores(x)
    }
}

impl<T: Float> Estimator<T> for MultinomialNB {
    fn fit(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<&mut Self> {
        MultinomialNB::fit(self, x, y)
    }

    fn predict(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        MultinomialNB::predict(self, x)
    }
}

impl<T: Float> Estimator<T> for BernoulliNB {
    fn fit(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<&mut Self> {
        BernoulliNB::fit(self, x, y)
    }

    fn predict(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        BernoulliNB::predict(self, x)
    }
}
