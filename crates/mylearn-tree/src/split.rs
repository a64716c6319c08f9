//! Split scoring shared by the tree builders.
//!
//! Everything here works on a [`DataView`], a subset of training rows
//! addressed by index, so partitions never copy the feature matrix.

use std::cmp::Ordering;

use mylearn_core::error::TensorResult;
use mylearn_core::estimator::check_xy;
use mylearn_core::{Float, Tensor, TensorError};

/// A subset of rows of a `[samples, features]` matrix and its labels.
#[derive(Debug, Clone, Copy)]
pub struct DataView<'a, T: Float> {
    x: &'a [T],
    y: &'a [T],
    rows: &'a [usize],
    n_features: usize,
}

impl<'a, T: Float> DataView<'a, T> {
    /// View over the rows listed in `rows`. Indices must be in range.
    pub fn new(x: &'a Tensor<T>, y: &'a Tensor<T>, rows: &'a [usize]) -> TensorResult<Self> {
        let (n, n_features) = check_xy(x, y)?;
        if let Some(&bad) = rows.iter().find(|&&r| r >= n) {
            return Err(TensorError::IndexOutOfBounds {
                index: bad,
                axis: 0,
                size: n,
            });
        }
        Ok(DataView {
            x: x.data(),
            y: y.data(),
            rows,
            n_features,
        })
    }

    /// Same matrix, different row subset.
    pub fn subset<'b>(&self, rows: &'b [usize]) -> DataView<'b, T>
    where
        'a: 'b,
    {
        DataView {
            x: self.x,
            y: self.y,
            rows,
            n_features: self.n_features,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn rows(&self) -> &'a [usize] {
        self.rows
    }

    #[inline]
    pub fn value(&self, row: usize, feature: usize) -> T {
        self.x[row * self.n_features + feature]
    }

    pub fn labels(&self) -> Vec<T> {
        self.rows.iter().map(|&r| self.y[r]).collect()
    }

    pub fn feature_values(&self, feature: usize) -> Vec<T> {
        self.rows.iter().map(|&r| self.value(r, feature)).collect()
    }

    /// Split rows into `value <= threshold` and the rest, preserving order.
    pub fn partition(&self, feature: usize, threshold: T) -> (Vec<usize>, Vec<usize>) {
        self.rows
            .iter()
            .partition(|&&r| self.value(r, feature) <= threshold)
    }
}

/// Distinct labels with their counts, in order of first appearance.
pub fn label_counts<T: Float>(labels: &[T]) -> Vec<(T, usize)> {
    let mut counts: Vec<(T, usize)> = Vec::new();
    for &label in labels {
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, c)) => *c += 1,
            None => counts.push((label, 1)),
        }
    }
    counts
}

/// Shannon entropy (base 2) of a label multiset. Zero for an empty slice.
pub fn entropy<T: Float>(labels: &[T]) -> f64 {
    let n = labels.len() as f64;
    label_counts(labels)
        .into_iter()
        .map(|(_, c)| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum()
}

/// `parent_entropy` minus the size-weighted entropy of the two children.
pub fn information_gain<T: Float>(left: &[T], right: &[T], parent_entropy: f64) -> f64 {
    let total = (left.len() + right.len()) as f64;
    if total == 0.0 {
        return 0.0;
    }
    let weighted = left.len() as f64 / total * entropy(left)
        + right.len() as f64 / total * entropy(right);
    parent_entropy - weighted
}

/// Candidate split of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split<T> {
    pub feature: usize,
    pub threshold: T,
    pub gain: f64,
}

/// Sorted distinct values of a column.
fn distinct_sorted<T: Float>(mut values: Vec<T>) -> Vec<T> {
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();
    values
}

/// Try the distinct values of `feature` as `<=` thresholds and keep the
/// first one with the highest gain. Returns `(threshold, gain)`.
///
/// The largest value is skipped when the column has others: it would send
/// every row left.
pub fn best_threshold_for_feature<T: Float>(
    data: &DataView<'_, T>,
    feature: usize,
    parent_entropy: f64,
) -> (T, f64) {
    let mut candidates = distinct_sorted(data.feature_values(feature));
    if candidates.len() > 1 {
        candidates.pop();
    }
    let mut best = (candidates.first().copied().unwrap_or(T::ZERO), f64::NEG_INFINITY);

    let mut left = Vec::with_capacity(data.len());
    let mut right = Vec::with_capacity(data.len());
    for &threshold in &candidates {
        left.clear();
        right.clear();
        for &r in data.rows() {
            let label = data.y[r];
            if data.value(r, feature) <= threshold {
                left.push(label);
            } else {
                right.push(label);
            }
        }
        let gain = information_gain(&left, &right, parent_entropy);
        if gain > best.1 {
            best = (threshold, gain);
        }
    }
    best
}

/// Exhaustive search over every feature. A column with a single distinct
/// value scores zero and is only chosen when every column is constant;
/// otherwise ties go to the lowest feature index.
///
/// Returns `None` only when the view has no features.
pub fn best_feature_and_threshold<T: Float>(data: &DataView<'_, T>) -> Option<Split<T>> {
    let parent_entropy = entropy(&data.labels());
    // (constant, split)
    let mut best: Option<(bool, Split<T>)> = None;
    for feature in 0..data.n_features() {
        let values = data.feature_values(feature);
        let first = values.first().copied().unwrap_or(T::ZERO);
        let constant = values.iter().all(|&v| v == first);
        let (threshold, gain) = if constant {
            (first, 0.0)
        } else {
            best_threshold_for_feature(data, feature, parent_entropy)
        };
        let better = match best {
            None => true,
            Some((best_constant, b)) if best_constant == constant => gain > b.gain,
            Some((best_constant, _)) => best_constant,
        };
        if better {
            let split = Split {
                feature,
                threshold,
                gain,
            };
            best = Some((constant, split));
        }
    }
    best.map(|(_, split)| split)
}

/// |Pearson r| between two columns; zero when either is constant.
pub fn abs_correlation<T: Float>(a: &[T], b: &[T]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let mean = |v: &[T]| v[..n].iter().map(|x| x.to_f64()).sum::<f64>() / n as f64;
    let (ma, mb) = (mean(a), mean(b));
    let (mut cov, mut va, mut vb) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        let dx = x.to_f64() - ma;
        let dy = y.to_f64() - mb;
        cov += dx * dy;
        va += dx * dx;
        vb += dy * dy;
    }
    let denom = (va * vb).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    (cov / denom).abs()
}

/// Features ordered by ascending |r| with the labels, so `pop()` yields the
/// strongest. Equal scores pop the lower feature index first.
pub fn feature_correlation_ranking<T: Float>(data: &DataView<'_, T>) -> Vec<(f64, usize)> {
    let labels = data.labels();
    let mut ranking: Vec<(f64, usize)> = (0..data.n_features())
        .map(|j| (abs_correlation(&data.feature_values(j), &labels), j))
        .collect();
    ranking.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.1.cmp(&a.1))
    });
    ranking
}

/// Median of a non-empty column; even counts average the two middle values.
pub fn median<T: Float>(values: &[T]) -> T {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) * T::HALF
    } else {
        sorted[mid]
    }
}

/// Most frequent label; the earliest seen wins ties.
pub fn most_frequent<T: Float>(labels: &[T]) -> T {
    let mut best = (T::ZERO, 0);
    for (label, count) in label_counts(labels) {
        if count > best.1 {
            best = (label, count);
        }
    }
    best.0
}

/// Index of the largest count; the lowest index wins ties.
pub fn majority_class(counts: &[usize]) -> usize {
    let mut best = 0;
    for (cls, &c) in counts.iter().enumerate() {
        if c > counts[best] {
            best = cls;
        }
    }
    best
}
