use std::fmt;

use mylearn_core::Float;
use serde::{Deserialize, Serialize};

/// How a node chooses its split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// Rank features by |Pearson r| against the labels and split at the
    /// median. Produces a [`FlatTree`](crate::flat::FlatTree).
    #[default]
    Correlation,
    /// Exhaustive search for the `(feature, threshold)` pair with the highest
    /// entropy reduction. Produces a [`GainTree`](crate::graph::GainTree).
    InformationGain,
}

/// Hyper-parameters shared by both tree builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// A node with at most this many rows becomes a leaf.
    pub leaf_size: usize,
    /// Nodes at this depth become leaves; `None` grows until another rule stops.
    pub max_depth: Option<usize>,
    pub criterion: Criterion,
}

impl Default for TreeParams {
    fn default() -> Self {
        TreeParams {
            leaf_size: 1,
            max_depth: None,
            criterion: Criterion::Correlation,
        }
    }
}

impl TreeParams {
    pub fn new(criterion: Criterion) -> Self {
        TreeParams {
            criterion,
            ..TreeParams::default()
        }
    }

    pub fn set_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    pub fn set_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn set_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Stopping rule, checked in order: depth limit, row count, label purity.
    ///
    /// Returns `None` when the node may be split. `labels` must not be empty.
    pub fn stop_reason<T: Float>(&self, labels: &[T], depth: usize) -> Option<StopReason> {
        if self.max_depth.is_some_and(|max| depth >= max) {
            return Some(StopReason::DepthLimit);
        }
        if labels.len() <= self.leaf_size {
            return Some(StopReason::LeafSize);
        }
        let first = labels[0];
        if labels.iter().all(|&l| l == first) {
            return Some(StopReason::Pure);
        }
        None
    }
}

/// Why a builder turned a node into a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    DepthLimit,
    LeafSize,
    Pure,
    /// No feature produced two non-empty partitions.
    Unsplittable,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::DepthLimit => "max depth reached",
            StopReason::LeafSize => "at or below leaf size",
            StopReason::Pure => "labels are pure",
            StopReason::Unsplittable => "no separating split",
        };
        f.write_str(s)
    }
}
