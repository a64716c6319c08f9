use log::info;
use mylearn_core::error::TensorResult;
use mylearn_core::{Estimator, Float, Tensor, TensorError};
use serde::{Deserialize, Serialize};

use crate::flat::{CorrelationTreeBuilder, FlatTree};
use crate::graph::{GainTree, GainTreeBuilder};
use crate::params::{Criterion, TreeParams};
use crate::query::TreeQuery;

/// The encoding produced by the configured [`Criterion`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub enum FittedTree<T: Float> {
    Flat(FlatTree<T>),
    Graph(GainTree<T>),
}

impl<T: Float> FittedTree<T> {
    fn as_query(&self) -> &dyn TreeQuery<T> {
        match self {
            FittedTree::Flat(tree) => tree,
            FittedTree::Graph(tree) => tree,
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            FittedTree::Flat(tree) => tree.node_count(),
            FittedTree::Graph(tree) => tree.node_count(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            FittedTree::Flat(tree) => tree.depth(),
            FittedTree::Graph(tree) => tree.depth(),
        }
    }
}

/// Decision tree classifier.
///
/// [`Criterion::Correlation`] grows a median-split tree stored as a flat
/// table; [`Criterion::InformationGain`] grows an entropy-driven tree stored
/// as a parent-linked node arena. Both answer queries the same way.
///
/// ```ignore
/// let mut tree = DecisionTree::new(TreeParams::new(Criterion::InformationGain));
/// let pred = tree.fit(&x, &y)?.predict(&x_test)?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct DecisionTree<T: Float> {
    pub params: TreeParams,
    tree: Option<FittedTree<T>>,
}

impl<T: Float> DecisionTree<T> {
    pub fn new(params: TreeParams) -> Self {
        DecisionTree { params, tree: None }
    }

    /// Grow a tree over `x` (`[samples, features]`) and `y`, replacing any
    /// earlier fit. On error the previous tree is kept.
    pub fn fit(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<&mut Self> {
        let fitted = match self.params.criterion {
            Criterion::Correlation => {
                FittedTree::Flat(CorrelationTreeBuilder::new(&self.params).build(x, y)?)
            }
            Criterion::InformationGain => {
                FittedTree::Graph(GainTreeBuilder::new(&self.params).build(x, y)?)
            }
        };
        info!(
            "fitted {:?} tree on {} rows x {} features: {} nodes, depth {}",
            self.params.criterion,
            y.numel(),
            fitted.as_query().n_features(),
            fitted.node_count(),
            fitted.depth()
        );
        self.tree = Some(fitted);
        Ok(self)
    }

    fn fitted(&self) -> TensorResult<&FittedTree<T>> {
        self.tree.as_ref().ok_or(TensorError::NotFitted)
    }

    pub fn predict_one(&self, point: &[T]) -> TensorResult<T> {
        self.fitted()?.as_query().predict_one(point)
    }

    pub fn predict(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        self.fitted()?.as_query().predict_batch(x)
    }

    pub fn is_fitted(&self) -> bool {
        self.tree.is_some()
    }

    pub fn tree(&self) -> Option<&FittedTree<T>> {
        self.tree.as_ref()
    }

    pub fn node_count(&self) -> TensorResult<usize> {
        Ok(self.fitted()?.node_count())
    }

    pub fn depth(&self) -> TensorResult<usize> {
        Ok(self.fitted()?.depth())
    }

    pub fn n_features(&self) -> TensorResult<usize> {
        Ok(self.fitted()?.as_query().n_features())
    }
}

impl<T: Float> Default for DecisionTree<T> {
    fn default() -> Self {
        Self::new(TreeParams::default())
    }
}

impl<T: Float> Estimator<T> for DecisionTree<T> {
    fn fit(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<&mut Self> {
        DecisionTree::fit(self, x, y)
    }

    fn predict(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        DecisionTree::predict(self, x)
    }
}
