use log::debug;
use mylearn_core::error::TensorResult;
use mylearn_core::estimator::class_id;
use mylearn_core::{Float, Tensor};
use serde::{Deserialize, Serialize};

use crate::params::{StopReason, TreeParams};
use crate::split::{best_feature_and_threshold, majority_class, DataView};

/// Index of a node in a [`GainTree`] arena.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub enum GraphNode<T: Float> {
    Decision {
        feature_index: usize,
        threshold: T,
        left: NodeId,
        right: NodeId,
        parent: Option<NodeId>,
        /// Majority class of the rows that reached this node.
        value: T,
    },
    Leaf {
        value: T,
        parent: Option<NodeId>,
    },
}

impl<T: Float> GraphNode<T> {
    pub fn value(&self) -> T {
        match self {
            GraphNode::Decision { value, .. } | GraphNode::Leaf { value, .. } => *value,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        match self {
            GraphNode::Decision { parent, .. } | GraphNode::Leaf { parent, .. } => *parent,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, GraphNode::Leaf { .. })
    }
}

/// Decision tree held as an arena of nodes linked by [`NodeId`].
///
/// Every node records its parent, and decision nodes also keep the majority
/// class of their subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct GainTree<T: Float> {
    nodes: Vec<GraphNode<T>>,
    root: NodeId,
    n_features: usize,
    n_classes: usize,
}

impl<T: Float> GainTree<T> {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode<T>> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[GraphNode<T>] {
        &self.nodes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(GraphNode::parent)
    }

    /// Nodes on the path from `id` up to the root, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            path.push(p);
            current = self.parent(p);
        }
        path
    }

    pub fn depth(&self) -> usize {
        (0..self.nodes.len())
            .filter(|&id| self.nodes[id].is_leaf())
            .map(|id| self.ancestors(id).len())
            .max()
            .unwrap_or(0)
    }
}

/// Grows a [`GainTree`] by choosing, at every node, the `(feature, threshold)`
/// pair with the largest information gain over all features and all distinct
/// values.
///
/// Labels must be non-negative integer class ids.
pub struct GainTreeBuilder<'p> {
    params: &'p TreeParams,
}

impl<'p> GainTreeBuilder<'p> {
    pub fn new(params: &'p TreeParams) -> Self {
        GainTreeBuilder { params }
    }

    pub fn build<T: Float>(&self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<GainTree<T>> {
        let n = x.shape().dim(0)?;
        let rows: Vec<usize> = (0..n).collect();
        let data = DataView::new(x, y, &rows)?;
        let n_classes = count_classes(y.data())?;

        let mut nodes = Vec::new();
        let (root, _) = self.grow(&data, 0, None, n_classes, &mut nodes);
        Ok(GainTree {
            nodes,
            root,
            n_features: data.n_features(),
            n_classes,
        })
    }

    /// Add the subtree for `data` to the arena. Returns its root id and the
    /// class histogram of its rows.
    fn grow<T: Float>(
        &self,
        data: &DataView<'_, T>,
        depth: usize,
        parent: Option<NodeId>,
        n_classes: usize,
        arena: &mut Vec<GraphNode<T>>,
    ) -> (NodeId, Vec<usize>) {
        let labels = data.labels();
        if let Some(reason) = self.params.stop_reason(&labels, depth) {
            return push_leaf(arena, &labels, n_classes, parent, depth, reason);
        }

        // Only an all-constant view picks a threshold that sends every row left.
        let split = best_feature_and_threshold(data)
            .map(|split| (split, data.partition(split.feature, split.threshold)))
            .filter(|(_, (left, right))| !left.is_empty() && !right.is_empty());
        let Some((split, (left, right))) = split else {
            return push_leaf(arena, &labels, n_classes, parent, depth, StopReason::Unsplittable);
        };
        debug!(
            "depth {}: split feature {} at {} (gain={:.4}, {}/{} rows)",
            depth,
            split.feature,
            split.threshold,
            split.gain,
            left.len(),
            right.len()
        );

        // Reserve the slot so the children can point back at it.
        let id = arena.len();
        arena.push(GraphNode::Leaf {
            value: T::ZERO,
            parent,
        });
        let (left_id, left_counts) =
            self.grow(&data.subset(&left), depth + 1, Some(id), n_classes, arena);
        let (right_id, right_counts) =
            self.grow(&data.subset(&right), depth + 1, Some(id), n_classes, arena);

        let counts: Vec<usize> = left_counts
            .iter()
            .zip(&right_counts)
            .map(|(a, b)| a + b)
            .collect();
        arena[id] = GraphNode::Decision {
            feature_index: split.feature,
            threshold: split.threshold,
            left: left_id,
            right: right_id,
            parent,
            value: T::from_usize(majority_class(&counts)),
        };
        (id, counts)
    }
}

fn push_leaf<T: Float>(
    arena: &mut Vec<GraphNode<T>>,
    labels: &[T],
    n_classes: usize,
    parent: Option<NodeId>,
    depth: usize,
    reason: StopReason,
) -> (NodeId, Vec<usize>) {
    let counts = histogram(labels, n_classes);
    let value = T::from_usize(majority_class(&counts));
    debug!("depth {}: leaf {} over {} rows ({})", depth, value, labels.len(), reason);
    let id = arena.len();
    arena.push(GraphNode::Leaf { value, parent });
    (id, counts)
}

fn histogram<T: Float>(labels: &[T], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &l in labels {
        counts[l.to_f64() as usize] += 1;
    }
    counts
}

/// Number of classes implied by the largest label, after checking every
/// label is a class id.
fn count_classes<T: Float>(labels: &[T]) -> TensorResult<usize> {
    let mut n_classes = 0;
    for &l in labels {
        n_classes = n_classes.max(class_id(l)? + 1);
    }
    Ok(n_classes)
}
