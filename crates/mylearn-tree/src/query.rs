use mylearn_core::error::TensorResult;
use mylearn_core::estimator::check_x;
use mylearn_core::{Float, Tensor, TensorError};

use crate::flat::FlatTree;
use crate::graph::{GainTree, GraphNode};

/// Point and batch prediction by descending a fitted tree.
///
/// At every decision node the query goes left when
/// `point[feature] <= threshold` and right otherwise.
pub trait TreeQuery<T: Float> {
    /// Width of the rows the tree was trained on.
    fn n_features(&self) -> usize;

    fn predict_one(&self, point: &[T]) -> TensorResult<T>;

    /// Predict every row of a `[samples, features]` matrix, in row order.
    fn predict_batch(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        let n = check_x(x, self.n_features())?;
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            out.push(self.predict_one(x.row_slice(i)?)?);
        }
        Tensor::new(out, vec![n])
    }
}

fn check_point<T>(point: &[T], n_features: usize) -> TensorResult<()> {
    if point.len() != n_features {
        return Err(TensorError::DimensionMismatch(format!(
            "tree was fitted on {} features, point has {}",
            n_features,
            point.len()
        )));
    }
    Ok(())
}

fn corrupt(what: String) -> TensorError {
    TensorError::InvalidOperation(format!("corrupt tree: {}", what))
}

impl<T: Float> TreeQuery<T> for FlatTree<T> {
    fn n_features(&self) -> usize {
        FlatTree::n_features(self)
    }

    fn predict_one(&self, point: &[T]) -> TensorResult<T> {
        check_point(point, FlatTree::n_features(self))?;
        let nodes = self.nodes();
        let mut row = 0;
        loop {
            let node = nodes
                .get(row)
                .ok_or_else(|| corrupt(format!("row {} out of range", row)))?;
            if node.is_leaf() {
                return Ok(node.value);
            }
            let value = point
                .get(node.feature_index as usize)
                .ok_or_else(|| corrupt(format!("row {} splits on a missing feature", row)))?;
            let step = if *value <= node.value {
                node.left_offset
            } else {
                node.right_offset
            };
            if step == 0 {
                return Err(corrupt(format!("row {} has a zero child offset", row)));
            }
            row += step;
        }
    }
}

impl<T: Float> TreeQuery<T> for GainTree<T> {
    fn n_features(&self) -> usize {
        GainTree::n_features(self)
    }

    fn predict_one(&self, point: &[T]) -> TensorResult<T> {
        check_point(point, GainTree::n_features(self))?;
        let mut id = self.root();
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..=self.node_count() {
            match self.node(id) {
                Some(GraphNode::Leaf { value, .. }) => return Ok(*value),
                Some(GraphNode::Decision {
                    feature_index,
                    threshold,
                    left,
                    right,
                    ..
                }) => {
                    let value = point.get(*feature_index).ok_or_else(|| {
                        corrupt(format!("node {} splits on a missing feature", id))
                    })?;
                    id = if *value <= *threshold { *left } else { *right };
                }
                None => return Err(corrupt(format!("node {} out of range", id))),
            }
        }
        Err(corrupt("descent does not terminate".to_string()))
    }
}
