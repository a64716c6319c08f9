use log::debug;
use mylearn_core::error::TensorResult;
use mylearn_core::{Float, Tensor, TensorError};
use serde::{Deserialize, Serialize};

use crate::params::{StopReason, TreeParams};
use crate::split::{feature_correlation_ranking, median, most_frequent, DataView};

/// `feature_index` of a leaf row.
pub const LEAF: isize = -1;

/// One row of a [`FlatTree`].
///
/// For a decision row, `value` is the split threshold and the children sit
/// `left_offset` and `right_offset` rows further down. For a leaf row,
/// `feature_index` is [`LEAF`], `value` is the predicted label and both
/// offsets are zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct FlatNode<T: Float> {
    pub feature_index: isize,
    pub value: T,
    pub left_offset: usize,
    pub right_offset: usize,
}

impl<T: Float> FlatNode<T> {
    pub fn leaf(value: T) -> Self {
        FlatNode {
            feature_index: LEAF,
            value,
            left_offset: 0,
            right_offset: 0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_index < 0
    }
}

/// Decision tree stored as a pre-order table of rows.
///
/// Each subtree occupies a contiguous block: its root, then the whole left
/// subtree, then the whole right subtree. Row 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct FlatTree<T: Float> {
    nodes: Vec<FlatNode<T>>,
    n_features: usize,
}

impl<T: Float> FlatTree<T> {
    pub fn nodes(&self) -> &[FlatNode<T>] {
        &self.nodes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Length of the longest root-to-leaf path in edges.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((row, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(row) else { continue };
            if node.is_leaf() {
                max_depth = max_depth.max(depth);
            } else {
                stack.push((row + node.left_offset, depth + 1));
                stack.push((row + node.right_offset, depth + 1));
            }
        }
        max_depth
    }

    /// Check the table's structure: every row is reached exactly once from
    /// row 0, children lie inside the table, split features are in range and
    /// leaves carry zero offsets.
    pub fn validate(&self) -> TensorResult<()> {
        if self.nodes.is_empty() {
            return Err(TensorError::EmptyTensor);
        }
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![0usize];
        while let Some(row) = stack.pop() {
            let node = self.nodes.get(row).ok_or_else(|| {
                TensorError::InvalidOperation(format!("child row {} is outside the table", row))
            })?;
            if seen[row] {
                return Err(TensorError::InvalidOperation(format!(
                    "row {} is reachable twice",
                    row
                )));
            }
            seen[row] = true;
            if node.is_leaf() {
                if node.feature_index != LEAF || node.left_offset != 0 || node.right_offset != 0 {
                    return Err(TensorError::InvalidOperation(format!(
                        "leaf row {} is malformed",
                        row
                    )));
                }
                continue;
            }
            if node.feature_index as usize >= self.n_features {
                return Err(TensorError::InvalidOperation(format!(
                    "row {} splits on feature {} of {}",
                    row, node.feature_index, self.n_features
                )));
            }
            if node.left_offset == 0 || node.right_offset == 0 {
                return Err(TensorError::InvalidOperation(format!(
                    "decision row {} points at itself",
                    row
                )));
            }
            stack.push(row + node.left_offset);
            stack.push(row + node.right_offset);
        }
        match seen.iter().position(|&s| !s) {
            Some(row) => Err(TensorError::InvalidOperation(format!(
                "row {} is unreachable",
                row
            ))),
            None => Ok(()),
        }
    }
}

/// Grows a [`FlatTree`] by ranking features on |Pearson r| with the labels
/// and splitting the strongest one at its median.
///
/// If the median split of a feature leaves one side empty the next-ranked
/// feature is tried; a node where none separates becomes a leaf.
pub struct CorrelationTreeBuilder<'p> {
    params: &'p TreeParams,
}

impl<'p> CorrelationTreeBuilder<'p> {
    pub fn new(params: &'p TreeParams) -> Self {
        CorrelationTreeBuilder { params }
    }

    pub fn build<T: Float>(&self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<FlatTree<T>> {
        let n = x.shape().dim(0)?;
        let rows: Vec<usize> = (0..n).collect();
        let data = DataView::new(x, y, &rows)?;
        if data.is_empty() {
            return Err(TensorError::EmptyTensor);
        }

        let mut nodes = Vec::new();
        self.grow(&data, 0, &mut nodes);
        Ok(FlatTree {
            nodes,
            n_features: data.n_features(),
        })
    }

    /// Append the subtree for `data` to `out` and return its row count.
    fn grow<T: Float>(
        &self,
        data: &DataView<'_, T>,
        depth: usize,
        out: &mut Vec<FlatNode<T>>,
    ) -> usize {
        let labels = data.labels();
        if let Some(reason) = self.params.stop_reason(&labels, depth) {
            return push_leaf(out, &labels, depth, reason);
        }

        let mut ranking = feature_correlation_ranking(data);
        while let Some((corr, feature)) = ranking.pop() {
            let threshold = median(&data.feature_values(feature));
            let (left, right) = data.partition(feature, threshold);
            if left.is_empty() || right.is_empty() {
                continue;
            }
            debug!(
                "depth {}: split feature {} at {} (|r|={:.4}, {}/{} rows)",
                depth,
                feature,
                threshold,
                corr,
                left.len(),
                right.len()
            );

            let root = out.len();
            out.push(FlatNode {
                feature_index: feature as isize,
                value: threshold,
                left_offset: 1,
                right_offset: 0,
            });
            let left_len = self.grow(&data.subset(&left), depth + 1, out);
            let right_len = self.grow(&data.subset(&right), depth + 1, out);
            out[root].right_offset = 1 + left_len;
            return 1 + left_len + right_len;
        }

        push_leaf(out, &labels, depth, StopReason::Unsplittable)
    }
}

fn push_leaf<T: Float>(
    out: &mut Vec<FlatNode<T>>,
    labels: &[T],
    depth: usize,
    reason: StopReason,
) -> usize {
    let value = most_frequent(labels);
    debug!("depth {}: leaf {} over {} rows ({})", depth, value, labels.len(), reason);
    out.push(FlatNode::leaf(value));
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TreeQuery;

    fn build(x: &Tensor<f64>, y: &Tensor<f64>, params: &TreeParams) -> FlatTree<f64> {
        CorrelationTreeBuilder::new(params).build(x, y).unwrap()
    }

    #[test]
    fn test_single_feature_split_at_median() {
        let x = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![4, 1]).unwrap();
        let y = Tensor::from_slice(&[0.0, 0.0, 1.0, 1.0]);
        let tree = build(&x, &y, &TreeParams::default());

        assert_eq!(tree.node_count(), 3);
        assert_eq!(
            tree.nodes()[0],
            FlatNode {
                feature_index: 0,
                value: 2.5,
                left_offset: 1,
                right_offset: 2,
            }
        );
        assert_eq!(tree.nodes()[1], FlatNode::leaf(0.0));
        assert_eq!(tree.nodes()[2], FlatNode::leaf(1.0));
        tree.validate().unwrap();
    }

    #[test]
    fn test_right_offset_skips_left_subtree() {
        let x = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], vec![8, 1]).unwrap();
        let y = Tensor::from_slice(&[0.0, 1.0, 0.0, 1.0, 2.0, 2.0, 2.0, 2.0]);
        let tree = build(&x, &y, &TreeParams::default());
        tree.validate().unwrap();

        let root = tree.nodes()[0];
        assert!(!root.is_leaf());
        let right = tree.nodes()[root.right_offset];
        // right half is pure class 2
        assert_eq!(right, FlatNode::leaf(2.0));
        assert_eq!(root.right_offset, tree.node_count() - 1);
    }

    #[test]
    fn test_leaves_are_marked() {
        let x = Tensor::from_vec2d(&[
            vec![0.0, 3.0],
            vec![1.0, 1.0],
            vec![2.0, 4.0],
            vec![3.0, 1.0],
            vec![4.0, 5.0],
            vec![5.0, 9.0],
        ])
        .unwrap();
        let y = Tensor::from_slice(&[0.0, 0.0, 1.0, 0.0, 1.0, 1.0]);
        let tree = build(&x, &y, &TreeParams::default());
        tree.validate().unwrap();
        for node in tree.nodes() {
            if node.is_leaf() {
                assert_eq!(node.feature_index, LEAF);
                assert_eq!((node.left_offset, node.right_offset), (0, 0));
            } else {
                assert!(node.left_offset >= 1 && node.right_offset > node.left_offset);
            }
        }
    }

    #[test]
    fn test_max_depth_zero_is_a_single_leaf() {
        let x = Tensor::new(vec![1.0, 2.0, 3.0], vec![3, 1]).unwrap();
        let y = Tensor::from_slice(&[1.0, 0.0, 1.0]);
        let params = TreeParams::default().set_max_depth(Some(0));
        let tree = build(&x, &y, &params);
        assert_eq!(tree.nodes(), &[FlatNode::leaf(1.0)]);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_duplicate_rows_become_a_leaf() {
        let x = Tensor::new(vec![2.0, 2.0, 2.0], vec![3, 1]).unwrap();
        let y = Tensor::from_slice(&[1.0, 0.0, 0.0]);
        let tree = build(&x, &y, &TreeParams::default());
        assert_eq!(tree.nodes(), &[FlatNode::leaf(0.0)]);
    }

    #[test]
    fn test_falls_back_to_next_feature() {
        // Feature 1 correlates perfectly but its median puts every row left.
        let x = Tensor::from_vec2d(&[
            vec![1.0, 0.0],
            vec![2.0, 10.0],
            vec![3.0, 10.0],
            vec![4.0, 10.0],
        ])
        .unwrap();
        let y = Tensor::from_slice(&[1.0, 0.0, 0.0, 0.0]);
        let tree = build(&x, &y, &TreeParams::default());
        assert_eq!(tree.nodes()[0].feature_index, 0);
        tree.validate().unwrap();
    }

    #[test]
    fn test_constant_column_is_passed_over() {
        // XOR of columns 1 and 2; every |r| is zero so column 0 is tried first
        let x = Tensor::from_vec2d(&[
            vec![5.0, 0.0, 0.0],
            vec![5.0, 0.0, 1.0],
            vec![5.0, 1.0, 0.0],
            vec![5.0, 1.0, 1.0],
        ])
        .unwrap();
        let y = Tensor::from_slice(&[0.0, 1.0, 1.0, 0.0]);
        let tree = build(&x, &y, &TreeParams::default());
        tree.validate().unwrap();

        assert_eq!(tree.node_count(), 7);
        assert_eq!(tree.predict_batch(&x).unwrap(), y);
        assert!(tree.nodes().iter().all(|node| node.feature_index != 0));
    }

    #[test]
    fn test_validate_rejects_unreachable_rows() {
        let mut tree = build(
            &Tensor::new(vec![1.0, 2.0], vec![2, 1]).unwrap(),
            &Tensor::from_slice(&[0.0, 1.0]),
            &TreeParams::default(),
        );
        tree.nodes.push(FlatNode::leaf(3.0));
        assert!(tree.validate().is_err());
    }

    #[test]
    fn test_empty_input() {
        let x: Tensor<f64> = Tensor::zeros(vec![0, 2]);
        let y: Tensor<f64> = Tensor::zeros(vec![0]);
        let params = TreeParams::default();
        let err = CorrelationTreeBuilder::new(&params).build(&x, &y).unwrap_err();
        assert_eq!(err, TensorError::EmptyTensor);
    }
}
