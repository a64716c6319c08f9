use crate::dtype::Float;
use crate::error::{TensorError, TensorResult};
use crate::shape::Shape;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Row-major numeric array.
///
/// Estimators take feature matrices as `[samples, features]` and labels as
/// `[samples]`. Fitted weights are stored the same way, so a `Tensor`
/// serializes together with the model that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct Tensor<T: Float> {
    data: Vec<T>,
    shape: Shape,
}

impl<T: Float> Tensor<T> {
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> TensorResult<Self> {
        let shape = Shape::new(shape);
        if data.len() != shape.numel() {
            return Err(TensorError::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }
        Ok(Tensor { data, shape })
    }

    pub fn full(shape: Vec<usize>, value: T) -> Self {
        let shape = Shape::new(shape);
        Tensor {
            data: vec![value; shape.numel()],
            shape,
        }
    }

    pub fn zeros(shape: Vec<usize>) -> Self {
        Self::full(shape, T::ZERO)
    }

    pub fn ones(shape: Vec<usize>) -> Self {
        Self::full(shape, T::ONE)
    }

    pub fn from_slice(data: &[T]) -> Self {
        Tensor {
            data: data.to_vec(),
            shape: Shape::new(vec![data.len()]),
        }
    }

    /// Stack equally wide rows into a matrix. No rows gives a `[0, 0]` matrix.
    pub fn from_vec2d(rows: &[Vec<T>]) -> TensorResult<Self> {
        let width = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * width);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(TensorError::InvalidOperation(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
            data.extend_from_slice(row);
        }
        Tensor::new(data, vec![rows.len(), width])
    }

    pub fn eye(n: usize) -> Self {
        let mut out = Self::zeros(vec![n, n]);
        for i in 0..n {
            out.data[i * n + i] = T::ONE;
        }
        out
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_vec(&self) -> Vec<usize> {
        self.shape.to_vec()
    }

    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    fn offset(&self, index: &[usize]) -> TensorResult<usize> {
        if index.len() != self.ndim() {
            return Err(TensorError::DimensionMismatch(format!(
                "index has {} components for a rank-{} tensor",
                index.len(),
                self.ndim()
            )));
        }
        let mut offset = 0;
        for (axis, (&i, &size)) in index.iter().zip(self.shape.dims()).enumerate() {
            if i >= size {
                return Err(TensorError::IndexOutOfBounds { index: i, axis, size });
            }
            offset = offset * size + i;
        }
        Ok(offset)
    }

    pub fn get(&self, index: &[usize]) -> TensorResult<T> {
        Ok(self.data[self.offset(index)?])
    }

    pub fn set(&mut self, index: &[usize], value: T) -> TensorResult<()> {
        let at = self.offset(index)?;
        self.data[at] = value;
        Ok(())
    }

    /// Row `i` of a matrix, borrowed.
    pub fn row_slice(&self, i: usize) -> TensorResult<&[T]> {
        let (rows, cols) = self.shape.matrix()?;
        if i >= rows {
            return Err(TensorError::IndexOutOfBounds {
                index: i,
                axis: 0,
                size: rows,
            });
        }
        Ok(&self.data[i * cols..(i + 1) * cols])
    }

    /// Column `j` of a matrix, copied into a vector.
    pub fn col(&self, j: usize) -> TensorResult<Tensor<T>> {
        let (_, cols) = self.shape.matrix()?;
        if j >= cols {
            return Err(TensorError::IndexOutOfBounds {
                index: j,
                axis: 1,
                size: cols,
            });
        }
        let data: Vec<T> = self.data.iter().skip(j).step_by(cols).copied().collect();
        Ok(Tensor::from_slice(&data))
    }

    /// Rows of a matrix (or elements of a vector) at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> TensorResult<Tensor<T>> {
        let rows = self.shape.dim(0)?;
        let width = self.shape.row_width();
        let mut data = Vec::with_capacity(indices.len() * width);
        for &i in indices {
            if i >= rows {
                return Err(TensorError::IndexOutOfBounds {
                    index: i,
                    axis: 0,
                    size: rows,
                });
            }
            data.extend_from_slice(&self.data[i * width..(i + 1) * width]);
        }
        let mut dims = self.shape_vec();
        dims[0] = indices.len();
        Tensor::new(data, dims)
    }

    pub fn reshape(&self, shape: Vec<usize>) -> TensorResult<Tensor<T>> {
        let shape = Shape::new(shape);
        if shape.numel() != self.numel() {
            return Err(TensorError::ShapeMismatch {
                expected: shape.to_vec(),
                got: self.shape_vec(),
            });
        }
        Ok(Tensor {
            data: self.data.clone(),
            shape,
        })
    }

    /// Matrix transpose.
    pub fn t(&self) -> TensorResult<Tensor<T>> {
        let (rows, cols) = self.shape.matrix()?;
        let mut data = Vec::with_capacity(self.numel());
        for j in 0..cols {
            data.extend((0..rows).map(|i| self.data[i * cols + j]));
        }
        Tensor::new(data, vec![cols, rows])
    }

    /// Place matrices with the same row count side by side.
    pub fn hstack(blocks: &[&Tensor<T>]) -> TensorResult<Tensor<T>> {
        let first = blocks.first().ok_or(TensorError::EmptyTensor)?;
        let (rows, _) = first.shape.matrix()?;
        let mut width = 0;
        for block in blocks {
            let (r, c) = block.shape.matrix()?;
            if r != rows {
                return Err(TensorError::DimensionMismatch(format!(
                    "hstack: block has {} rows, expected {}",
                    r, rows
                )));
            }
            width += c;
        }

        let mut data = Vec::with_capacity(rows * width);
        for i in 0..rows {
            for block in blocks {
                data.extend_from_slice(block.row_slice(i)?);
            }
        }
        Tensor::new(data, vec![rows, width])
    }

    /// Apply `f` to every element.
    pub fn map<F: Fn(T) -> T>(&self, f: F) -> Tensor<T> {
        Tensor {
            data: self.data.iter().map(|&v| f(v)).collect(),
            shape: self.shape.clone(),
        }
    }

    /// Per-column mean of a matrix.
    pub fn column_mean(&self) -> TensorResult<Tensor<T>> {
        let (rows, cols) = self.shape.matrix()?;
        if rows == 0 {
            return Err(TensorError::EmptyTensor);
        }
        let mut sums = vec![T::ZERO; cols];
        for row in self.data.chunks_exact(cols.max(1)) {
            for (s, &v) in sums.iter_mut().zip(row) {
                *s += v;
            }
        }
        let n = T::from_usize(rows);
        Ok(Tensor::from_slice(&sums).map(|s| s / n))
    }

    /// Per-column population standard deviation of a matrix.
    pub fn column_std(&self) -> TensorResult<Tensor<T>> {
        let mean = self.column_mean()?;
        let (rows, cols) = self.shape.matrix()?;
        let mut sq = vec![T::ZERO; cols];
        for row in self.data.chunks_exact(cols.max(1)) {
            for ((acc, &v), &m) in sq.iter_mut().zip(row).zip(mean.data()) {
                let d = v - m;
                *acc += d * d;
            }
        }
        let n = T::from_usize(rows);
        Ok(Tensor::from_slice(&sq).map(|s| (s / n).sqrt()))
    }

    pub fn matmul(&self, other: &Tensor<T>) -> TensorResult<Tensor<T>> {
        let (m, k) = self.shape.matrix()?;
        let (k2, n) = other.shape.matrix()?;
        if k != k2 {
            return Err(TensorError::DimensionMismatch(format!(
                "cannot multiply [{}, {}] by [{}, {}]",
                m, k, k2, n
            )));
        }
        let mut out = vec![T::ZERO; m * n];
        for (i, out_row) in out.chunks_exact_mut(n.max(1)).enumerate().take(m) {
            for p in 0..k {
                let a = self.data[i * k + p];
                let b_row = &other.data[p * n..(p + 1) * n];
                for (o, &b) in out_row.iter_mut().zip(b_row) {
                    *o += a * b;
                }
            }
        }
        Tensor::new(out, vec![m, n])
    }
}

impl<T: Float> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SHOWN: usize = 8;
        write!(f, "Tensor{}(", self.shape)?;
        for (i, v) in self.data.iter().take(SHOWN).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.4}", v)?;
        }
        if self.numel() > SHOWN {
            write!(f, ", ...")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn m(rows: &[&[f64]]) -> Tensor<f64> {
        let rows: Vec<Vec<f64>> = rows.iter().map(|r| r.to_vec()).collect();
        Tensor::from_vec2d(&rows).unwrap()
    }

    #[test]
    fn test_construction_checks_length() {
        let z: Tensor<f64> = Tensor::zeros(vec![2, 3]);
        assert_eq!(z.numel(), 6);
        assert!(z.data().iter().all(|&v| v == 0.0));
        assert_eq!(
            Tensor::<f64>::new(vec![1.0, 2.0], vec![3]),
            Err(TensorError::ShapeMismatch { expected: vec![3], got: vec![2] })
        );
        assert_eq!(Tensor::<f64>::eye(2).data(), &[1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_from_vec2d() {
        let x = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        assert_eq!(x.shape_vec(), vec![2, 2]);
        assert_eq!(x.get(&[1, 0]).unwrap(), 3.0);
        assert!(Tensor::<f64>::from_vec2d(&[vec![1.0, 2.0], vec![3.0]]).is_err());
        assert_eq!(Tensor::<f64>::from_vec2d(&[]).unwrap().shape_vec(), vec![0, 0]);
    }

    #[test]
    fn test_indexing_errors() {
        let mut x = m(&[&[1.0, 2.0, 3.0]]);
        x.set(&[0, 2], 9.0).unwrap();
        assert_eq!(x.data(), &[1.0, 2.0, 9.0]);
        assert_eq!(
            x.get(&[0, 3]),
            Err(TensorError::IndexOutOfBounds { index: 3, axis: 1, size: 3 })
        );
        assert!(matches!(x.get(&[0]), Err(TensorError::DimensionMismatch(_))));
    }

    #[test]
    fn test_rows_and_columns() {
        let x = m(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]);
        assert_eq!(x.row_slice(1).unwrap(), &[3.0, 4.0]);
        assert!(x.row_slice(3).is_err());
        assert_eq!(x.col(1).unwrap().data(), &[2.0, 4.0, 6.0]);

        let picked = x.select_rows(&[2, 0, 2]).unwrap();
        assert_eq!(picked.shape_vec(), vec![3, 2]);
        assert_eq!(picked.data(), &[5.0, 6.0, 1.0, 2.0, 5.0, 6.0]);

        let y = Tensor::from_slice(&[0.0, 1.0, 2.0]);
        assert_eq!(y.select_rows(&[1]).unwrap().data(), &[1.0]);
        assert!(y.row_slice(0).is_err());
    }

    #[test]
    fn test_matmul_and_transpose() {
        let a = m(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let b = m(&[&[7.0, 8.0], &[9.0, 10.0], &[11.0, 12.0]]);
        assert_eq!(a.matmul(&b).unwrap().data(), &[58.0, 64.0, 139.0, 154.0]);
        assert!(a.matmul(&a).is_err());

        let at = a.t().unwrap();
        assert_eq!(at.shape_vec(), vec![3, 2]);
        assert_eq!(at.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_hstack_prepends_bias_column() {
        let x = m(&[&[2.0, 3.0], &[4.0, 5.0]]);
        let aug = Tensor::hstack(&[&Tensor::ones(vec![2, 1]), &x]).unwrap();
        assert_eq!(aug.shape_vec(), vec![2, 3]);
        assert_eq!(aug.data(), &[1.0, 2.0, 3.0, 1.0, 4.0, 5.0]);
        assert!(Tensor::hstack(&[&x, &Tensor::ones(vec![3, 1])]).is_err());
    }

    #[test]
    fn test_column_statistics() {
        let x = m(&[&[1.0, 10.0], &[3.0, 10.0]]);
        assert_eq!(x.column_mean().unwrap().data(), &[2.0, 10.0]);
        let std = x.column_std().unwrap();
        assert_abs_diff_eq!(std.data()[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(std.data()[1], 0.0, epsilon = 1e-12);
        assert_eq!(
            Tensor::<f64>::zeros(vec![0, 2]).column_mean(),
            Err(TensorError::EmptyTensor)
        );
    }

    #[test]
    fn test_display_truncates() {
        let v = Tensor::from_slice(&[0.0; 10]);
        let s = v.to_string();
        assert!(s.starts_with("Tensor[10]("));
        assert!(s.ends_with(", ...)"));
    }
}
