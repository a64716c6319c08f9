use mylearn_core::error::TensorResult;
use mylearn_core::{Float, Tensor, TensorError};

/// `P·A = L·U` with partial pivoting, stored packed.
///
/// `packed` holds `U` on and above the diagonal and the multipliers of the
/// unit lower-triangular `L` below it. `perm[i]` is the row of `A` that was
/// moved to row `i`.
#[derive(Debug, Clone)]
pub struct LuFactors<T: Float> {
    packed: Vec<T>,
    perm: Vec<usize>,
    n: usize,
}

impl<T: Float> LuFactors<T> {
    /// Factor a square matrix. Fails with `SingularMatrix` as soon as a
    /// column has no usable pivot.
    pub fn factor(a: &Tensor<T>) -> TensorResult<Self> {
        let (n, cols) = a.shape().matrix()?;
        if n != cols {
            return Err(TensorError::InvalidOperation(format!(
                "LU needs a square matrix, got {}",
                a.shape()
            )));
        }
        let mut m = a.data().to_vec();
        let mut perm: Vec<usize> = (0..n).collect();

        for k in 0..n {
            let (pivot_row, pivot_abs) = (k..n)
                .map(|i| (i, m[i * n + k].abs()))
                .fold((k, T::ZERO), |best, cand| if cand.1 > best.1 { cand } else { best });
            if pivot_abs < T::EPSILON {
                return Err(TensorError::SingularMatrix);
            }
            if pivot_row != k {
                // whole rows move: stored multipliers travel with them
                for j in 0..n {
                    m.swap(k * n + j, pivot_row * n + j);
                }
                perm.swap(k, pivot_row);
            }

            let pivot = m[k * n + k];
            for i in (k + 1)..n {
                let factor = m[i * n + k] / pivot;
                m[i * n + k] = factor;
                for j in (k + 1)..n {
                    let d = factor * m[k * n + j];
                    m[i * n + j] -= d;
                }
            }
        }
        Ok(LuFactors { packed: m, perm, n })
    }

    pub fn order(&self) -> usize {
        self.n
    }

    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }

    /// Unit lower-triangular factor.
    pub fn lower(&self) -> TensorResult<Tensor<T>> {
        let n = self.n;
        let data = (0..n * n)
            .map(|idx| match (idx / n, idx % n) {
                (i, j) if i == j => T::ONE,
                (i, j) if i > j => self.packed[idx],
                _ => T::ZERO,
            })
            .collect();
        Tensor::new(data, vec![n, n])
    }

    /// Upper-triangular factor.
    pub fn upper(&self) -> TensorResult<Tensor<T>> {
        let n = self.n;
        let data = (0..n * n)
            .map(|idx| if idx / n <= idx % n { self.packed[idx] } else { T::ZERO })
            .collect();
        Tensor::new(data, vec![n, n])
    }

    /// Solve `A·x = b` for one right-hand side.
    pub fn solve_vec(&self, b: &[T]) -> TensorResult<Vec<T>> {
        let n = self.n;
        if b.len() != n {
            return Err(TensorError::DimensionMismatch(format!(
                "right-hand side has {} entries for a {}x{} system",
                b.len(),
                n,
                n
            )));
        }
        let m = &self.packed;

        // L·y = P·b
        let mut x: Vec<T> = self.perm.iter().map(|&r| b[r]).collect();
        for i in 1..n {
            let acc: T = (0..i).map(|j| m[i * n + j] * x[j]).sum();
            x[i] -= acc;
        }
        // U·x = y
        for i in (0..n).rev() {
            let acc: T = ((i + 1)..n).map(|j| m[i * n + j] * x[j]).sum();
            x[i] = (x[i] - acc) / m[i * n + i];
        }
        Ok(x)
    }

    /// Solve for every column of `b` (`[n]` or `[n, k]`); the result has
    /// the shape of `b`.
    pub fn solve(&self, b: &Tensor<T>) -> TensorResult<Tensor<T>> {
        match b.ndim() {
            1 => Tensor::new(self.solve_vec(b.data())?, vec![self.n]),
            2 => {
                let (rows, k) = b.shape().matrix()?;
                if rows != self.n {
                    return Err(TensorError::DimensionMismatch(format!(
                        "right-hand side has {} rows for a {}x{} system",
                        rows, self.n, self.n
                    )));
                }
                let mut out = vec![T::ZERO; rows * k];
                for c in 0..k {
                    let col = self.solve_vec(b.col(c)?.data())?;
                    for (i, v) in col.into_iter().enumerate() {
                        out[i * k + c] = v;
                    }
                }
                Tensor::new(out, vec![rows, k])
            }
            d => Err(TensorError::InvalidOperation(format!(
                "right-hand side must be a vector or matrix, got rank {}",
                d
            ))),
        }
    }

    pub fn inverse(&self) -> TensorResult<Tensor<T>> {
        self.solve(&Tensor::eye(self.n))
    }
}

/// LU factorization of a square matrix.
pub fn lu<T: Float>(a: &Tensor<T>) -> TensorResult<LuFactors<T>> {
    LuFactors::factor(a)
}

/// Inverse of a square matrix.
pub fn inv<T: Float>(a: &Tensor<T>) -> TensorResult<Tensor<T>> {
    LuFactors::factor(a)?.inverse()
}
