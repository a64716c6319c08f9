use mylearn_core::error::TensorResult;
use mylearn_core::{Float, Tensor};

use crate::lu::LuFactors;

/// Solve `A·x = b` for a square `A`.
///
/// `b` is either a single right-hand side `[n]` or several stacked as the
/// columns of `[n, k]`.
pub fn solve<T: Float>(a: &Tensor<T>, b: &Tensor<T>) -> TensorResult<Tensor<T>> {
    LuFactors::factor(a)?.solve(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use mylearn_core::TensorError;

    #[test]
    fn test_two_by_two_system() {
        // 2x + y = 5, x + 3y = 7
        let a = Tensor::new(vec![2.0, 1.0, 1.0, 3.0], vec![2, 2]).unwrap();
        let x = solve(&a, &Tensor::from_slice(&[5.0, 7.0])).unwrap();
        assert_abs_diff_eq!(x.data()[0], 1.6, epsilon = 1e-10);
        assert_abs_diff_eq!(x.data()[1], 1.8, epsilon = 1e-10);
    }

    #[test]
    fn test_stacked_right_hand_sides() {
        let a = Tensor::new(
            vec![4.0, -2.0, 1.0, 1.0, 5.0, 2.0, 0.0, 3.0, 6.0],
            vec![3, 3],
        )
        .unwrap();
        let b = Tensor::new(vec![1.0, 0.0, 2.0, 1.0, 3.0, -1.0], vec![3, 2]).unwrap();
        let x = solve(&a, &b).unwrap();
        assert_eq!(x.shape_vec(), vec![3, 2]);
        let back = a.matmul(&x).unwrap();
        for (got, want) in back.data().iter().zip(b.data()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_rhs_length_must_match() {
        let a: Tensor<f64> = Tensor::eye(3);
        let b = Tensor::from_slice(&[1.0, 2.0]);
        assert!(matches!(solve(&a, &b), Err(TensorError::DimensionMismatch(_))));
        let b = Tensor::zeros(vec![2, 2]);
        assert!(matches!(solve(&a, &b), Err(TensorError::DimensionMismatch(_))));
    }
}
