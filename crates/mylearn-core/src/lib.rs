//! Shared building blocks for the mylearn estimators: the [`Float`] element
//! trait, the row-major [`Tensor`], the [`TensorError`] type and the
//! [`Estimator`] fit/predict contract.

pub mod dtype;
pub mod error;
pub mod estimator;
pub mod shape;
pub mod tensor;

pub use dtype::Float;
pub use error::{TensorError, TensorResult};
pub use estimator::Estimator;
pub use shape::Shape;
pub use tensor::Tensor;
