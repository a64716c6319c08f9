//! # mylearn
//!
//! Small machine learning estimators written from scratch in Rust.
//!
//! ## Modules
//!
//! - **core**: `Tensor`, the `Float` scalar trait, `TensorError` and the `Estimator` trait
//! - **linalg**: LU decomposition, matrix inverse, linear solves
//! - **linear**: OLS `LinearRegression`, `SGDRegressor` with optional L2, `Ridge`
//! - **naive_bayes**: `BernoulliNB`, `MultinomialNB`
//! - **tree**: `DecisionTree` with correlation/median or information-gain splits
//! - **metrics**: `mse`, `rmse`, `r2_score`, `accuracy`, `confusion_matrix`
//! - **preprocessing**: `StandardScaler`, `train_test_split`
//! - **datasets**: Iris subset, `make_blobs`, `make_regression`
//! - **io**: JSON save/load for fitted models

/// Core tensor engine.
pub use mylearn_core as core;

/// Linear algebra operations.
pub use mylearn_linalg as linalg;

/// Linear models.
pub use mylearn_linear as linear;

/// Naive Bayes classifiers.
pub use mylearn_naive_bayes as naive_bayes;

/// Decision trees.
pub use mylearn_tree as tree;

/// Evaluation metrics.
pub use mylearn_metrics as metrics;

/// Data preprocessing.
pub use mylearn_preprocessing as preprocessing;

/// Built-in datasets.
pub use mylearn_datasets as datasets;

/// Model persistence.
pub use mylearn_io as io;

/// The types most programs need.
pub mod prelude {
    pub use mylearn_core::error::TensorResult;
    pub use mylearn_core::{Estimator, Float, Tensor, TensorError};
    pub use mylearn_io::ModelIo;
    pub use mylearn_linear::{LinearModel, LinearRegression, Penalty, Ridge, SGDRegressor};
    pub use mylearn_naive_bayes::{BernoulliNB, MultinomialNB};
    pub use mylearn_tree::{Criterion, DecisionTree, TreeParams, TreeQuery};
}
