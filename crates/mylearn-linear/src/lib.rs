pub mod regression;
pub mod sgd;

pub use regression::*;
pub use sgd::*;
