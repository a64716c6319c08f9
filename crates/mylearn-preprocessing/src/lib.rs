pub mod scaler;
pub mod split;

pub use scaler::StandardScaler;
pub use split::{train_test_split, TrainTestSplit};
