pub mod builtin;

pub use builtin::{load_iris, make_blobs, make_regression};
