pub mod lu;
pub mod solve;

pub use lu::*;
pub use solve::*;
