pub mod multinomial;

pub use multinomial::*;
