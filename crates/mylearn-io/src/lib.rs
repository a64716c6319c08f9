pub mod errors;
pub mod model_io;

pub use errors::ModelIoError;
pub use model_io::{load_model, save_model, ModelIo};
