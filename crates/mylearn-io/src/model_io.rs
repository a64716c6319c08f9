use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::ModelIoError;

/// JSON persistence for anything serde can round-trip, such as fitted
/// estimators, tree encodings or their parameters.
pub trait ModelIo: Serialize + DeserializeOwned + Sized {
    fn json_dump(&self) -> Result<String, ModelIoError> {
        Ok(serde_json::to_string(self)?)
    }

    fn from_json(json: &str) -> Result<Self, ModelIoError> {
        Ok(serde_json::from_str(json)?)
    }

    fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelIoError> {
        save_model(self, path)
    }

    fn load_model<P: AsRef<Path>>(path: P) -> Result<Self, ModelIoError> {
        load_model(path)
    }
}

impl<M: Serialize + DeserializeOwned> ModelIo for M {}

/// Write `model` to `path` as pretty-printed JSON.
pub fn save_model<M: Serialize, P: AsRef<Path>>(model: &M, path: P) -> Result<(), ModelIoError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(model)?;
    fs::write(path, json).map_err(|e| ModelIoError::UnableToWrite {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Read a model previously written by [`save_model`].
pub fn load_model<M: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<M, ModelIoError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| ModelIoError::UnableToRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(serde_json::from_str(&json)?)
}
