// In crates/store/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to serialize {path}: {source}")]
    SerializeFailed {
        path: String,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
