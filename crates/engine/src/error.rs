// In crates/engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The ledger already tracks a position for this (symbol, timeframe).
    /// Callers must check before adding; this is never silently overwritten.
    #[error("a position is already open for {key}")]
    DuplicateKey { key: String },
}

pub type Result<T> = std::result::Result<T, Error>;
