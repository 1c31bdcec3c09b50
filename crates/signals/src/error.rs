// In crates/signals/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A field the rules depend on is NaN in the snapshot. Callers log this
    /// and treat it as no-signal; the value is never defaulted to 0.
    #[error("missing indicator: {0}")]
    MissingIndicator(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
