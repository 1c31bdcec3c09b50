// In crates/notifier/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Telegram rejected the message: {status}")]
    Rejected { status: u16 },
}

pub type Result<T> = std::result::Result<T, Error>;
