// In crates/indicators/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("not enough bars: have {have}, need {need}")]
    InsufficientData { have: usize, need: usize },

    #[error("malformed bar at open_time {open_time}")]
    MalformedBar { open_time: i64 },
}

pub type Result<T> = std::result::Result<T, Error>;
