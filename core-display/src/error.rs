use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    /// A persisted value that is not one of the four mode names.
    #[error("Unknown display mode: {0:?}")]
    UnknownMode(String),
}

pub type Result<T> = std::result::Result<T, DisplayError>;
