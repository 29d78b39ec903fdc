use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid library pattern: {0}")]
    RegexError(#[from] regex::Error),

    /// A single shape record could not be decoded. Callers recover from this
    /// locally and turn it into a diagnostic.
    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Missing expected data for {component}: {what}")]
    MissingData { component: String, what: String },

    #[error("Invalid LCSC component id '{0}' (expected C followed by digits)")]
    InvalidComponentId(String),
}

pub type Result<T> = std::result::Result<T, Error>;
