//! Error types for dirtco

use thiserror::Error;

/// Errors raised by the pricing, scheduling and scoring engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuoteError {
    /// Unknown categorical key, or a numeric input outside its domain
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Unsupported job type: {0}")]
    UnsupportedJobType(String),

    /// Final price is zero or negative, so the margin is undefined
    #[error("Degenerate quote: final price {final_price} leaves margin undefined")]
    DegenerateQuote { final_price: i64 },
}

impl QuoteError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        QuoteError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Quote error: {0}")]
    Quote(#[from] QuoteError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record already exists: {0}")]
    Duplicate(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Excel export error: {0}")]
    Excel(String),
}

pub type Result<T> = std::result::Result<T, Error>;
