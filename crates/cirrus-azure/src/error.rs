//! Azure provider error types

use thiserror::Error;

/// Errors raised while listing resources from the ARM API
#[derive(Error, Debug)]
pub enum ListError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Request to the ARM API failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("ARM API returned {status}: {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, ListError>;
