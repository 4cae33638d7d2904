//! Migration error types

use thiserror::Error;

/// Errors raised while upgrading persisted resource state
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("required field `{0}` is missing from the stored state")]
    MissingField(String),

    #[error("field `{field}` has the wrong shape: expected {expected}")]
    InvalidField { field: String, expected: &'static str },

    #[error("expected {expected} segments in the ID `{id}` but got {got}")]
    InvalidIdSegments {
        id: String,
        expected: usize,
        got: usize,
    },

    #[error("state version {version} is outside the supported range {oldest}..={current}")]
    UnsupportedVersion {
        version: u32,
        oldest: u32,
        current: u32,
    },

    #[error("stored state could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MigrationError>;
