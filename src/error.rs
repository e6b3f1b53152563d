//! Error types for supercheck

use thiserror::Error;

/// Main error type for supercheck operations
#[derive(Error, Debug)]
pub enum SuperCheckError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("{path}: SyntaxError: {message}")]
    ParseFailure { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for supercheck operations
pub type Result<T> = std::result::Result<T, SuperCheckError>;
