use thiserror::Error;

/// Failures raised by the path resolver and the stores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NfsError {
    #[error(
        "Invalid {field} '{}': expected one of app, drive",
        .value.as_deref().unwrap_or("")
    )]
    InvalidRootPath { field: &'static str, value: Option<String> },

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("File already exists: {0}")]
    FileAlreadyExists(String),

    #[error("Directory already exists: {0}")]
    DirectoryAlreadyExists(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Content missing for file: {0}")]
    MissingContent(String),
}

pub type NfsResult<T> = std::result::Result<T, NfsError>;
