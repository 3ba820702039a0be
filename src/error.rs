use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TagpathError {
    #[error("tagpath error: {0}")]
    Generic(String),
    #[error(transparent)]
    Expected(#[from] TagpathExpectedError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum TagpathExpectedError {
    #[error("{0}")]
    Generic(String),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Invalid placeholder {placeholder:?}: must be non-empty and free of {{ }} / | \\ < : > ? * \"")]
    InvalidPlaceholder { placeholder: String },
    #[error("Configuration file not found ({path})")]
    ConfigNotFound { path: PathBuf },
    #[error("Failed to decode configuration file: invalid TOML: {0}")]
    ConfigDecode(String),
    #[error("{0}")]
    MissingConfigKey(String),
    #[error("{0}")]
    InvalidConfigValue(String),
    #[error("Failed to compile template {key}: {source}")]
    InvalidPathTemplate { key: String, source: TemplateError },
    #[error("Failed to read tags from {path}: {message}")]
    TagRead { path: PathBuf, message: String },
    #[error("Rendered path {path} would leave the destination directory")]
    EscapingPath { path: PathBuf },
}

/// Reasons a pattern fails to compile. Every variant aborts compilation of the current file; no
/// partial output survives. Indices are character offsets into the pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Malformed token: {raw:?} is not a known tag")]
    MalformedToken { raw: String },
    #[error("Unexpected {found:?} at index {index}: no token is open")]
    UnexpectedCloser { index: usize, found: char },
    #[error("Unexpected '{{' at index {index}: a token is already open")]
    NestedOpener { index: usize },
    #[error("Token opened at index {index} is never closed")]
    UnterminatedToken { index: usize },
}

impl From<TemplateError> for TagpathError {
    fn from(err: TemplateError) -> Self {
        TagpathError::Expected(TagpathExpectedError::Template(err))
    }
}

pub type Result<T> = std::result::Result<T, TagpathError>;
