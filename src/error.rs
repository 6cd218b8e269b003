use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SampleDataError {
    #[error("invalid dataset variant: {0}")]
    #[diagnostic(help("expected one of: full, reduced"))]
    InvalidVariant(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("download request failed: {0}")]
    Http(String),

    #[error("remote returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("failed to load sample: {0}")]
    Load(String),
}
