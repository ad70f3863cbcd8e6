//! Error types for iocscan

use std::path::PathBuf;
use thiserror::Error;

/// iocscan error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to walk {}: {message}", .path.display())]
    Walk { path: PathBuf, message: String },

    #[error("Front end error: {0}")]
    Frontend(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid config file {}: {source}", .path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Result type alias for iocscan
pub type Result<T> = std::result::Result<T, Error>;
