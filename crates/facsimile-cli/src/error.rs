//! Errors reported by the command-line tool.

use std::io;

use thiserror::Error;

use facsimile::CopyPasteError;
use facsimile_core::DiagramError;

use crate::config::ConfigError;

/// The error type of [`crate::run`].
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The input is not a valid diagram file.
    #[error("Invalid diagram file '{path}': {message}")]
    Format {
        path: String,
        message: String,
        span: Option<std::ops::Range<usize>>,
        src: String,
    },

    #[error("Failed to write diagram: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Diagram error: {0}")]
    Diagram(#[from] DiagramError),

    #[error("Copy/paste error: {0}")]
    CopyPaste(#[from] CopyPasteError),
}

impl CliError {
    /// Builds a [`CliError::Format`] from a TOML parse error of `src`.
    pub fn format(path: impl Into<String>, src: impl Into<String>, err: &toml::de::Error) -> Self {
        Self::Format {
            path: path.into(),
            message: err.message().to_string(),
            span: err.span(),
            src: src.into(),
        }
    }
}
