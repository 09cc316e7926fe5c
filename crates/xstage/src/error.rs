//! Error types for xstage operations.
//!
//! This module provides the main error type [`XstageError`] which wraps the
//! error conditions met while loading a document and building its scene.

use std::io;

use thiserror::Error;

use xstage_parser::error::ParseError;

/// The main error type for xstage operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the diagnostics together with the document
/// source, so reporters can point at the offending XML.
#[derive(Debug, Error)]
pub enum XstageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl XstageError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
