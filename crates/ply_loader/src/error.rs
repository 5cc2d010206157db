//! Errors that abort a PLY parse.
//!
//! Only fatal conditions live here. An unsupported (binary) format and
//! unparsable numeric tokens degrade gracefully instead of failing.

use thiserror::Error;

/// Errors that can occur while parsing an ASCII PLY file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlyError {
    #[error("Malformed header at line {line}: {message}")]
    MalformedHeader { line: usize, message: String },

    #[error("Header is not terminated by an end_header line")]
    MissingEndHeader,

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Missing required vertex property: {0}")]
    MissingProperty(String),

    #[error("Unexpected end of file at line {line} ({expected_rows} rows declared)")]
    UnexpectedEof { line: usize, expected_rows: usize },
}

impl PlyError {
    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedHeader {
            line,
            message: message.into(),
        }
    }
}

/// Result type for PLY parsing operations.
pub type PlyResult<T> = Result<T, PlyError>;
