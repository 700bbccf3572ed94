//! Error types shared by every codec in the crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SffError {
    #[error("truncated input: expected {expected} bytes, got {actual}")]
    TruncatedFile { expected: usize, actual: usize },

    #[error("malformed line: {0}")]
    MalformedLine(String),

    #[error("invalid field: {0}")]
    InvalidField(String),

    #[error("trace index {index} out of range for {count} traces")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("cannot determine byte order")]
    UnsupportedByteOrder,

    #[error("unsupported data format code: {0}")]
    UnsupportedFormatVersion(i16),
}

pub type Result<T> = std::result::Result<T, SffError>;
