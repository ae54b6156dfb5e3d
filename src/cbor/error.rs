use thiserror::Error;

/// Error type for raw CBOR encoding/decoding operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CborError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected major type")]
    UnexpectedMajor,
    #[error("unexpected minor value")]
    UnexpectedMinor,
    #[error("indefinite-length item")]
    IndefiniteLength,
    #[error("invalid UTF-8 in text string")]
    InvalidUtf8,
    #[error("trailing bytes after top-level item")]
    TrailingBytes,
    #[error("nesting depth limit exceeded")]
    DepthLimit,
}
