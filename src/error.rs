//! Error types for dictionary operations.

use std::io;
use thiserror::Error;

/// Errors surfaced by dictionary operations.
///
/// Lookups never fail for "key not found"; that case is `Ok(None)`. Errors
/// here are lifecycle misuse, malformed packed buffers, or filesystem
/// failures during save/load.
#[derive(Error, Debug)]
pub enum DictError {
    /// An operation was issued in the wrong lifecycle phase, e.g. a lookup
    /// before `compile` or an insert after it.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// The packed buffer is malformed: an offset or length runs past the
    /// end, a VInt overruns 5 bytes, or a node record is inconsistent.
    #[error("corrupt dictionary buffer: {0}")]
    Corrupt(String),

    /// I/O failure while saving or loading a packed buffer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DictError>;
