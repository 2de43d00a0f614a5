//! Structured error types for bbq
//!
//! Using thiserror for automatic Display implementation and error chaining.

use aya::maps::MapError;
use thiserror::Error;

/// Failure to construct an event pump
///
/// Returned synchronously by [`crate::new`]; no background task has been
/// started when any of these is returned.
#[derive(Error, Debug)]
pub enum Error {
    #[error("queue capacity must be greater or equal to zero, got {0}")]
    NegativeCapacity(isize),

    #[error("event pump needs a tokio runtime, but none is running")]
    NoRuntime,

    #[error(transparent)]
    Open(#[from] OpenError),
}

/// Failure to open a blocking reader over a record source
#[derive(Error, Debug)]
pub enum OpenError {
    #[error("Failed to open ring buffer map: {0}")]
    Map(#[from] MapError),

    #[error("Failed to register ring buffer with the reactor: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to read the next record
#[derive(Error, Debug)]
pub enum ReadError {
    /// The reader was closed; reads never block or succeed again
    #[error("ring buffer reader closed")]
    Closed,

    #[error("Failed to read from ring buffer: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to decode a record into a fixed-layout event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of input: event needs {needed} bytes, record has {available}")]
    UnexpectedEof { needed: usize, available: usize },
}

/// Per-record fault reported on the optional error sink
#[derive(Error, Debug)]
pub enum PumpError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_capacity_display() {
        let err = Error::NegativeCapacity(-1);
        assert_eq!(err.to_string(), "queue capacity must be greater or equal to zero, got -1");
    }

    #[test]
    fn test_incompatible_map_is_open_error() {
        let err: Error = OpenError::from(MapError::InvalidMapType { map_type: 1 }).into();
        assert!(matches!(err, Error::Open(OpenError::Map(MapError::InvalidMapType { .. }))));
        assert!(err.to_string().starts_with("Failed to open ring buffer map"));
    }

    #[test]
    fn test_decode_error_is_transparent() {
        let err = PumpError::from(DecodeError::UnexpectedEof { needed: 32, available: 16 });
        assert_eq!(
            err.to_string(),
            "unexpected end of input: event needs 32 bytes, record has 16"
        );
    }

    #[test]
    fn test_read_error_from_io() {
        let err = PumpError::from(ReadError::from(std::io::Error::other("boom")));
        assert!(matches!(err, PumpError::Read(ReadError::Io(_))));
        assert!(err.to_string().contains("boom"));
    }
}
