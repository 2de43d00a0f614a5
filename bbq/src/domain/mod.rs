//! Domain model for bbq
//!
//! Raw ring buffer records and the error types shared by the reader and the
//! event pump.

pub mod errors;
pub mod types;

pub use errors::{DecodeError, Error, OpenError, PumpError, ReadError};
pub use types::Record;
