//! # Record Sources and Readers
//!
//! The contract between the event pump and whatever produces raw records.
//!
//! - [`RecordSource`] - something that can be opened as a reader; opening
//!   fails when the source has an incompatible shape (e.g. a hash map)
//! - [`RecordReader`] - waits for the next record until closed
//! - [`ReaderCloser`] - idempotent handle that unblocks a waiting reader
//!
//! [`RingBufReader`] implements the contract for `BPF_MAP_TYPE_RINGBUF` maps.

mod ring_buf;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::domain::{OpenError, ReadError, Record};

pub use ring_buf::RingBufReader;

/// A producer of raw records that can be opened for reading
pub trait RecordSource {
    type Reader: RecordReader;

    /// Open a reader over this source
    ///
    /// # Errors
    /// Returns an error if the source cannot be read as a stream of records
    fn open(self) -> Result<Self::Reader, OpenError>;
}

/// Reads records one at a time
pub trait RecordReader: Send + 'static {
    /// Wait for the next record
    ///
    /// Resolves with [`ReadError::Closed`] once [`ReaderCloser::close`] has been
    /// called on this reader's closer, including while a read is pending.
    fn read(&mut self) -> impl Future<Output = Result<Record, ReadError>> + Send;

    /// Handle that closes this reader from another task
    fn closer(&self) -> ReaderCloser;
}

/// Closes a [`RecordReader`] from outside the task reading it
///
/// Clones share the same state. Closing is one-shot: the first call returns
/// `Ok(())`, every later call returns [`ReadError::Closed`] and has no effect.
#[derive(Clone, Debug, Default)]
pub struct ReaderCloser {
    closed: Arc<AtomicBool>,
    signal: CancellationToken,
}

impl ReaderCloser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the reader, waking a pending read
    ///
    /// # Errors
    /// Returns [`ReadError::Closed`] if the reader was already closed
    pub fn close(&self) -> Result<(), ReadError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(ReadError::Closed);
        }
        self.signal.cancel();
        Ok(())
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Resolves once [`close`](Self::close) has been called
    pub async fn closed(&self) {
        self.signal.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_close_is_one_shot() {
        let closer = ReaderCloser::new();
        assert!(!closer.is_closed());
        assert!(closer.close().is_ok());
        assert!(matches!(closer.close(), Err(ReadError::Closed)));
        assert!(closer.is_closed());
    }

    #[test]
    fn test_clones_share_state() {
        let closer = ReaderCloser::new();
        let other = closer.clone();
        other.close().unwrap();
        assert!(closer.is_closed());
    }

    #[tokio::test]
    async fn test_closed_wakes_waiter() {
        let closer = ReaderCloser::new();
        let waiter = {
            let closer = closer.clone();
            tokio::spawn(async move { closer.closed().await })
        };
        closer.close().unwrap();
        tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .expect("closed() did not resolve")
            .unwrap();
    }
}
