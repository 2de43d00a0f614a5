//! Ring buffer reader backed by epoll readiness
//!
//! The ring buffer fd becomes readable when the kernel submits a sample. The
//! reader registers it with the tokio reactor and drains samples one at a time.

use aya::maps::{Map, MapData, RingBuf};
use log::debug;
use tokio::io::unix::AsyncFd;
use tokio::io::Interest;

use super::{ReaderCloser, RecordReader, RecordSource};
use crate::domain::{OpenError, ReadError, Record};

/// [`RecordReader`] over a `BPF_MAP_TYPE_RINGBUF` map
pub struct RingBufReader {
    ring_buf: AsyncFd<RingBuf<MapData>>,
    closer: ReaderCloser,
}

impl RingBufReader {
    /// Register the ring buffer with the current tokio reactor
    ///
    /// # Errors
    /// Returns an error if there is no reactor or the fd cannot be registered
    pub fn new(ring_buf: RingBuf<MapData>) -> Result<Self, OpenError> {
        let ring_buf = AsyncFd::with_interest(ring_buf, Interest::READABLE)?;
        Ok(Self { ring_buf, closer: ReaderCloser::new() })
    }
}

impl RecordReader for RingBufReader {
    async fn read(&mut self) -> Result<Record, ReadError> {
        loop {
            if self.closer.is_closed() {
                return Err(ReadError::Closed);
            }

            let mut guard = tokio::select! {
                biased;
                () = self.closer.closed() => return Err(ReadError::Closed),
                ready = self.ring_buf.readable_mut() => match ready {
                    Ok(guard) => guard,
                    Err(e) => return Err(readiness_failed(&self.closer, e)),
                },
            };

            if let Some(item) = guard.get_inner_mut().next() {
                return Ok(Record::from(&*item));
            }

            // Drained: wait for the next epoll notification
            guard.clear_ready();
        }
    }

    fn closer(&self) -> ReaderCloser {
        self.closer.clone()
    }
}

/// Readiness errors mean the fd is no longer registered with a live reactor
/// and would fail again on every retry: report the error once and close.
fn readiness_failed(closer: &ReaderCloser, err: std::io::Error) -> ReadError {
    debug!("Ring buffer readiness failed, closing reader: {err}");
    let _ = closer.close();
    ReadError::Io(err)
}

impl RecordSource for RingBuf<MapData> {
    type Reader = RingBufReader;

    fn open(self) -> Result<RingBufReader, OpenError> {
        RingBufReader::new(self)
    }
}

impl RecordSource for Map {
    type Reader = RingBufReader;

    /// Fails with [`OpenError::Map`] unless the map is a ring buffer
    fn open(self) -> Result<RingBufReader, OpenError> {
        let ring_buf = RingBuf::try_from(self).inspect_err(|e| {
            debug!("Refusing to read records from map: {e}");
        })?;
        RingBufReader::new(ring_buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_failure_closes_reader() {
        let closer = ReaderCloser::new();
        let err = readiness_failed(&closer, std::io::Error::other("reactor gone"));

        assert!(matches!(err, ReadError::Io(_)));
        assert!(err.to_string().contains("reactor gone"));
        assert!(closer.is_closed(), "next read must report closed");
    }

    #[test]
    fn test_readiness_failure_after_close() {
        let closer = ReaderCloser::new();
        closer.close().unwrap();
        let err = readiness_failed(&closer, std::io::Error::other("late"));
        assert!(matches!(err, ReadError::Io(_)));
        assert!(closer.is_closed());
    }
}
