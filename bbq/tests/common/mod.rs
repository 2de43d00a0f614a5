//! In-memory record source for driving the event pump without a kernel

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aya::maps::MapError;
use bbq::{OpenError, ReadError, ReaderCloser, Record, RecordReader, RecordSource};
use bbq_common::Event;
use tokio::sync::mpsc;

pub const WITHIN: Duration = Duration::from_secs(2);

/// Producer half: pushes records (or read faults) to the reader
pub struct Producer {
    tx: mpsc::UnboundedSender<Result<Record, ReadError>>,
    closer: ReaderCloser,
    reads: Arc<AtomicUsize>,
    alive: Arc<()>,
}

pub struct MemorySource {
    rx: mpsc::UnboundedReceiver<Result<Record, ReadError>>,
    closer: ReaderCloser,
    reads: Arc<AtomicUsize>,
    alive: Arc<()>,
}

pub struct MemoryReader {
    rx: mpsc::UnboundedReceiver<Result<Record, ReadError>>,
    closer: ReaderCloser,
    reads: Arc<AtomicUsize>,
    _alive: Arc<()>,
}

pub fn memory_source() -> (Producer, MemorySource) {
    let (tx, rx) = mpsc::unbounded_channel();
    let closer = ReaderCloser::new();
    let reads = Arc::new(AtomicUsize::new(0));
    let alive = Arc::new(());
    (
        Producer { tx, closer: closer.clone(), reads: reads.clone(), alive: alive.clone() },
        MemorySource { rx, closer, reads, alive },
    )
}

impl Producer {
    pub fn emit(&self, raw: impl Into<Record>) {
        self.tx.send(Ok(raw.into())).unwrap();
    }

    pub fn emit_event(&self, magic: u64) {
        self.emit(encode(Event::new(magic)));
    }

    pub fn fail(&self, err: std::io::Error) {
        self.tx.send(Err(ReadError::Io(err))).unwrap();
    }

    /// Close the reader from outside the pump
    pub fn close_reader(&self) {
        let _ = self.closer.close();
    }

    pub fn reader_closed(&self) -> bool {
        self.closer.is_closed()
    }

    /// Records handed to the pump so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Whether the reader (or the unopened source) still exists
    pub fn reader_alive(&self) -> bool {
        Arc::strong_count(&self.alive) > 1
    }

    /// Wait until the pump picked up `n` records
    pub async fn wait_for_reads(&self, n: usize) {
        tokio::time::timeout(WITHIN, async {
            while self.reads() < n {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("event pump did not read the records");
    }

    /// Wait until the reader was dropped by the pump
    pub async fn wait_reader_dropped(&self) {
        tokio::time::timeout(WITHIN, async {
            while self.reader_alive() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("event pump still holds the reader");
    }
}

impl RecordSource for MemorySource {
    type Reader = MemoryReader;

    fn open(self) -> Result<MemoryReader, OpenError> {
        Ok(MemoryReader { rx: self.rx, closer: self.closer, reads: self.reads, _alive: self.alive })
    }
}

impl RecordReader for MemoryReader {
    async fn read(&mut self) -> Result<Record, ReadError> {
        if self.closer.is_closed() {
            return Err(ReadError::Closed);
        }

        tokio::select! {
            biased;
            () = self.closer.closed() => Err(ReadError::Closed),
            next = self.rx.recv() => match next {
                Some(record) => {
                    self.reads.fetch_add(1, Ordering::SeqCst);
                    record
                }
                // Producer gone: like an idle ring buffer, wait for close
                None => {
                    self.closer.closed().await;
                    Err(ReadError::Closed)
                }
            },
        }
    }

    fn closer(&self) -> ReaderCloser {
        self.closer.clone()
    }
}

/// A source that is not a ring buffer
pub struct HashMapSource {
    pub alive: Arc<()>,
}

impl RecordSource for HashMapSource {
    type Reader = MemoryReader;

    fn open(self) -> Result<MemoryReader, OpenError> {
        // BPF_MAP_TYPE_HASH
        Err(MapError::InvalidMapType { map_type: 1 }.into())
    }
}

pub fn encode(event: Event) -> Vec<u8> {
    let mut raw = event.magic.to_ne_bytes().to_vec();
    raw.extend_from_slice(&event.inverse_magic.to_ne_bytes());
    raw
}
