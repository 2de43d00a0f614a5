//! # bbq - eBPF ring buffers as async event queues
//!
//! bbq reads fixed-layout records that eBPF programs publish through a
//! `BPF_MAP_TYPE_RINGBUF` map and hands them to application code as typed
//! values on a cancellable queue.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────┐
//! │     eBPF program (kernel)    │  bpf_ringbuf_reserve / submit
//! └──────────────┬───────────────┘
//!                │ raw records
//!                ▼
//! ┌──────────────────────────────┐     ┌──────────────────────────┐
//! │  RingBufReader (AsyncFd)     │◀────│  cancellation watcher    │
//! │  read() until closed         │close│  token.cancelled()       │
//! └──────────────┬───────────────┘     └──────────────────────────┘
//!                │ Record
//!                ▼
//! ┌──────────────────────────────┐     ┌──────────────────────────┐
//! │  decode-and-forward loop     │────▶│  error sink (optional)   │
//! │  decode::<T>, send ⟷ cancel  │     └──────────────────────────┘
//! └──────────────┬───────────────┘
//!                │ T
//!                ▼
//!          EventQueue<T>
//! ```
//!
//! ## Module Structure
//!
//! - [`pump`]: [`new`], [`Options`], [`EventQueue`] and record decoding
//! - [`reader`]: the record source contract and the ring buffer reader
//! - [`domain`]: raw records and error types
//! - [`loader`]: loading the bundled `emit` test producer and attaching it
//! - [`preflight`]: privilege and kernel checks for the demo binary
//! - [`cli`]: demo binary arguments
//!
//! ## Typical Usage
//!
//! ```bash
//! cargo xtask build-ebpf
//! cargo build && sudo ./target/debug/bbq --magic 42 --magic 123 --magic 666
//! ```

pub mod cli;
pub mod domain;
pub mod loader;
pub mod preflight;
pub mod pump;
pub mod reader;

pub use domain::{DecodeError, Error, OpenError, PumpError, ReadError, Record};
pub use pump::{decode, new, EventQueue, Options, TryRecvError};
pub use reader::{ReaderCloser, RecordReader, RecordSource, RingBufReader};
