//! # Shared Data Structures (eBPF ↔ Userspace)
//!
//! Record layout and map names shared between the `emit` eBPF program and the
//! userspace event pump. Types use `#[repr(C)]` so both sides agree on field
//! order and size; userspace decodes them in native byte order.

#![no_std]

/// Name of the `BPF_MAP_TYPE_RINGBUF` map the `emit` program writes to
pub const EVENTS_MAP: &str = "EVENTS";

/// Name of a hash map that is deliberately *not* a ring buffer
///
/// Used to exercise the "incompatible source" path when opening a reader.
pub const MAP_MEN: &str = "MAP_MEN";

/// Name of the uprobe program that publishes an [`Event`]
pub const EMIT_PROGRAM: &str = "emit";

/// Ring buffer size in bytes (power of two and a multiple of the page size)
pub const EVENTS_BYTE_SIZE: u32 = 4096;

/// Returned by `emit` when no space could be reserved in the ring buffer
pub const EMIT_RINGBUF_FULL: u32 = 42;

/// Event published by the `emit` program
///
/// **Memory Layout**: two native-endian `u64`, 16 bytes total.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Event {
    /// Value passed as the first argument of the probed function
    pub magic: u64,

    /// Bitwise complement of `magic`
    pub inverse_magic: u64,
}

impl Event {
    /// Build the event the kernel side emits for `magic`
    #[must_use]
    pub const fn new(magic: u64) -> Self {
        Self { magic, inverse_magic: !magic }
    }

    /// Whether `inverse_magic` is really the complement of `magic`
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.inverse_magic == !self.magic
    }
}

#[cfg(feature = "user")]
use aya::Pod;

// Pod lets userspace decode ring buffer samples straight into Event
#[cfg(feature = "user")]
#[allow(unsafe_code)]
unsafe impl Pod for Event {}
