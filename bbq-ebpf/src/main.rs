//! # eBPF Test Producer
//!
//! Kernel-side program feeding the ring buffer the userspace pump drains.
//!
//! ## Programs
//!
//! - **Uprobe**: `emit` - publishes one [`Event`] per call of the probed function
//!
//! ## Maps (Shared with Userspace)
//!
//! - `EVENTS` - Ring buffer (4KB) of [`Event`] records
//! - `MAP_MEN` - Hash map that only exists to be rejected as a record source
//!
//! ## Build
//!
//! ```bash
//! cargo xtask build-ebpf
//! ```

#![no_std]
#![no_main]
#![allow(unused_unsafe)]

use aya_ebpf::{
    macros::{map, uprobe},
    maps::{HashMap, RingBuf},
    programs::ProbeContext,
};
use aya_log_ebpf::warn;
use bbq_common::{Event, EMIT_RINGBUF_FULL, EVENTS_BYTE_SIZE};

/// Ring buffer carrying [`Event`] records to userspace
#[map]
static EVENTS: RingBuf = RingBuf::with_byte_size(EVENTS_BYTE_SIZE, 0);

/// Not a ring buffer; userspace must refuse to pump from it
#[map]
static MAP_MEN: HashMap<u32, u32> = HashMap::with_max_entries(42, 0);

/// Hook: `bbq_emit(magic: u64)` in the traced binary
///
/// Returns 0 on success, `EMIT_RINGBUF_FULL` when no record could be reserved.
#[uprobe]
pub fn emit(ctx: ProbeContext) -> u32 {
    match try_emit(&ctx) {
        Ok(()) => 0,
        Err(code) => code,
    }
}

fn try_emit(ctx: &ProbeContext) -> Result<(), u32> {
    let magic: u64 = ctx.arg(0).ok_or(1u32)?;

    let Some(mut entry) = EVENTS.reserve::<Event>(0) else {
        warn!(ctx, "EVENTS ring buffer full, dropping magic {}", magic);
        return Err(EMIT_RINGBUF_FULL);
    };
    entry.write(Event::new(magic));
    entry.submit(0);

    Ok(())
}

#[cfg(all(not(test), target_os = "none"))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    unsafe { core::hint::unreachable_unchecked() }
}
