//! # eBPF Program Loading and Attachment
//!
//! Loads the compiled `emit` producer and attaches it to a userspace function.
//!
//! ## Functions
//!
//! - [`load_ebpf_program()`] - Load eBPF bytecode from an object file
//! - [`attach_emit_uprobe()`] - Attach `emit` to [`bbq_emit`] in a binary
//! - [`take_map()`] - Move a map out of the loaded program
//! - [`bbq_emit()`] - The probed function; each call publishes one event

use std::path::Path;

use anyhow::{Context, Result};
use aya::{maps::Map, programs::UProbe, Ebpf};
use aya_log::EbpfLogger;
use bbq_common::EMIT_PROGRAM;
use log::{info, warn};

/// Symbol the `emit` uprobe attaches to
pub const EMIT_SYMBOL: &str = "bbq_emit";

/// Default location `cargo xtask build-ebpf` writes the object to
pub const DEFAULT_OBJECT_PATH: &str = "target/bpfel-unknown-none/release/bbq";

/// Publish `magic` through the `emit` uprobe, if attached
///
/// Otherwise does nothing but return its argument.
#[allow(unsafe_code)]
#[no_mangle]
#[inline(never)]
pub extern "C" fn bbq_emit(magic: u64) -> u64 {
    std::hint::black_box(magic)
}

/// Load the eBPF object built by `cargo xtask build-ebpf`
///
/// # Errors
/// Returns an error if the object cannot be read or the kernel rejects it
pub fn load_ebpf_program(object: &Path) -> Result<Ebpf> {
    let bpf = Ebpf::load_file(object)
        .with_context(|| format!("Failed to load eBPF object {}", object.display()))?;
    Ok(bpf)
}

/// Initialize eBPF logger
pub fn init_ebpf_logger(bpf: &mut Ebpf) {
    if let Err(e) = EbpfLogger::init(bpf) {
        warn!("Failed to initialize eBPF logger: {e}");
    }
}

/// Attach the `emit` uprobe to [`EMIT_SYMBOL`] in `target`
///
/// # Errors
/// Returns an error if the program is missing, fails to load, or the symbol
/// cannot be found in `target`
pub fn attach_emit_uprobe(bpf: &mut Ebpf, target: &Path, pid: Option<i32>) -> Result<()> {
    let program: &mut UProbe = bpf
        .program_mut(EMIT_PROGRAM)
        .with_context(|| format!("{EMIT_PROGRAM} program not found"))?
        .try_into()?;
    program.load()?;
    program
        .attach(Some(EMIT_SYMBOL), 0, target, pid)
        .with_context(|| format!("Failed to attach {EMIT_PROGRAM} to {}", target.display()))?;
    info!("✓ Attached uprobe: {EMIT_SYMBOL} in {}", target.display());
    Ok(())
}

/// Take ownership of the map called `name`
///
/// # Errors
/// Returns an error if there is no such map (or it was taken already)
pub fn take_map(bpf: &mut Ebpf, name: &str) -> Result<Map> {
    bpf.take_map(name).with_context(|| format!("{name} map not found"))
}
