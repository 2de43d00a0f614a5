//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::loader::DEFAULT_OBJECT_PATH;

#[derive(Parser, Debug)]
#[command(
    name = "bbq",
    about = "Stream events from an eBPF ring buffer through an async queue",
    after_help = "\
EXAMPLES:
    sudo bbq                                 Emit 42, 123 and 666 and print them
    sudo bbq --magic 7 --capacity 0          Unbuffered hand-off
    sudo bbq --duration 10                   Keep listening for 10 seconds"
)]
pub struct Args {
    /// Compiled eBPF object (built with `cargo xtask build-ebpf`)
    #[arg(long, value_name = "FILE", default_value = DEFAULT_OBJECT_PATH)]
    pub object: PathBuf,

    /// Values to publish through the ring buffer, in order
    #[arg(short, long = "magic", value_name = "N", default_values_t = [42, 123, 666])]
    pub magics: Vec<u64>,

    /// Event queue capacity (0 = synchronous hand-off)
    #[arg(short, long, default_value = "5", allow_negative_numbers = true)]
    pub capacity: isize,

    /// Stop after N seconds (0 = once every magic was received)
    #[arg(long, default_value = "0")]
    pub duration: u64,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}
