//! # bbq - Demo Entry Point
//!
//! Loads the `emit` producer, attaches it to this binary's own `bbq_emit`
//! function, publishes the requested magics and prints the events that come
//! back out of the event queue.

use anyhow::{Context, Result};
use bbq::cli::Args;
use bbq::loader::{attach_emit_uprobe, bbq_emit, init_ebpf_logger, load_ebpf_program, take_map};
use bbq::preflight::run_preflight_checks;
use bbq::Options;
use bbq_common::{Event, EVENTS_MAP};
use clap::Parser;
use log::info;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NOPERM: i32 = 77;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = err.to_string().to_lowercase();
    if msg.contains("permission denied") || msg.contains("requires root") {
        EXIT_NOPERM
    } else {
        EXIT_ERROR
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;

    run_preflight_checks(&args.object)?;

    if !quiet {
        println!("bbq v{}", env!("CARGO_PKG_VERSION"));
        println!("object: {}", args.object.display());
    }

    let mut bpf = load_ebpf_program(&args.object)?;
    init_ebpf_logger(&mut bpf);

    let exe = std::env::current_exe().context("Failed to resolve own executable")?;
    #[allow(clippy::cast_possible_wrap)]
    let pid = std::process::id() as i32;
    attach_emit_uprobe(&mut bpf, &exe, Some(pid))?;

    let token = CancellationToken::new();
    let (error_tx, mut error_rx) = mpsc::channel(16);
    let mut events = bbq::new::<Event, _>(
        token.clone(),
        take_map(&mut bpf, EVENTS_MAP)?,
        Options::default().capacity(args.capacity).error_sink(error_tx.clone()),
    )?;

    if !quiet {
        println!("capacity: {}", events.capacity());
    }

    for &magic in &args.magics {
        bbq_emit(magic);
    }
    info!("Emitted {} magics", args.magics.len());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let deadline = async {
        if args.duration > 0 {
            tokio::time::sleep(Duration::from_secs(args.duration)).await;
        } else {
            std::future::pending::<()>().await;
        }
    };
    tokio::pin!(deadline);

    let started = Instant::now();
    let mut received = 0usize;
    let mut exit_reason = "all events received";

    loop {
        if args.duration == 0 && received >= args.magics.len() {
            break;
        }

        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    exit_reason = "event queue closed";
                    break;
                };
                received += 1;
                display_event(&event);
            }
            Some(err) = error_rx.recv() => {
                eprintln!("warning: {err}");
            }
            () = &mut deadline => {
                exit_reason = "duration limit reached";
                break;
            }
            _ = &mut ctrl_c => {
                exit_reason = "interrupted";
                break;
            }
        }
    }

    // Queue closes once the pump released the ring buffer
    token.cancel();
    while events.recv().await.is_some() {}

    if !quiet {
        eprintln!(
            "\n{exit_reason}: {:.1}s, {received} of {} events",
            started.elapsed().as_secs_f64(),
            args.magics.len()
        );
    }

    Ok(())
}

fn display_event(event: &Event) {
    let check = if event.is_consistent() { "✓" } else { "✗ inverse mismatch" };
    println!("magic {:>20}  inverse 0x{:016x}  {check}", event.magic, event.inverse_magic);
}
