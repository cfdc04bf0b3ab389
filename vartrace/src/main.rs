//! # vartrace - Trace Inspection Entry Point
//!
//! Offline companion to the tracing library: loads a trace exported with
//! [`ChromeTraceExporter`](vartrace::export::ChromeTraceExporter) and prints
//! per-call aggregates and summary statistics.

// Time conversions intentionally lose precision for display purposes
#![allow(clippy::cast_precision_loss)]

use anyhow::{Context, Result};
use clap::Parser;

use vartrace::cli::Args;
use vartrace::replay::ReplayData;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NOINPUT: i32 = 66;

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
    if err
        .chain()
        .any(|cause| {
            cause
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
        })
    {
        EXIT_NOINPUT
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let data = ReplayData::from_file(&args.trace)
        .with_context(|| format!("Failed to load {}", args.trace.display()))?;

    if !args.quiet {
        println!("vartrace v{}", env!("CARGO_PKG_VERSION"));
        println!("trace: {}", args.trace.display());
        println!(
            "events: {}, contexts: {}, duration: {:.3}ms",
            data.events.len(),
            data.contexts.len(),
            data.duration_us / 1_000.0
        );
        println!();
    }

    let stats_only = args.stats && !args.calls_only;
    if !stats_only {
        print_call_table(&data);
    }
    if !args.calls_only {
        let stats = data.stats();
        println!(
            "stats: calls={} lines={} exceptions={} contexts={}",
            stats.calls, stats.lines, stats.exceptions, stats.contexts
        );
    }

    Ok(())
}

fn print_call_table(data: &ReplayData) {
    let summaries = data.call_summaries();
    if summaries.is_empty() {
        println!("no completed calls in trace");
        return;
    }

    println!("{:<30} {:>6} {:>12} {:>12}", "function", "calls", "total_ms", "max_ms");
    for summary in summaries {
        println!(
            "{:<30} {:>6} {:>12.3} {:>12.3}",
            summary.name,
            summary.count,
            summary.total_us / 1_000.0,
            summary.max_us / 1_000.0
        );
    }
    println!();
}
