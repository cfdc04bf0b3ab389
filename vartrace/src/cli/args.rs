//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "vartrace",
    about = "Inspect trace files exported by the vartrace engine",
    after_help = "\
EXAMPLES:
    vartrace trace.json                      Per-call summaries and statistics
    vartrace trace.json --calls-only         Aggregate table only
    vartrace trace.json --stats              Statistics only"
)]
pub struct Args {
    /// Exported trace file (Chrome Trace Event Format)
    #[arg(value_name = "TRACE")]
    pub trace: PathBuf,

    /// Print the per-call aggregate table only
    #[arg(long)]
    pub calls_only: bool,

    /// Print summary statistics only
    #[arg(long)]
    pub stats: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}
