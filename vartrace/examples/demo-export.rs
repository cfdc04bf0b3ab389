//! Export a traced run to trace.json for chrome://tracing.
//!
//! Run with: cargo run --example demo-export

use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;
use vartrace::export::ChromeTraceExporter;
use vartrace::monitor::{CallCounters, SlowCallMonitor};
use vartrace::{here, locals, step, Tracer};

fn main() -> anyhow::Result<()> {
    let exporter = Arc::new(ChromeTraceExporter::new());
    let counters = Arc::new(CallCounters::new());
    let slow = Arc::new(SlowCallMonitor::new(std::time::Duration::from_millis(5)));

    let tracer = Tracer::builder()
        .depth(2)
        .observer(exporter.clone())
        .observer(counters.clone())
        .observer(slow.clone())
        .build()
        .expect("default config builds");

    for n in [3_u64, 25] {
        tracer.trace_call("fib", here!(), locals![n], |s| {
            let mut a = 0_u64;
            let mut b = 1_u64;
            for _ in 0..n {
                (a, b) = (b, a + b);
                step!(s, a, b);
            }
            a
        });
    }

    let file = File::create("trace.json")?;
    exporter.export(BufWriter::new(file))?;

    let stats = counters.snapshot();
    println!(
        "saved: trace.json ({} events; calls={} lines={} slow={})",
        exporter.event_count(),
        stats.calls,
        stats.lines,
        slow.flagged()
    );
    Ok(())
}
