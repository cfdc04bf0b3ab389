//! Export pipeline: tracer → observer → Chrome trace JSON → replay.

use std::io::Write;
use std::sync::Arc;
use vartrace::export::ChromeTraceExporter;
use vartrace::replay::ReplayData;
use vartrace::{here, locals, step, BufferSink, Tracer};

fn traced_exporter() -> Arc<ChromeTraceExporter> {
    let exporter = Arc::new(ChromeTraceExporter::new());
    let tracer = Tracer::builder()
        .output(Arc::new(BufferSink::new()))
        .observer(exporter.clone())
        .build()
        .unwrap();

    let x = 5;
    tracer.trace_call("compute", here!(), locals![x], |s| {
        let y = x + 1;
        step!(s, x, y);
        y
    });

    exporter
}

#[test]
fn test_export_creates_valid_json() {
    let exporter = traced_exporter();
    let mut buffer = Vec::new();

    exporter.export(&mut buffer).expect("Failed to export trace");

    // Verify the output is valid JSON with the expected structure
    let json_str = String::from_utf8(buffer).expect("Invalid UTF-8");
    let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("Invalid JSON");

    assert!(parsed.get("traceEvents").is_some());
    assert!(parsed.get("displayTimeUnit").is_some());
    assert_eq!(parsed["displayTimeUnit"], "ms");
}

#[test]
fn test_export_pairs_call_and_return() {
    let exporter = traced_exporter();
    // CALL, LINE, RETURN
    assert_eq!(exporter.event_count(), 3);

    let mut buffer = Vec::new();
    exporter.export(&mut buffer).unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
    let events = parsed["traceEvents"].as_array().unwrap();

    let begins: Vec<_> = events.iter().filter(|e| e["ph"] == "B").collect();
    let ends: Vec<_> = events.iter().filter(|e| e["ph"] == "E").collect();
    let instants: Vec<_> = events.iter().filter(|e| e["ph"] == "i").collect();
    assert_eq!(begins.len(), 1);
    assert_eq!(ends.len(), 1);
    assert_eq!(instants.len(), 1);

    assert_eq!(begins[0]["name"], "compute");
    assert_eq!(begins[0]["args"]["x"], "5");
    assert_eq!(instants[0]["args"]["y"], "6");
}

#[test]
fn test_exported_file_replays() {
    let exporter = traced_exporter();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    let mut buffer = Vec::new();
    exporter.export(&mut buffer).unwrap();
    file.write_all(&buffer).unwrap();

    let data = ReplayData::from_file(file.path()).expect("exported trace replays");
    let stats = data.stats();
    assert_eq!(stats.calls, 1);
    assert_eq!(stats.lines, 1);
    assert_eq!(stats.exceptions, 0);

    let summaries = data.call_summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].name, "compute");
    assert_eq!(summaries[0].count, 1);
}
