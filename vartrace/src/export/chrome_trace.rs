//! Chrome Trace Event Format export
//!
//! Registers as a [`TraceObserver`] and collects the stream as it is
//! emitted: CALL opens a duration slice ("B"), RETURN/EXCEPTION closes it
//! ("E"), LINE becomes an instant event carrying its change list. Timestamps
//! are rebased to the first observed event.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::event::{EventKind, TraceEvent};
use crate::observe::TraceObserver;
use crate::snapshot::ChangeKind;

/// Chrome Trace Event format
/// Spec: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU/preview
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChromeTraceEvent {
    /// Event name (usually function name)
    name: String,
    /// Category for filtering/coloring
    cat: String,
    /// Phase: "B" = begin, "E" = end, "i" = instant, "M" = metadata
    ph: String,
    /// Timestamp in microseconds
    ts: f64,
    /// Process ID
    pid: u32,
    /// Thread ID
    tid: u32,
    /// Optional arguments (metadata)
    #[serde(skip_serializing_if = "Option::is_none")]
    args: Option<HashMap<String, JsonValue>>,
}

/// Chrome Trace Format container
#[derive(Debug, Serialize)]
struct ChromeTrace {
    #[serde(rename = "traceEvents")]
    trace_events: Vec<ChromeTraceEvent>,
    #[serde(rename = "displayTimeUnit")]
    display_time_unit: String,
}

#[derive(Default)]
struct Inner {
    events: Vec<ChromeTraceEvent>,
    /// First observed timestamp, for relative timing (µs since epoch)
    start_timestamp_us: Option<u64>,
}

/// Collects trace events for timeline export.
#[derive(Default)]
pub struct ChromeTraceExporter {
    inner: Mutex<Inner>,
}

impl ChromeTraceExporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trace event to the collection.
    #[allow(clippy::cast_precision_loss)]
    pub fn add_event(&self, event: &TraceEvent) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };

        // Initialize start timestamp on first event
        if inner.start_timestamp_us.is_none() {
            inner.start_timestamp_us = Some(event.timestamp_us);
        }
        let start = inner.start_timestamp_us.unwrap_or(event.timestamp_us);
        let ts = event.timestamp_us.saturating_sub(start) as f64;

        let ph = match event.kind {
            EventKind::Call => "B",
            EventKind::Return | EventKind::Exception => "E",
            EventKind::Line => "i",
        };

        let mut args = HashMap::new();
        args.insert("call_id".to_string(), serde_json::json!(event.call_id));
        args.insert("file".to_string(), serde_json::json!(event.file));
        args.insert("line".to_string(), serde_json::json!(event.line));
        for change in &event.changes {
            let rendered = match change.kind {
                ChangeKind::Changed => format!(
                    "{} -> {}",
                    change.old.as_deref().unwrap_or("?"),
                    change.new.as_deref().unwrap_or("?"),
                ),
                _ => change.new.clone().or_else(|| change.old.clone()).unwrap_or_default(),
            };
            args.insert(change.name.clone(), serde_json::json!(rendered));
        }
        if let Some(detail) = &event.detail {
            args.insert("error".to_string(), serde_json::json!(detail));
        }

        inner.events.push(ChromeTraceEvent {
            name: event.function.clone(),
            cat: "trace".to_string(),
            ph: ph.to_string(),
            ts,
            pid: std::process::id(),
            tid: current_context_id(),
            args: Some(args),
        });
    }

    /// Export the trace to any writer (file, stdout, buffer, etc.)
    ///
    /// Accepting any `Write` keeps this testable with in-memory buffers and
    /// usable with files or stdout in production.
    ///
    /// # Errors
    /// Returns an error if serialization or the underlying write fails.
    pub fn export<W: Write>(&self, writer: W) -> Result<()> {
        let inner = self.inner.lock().map_err(|_| anyhow::anyhow!("exporter lock poisoned"))?;
        let mut all_events = inner.events.clone();

        // Name each execution context so timelines group by thread
        let mut contexts: Vec<(u32, u32)> = Vec::new();
        for event in &inner.events {
            if !contexts.contains(&(event.pid, event.tid)) {
                contexts.push((event.pid, event.tid));
            }
        }
        for (pid, tid) in contexts {
            let mut args = HashMap::new();
            args.insert("name".to_string(), serde_json::json!(format!("context {tid}")));
            all_events.push(ChromeTraceEvent {
                name: "thread_name".to_string(),
                cat: String::new(),
                ph: "M".to_string(),
                ts: 0.0,
                pid,
                tid,
                args: Some(args),
            });
        }

        let trace =
            ChromeTrace { trace_events: all_events, display_time_unit: "ms".to_string() };

        serde_json::to_writer_pretty(writer, &trace).context("Failed to write trace JSON")?;
        Ok(())
    }

    /// Get the number of events collected
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.events.len()).unwrap_or(0)
    }
}

impl TraceObserver for ChromeTraceExporter {
    fn on_event(&self, event: &TraceEvent) {
        self.add_event(event);
    }
}

/// Stable small integer identifying the current thread of control.
///
/// `std::thread::ThreadId` has no portable numeric form, so contexts are
/// numbered in order of first appearance.
fn current_context_id() -> u32 {
    static NEXT: AtomicU32 = AtomicU32::new(1);
    thread_local! {
        static ID: u32 = NEXT.fetch_add(1, Ordering::Relaxed);
    }
    ID.with(|id| *id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CallId;
    use crate::snapshot::Change;

    fn event(kind: EventKind, ts: u64) -> TraceEvent {
        TraceEvent {
            call_id: CallId(1),
            kind,
            function: "compute".to_string(),
            file: "src/demo.rs",
            line: 3,
            depth: 0,
            timestamp_us: ts,
            changes: vec![Change {
                name: "x".to_string(),
                kind: ChangeKind::Added,
                old: None,
                new: Some("5".to_string()),
            }],
            detail: None,
        }
    }

    #[test]
    fn test_call_return_map_to_begin_end() {
        let exporter = ChromeTraceExporter::new();
        exporter.add_event(&event(EventKind::Call, 1_000));
        exporter.add_event(&event(EventKind::Return, 3_500));
        assert_eq!(exporter.event_count(), 2);

        let mut buffer = Vec::new();
        exporter.export(&mut buffer).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        let events = json["traceEvents"].as_array().unwrap();

        let begin = &events[0];
        assert_eq!(begin["ph"], "B");
        assert_eq!(begin["name"], "compute");
        assert_eq!(begin["ts"], 0.0);
        assert_eq!(begin["args"]["x"], "5");

        let end = &events[1];
        assert_eq!(end["ph"], "E");
        assert_eq!(end["ts"], 2_500.0);
    }

    #[test]
    fn test_export_includes_context_metadata() {
        let exporter = ChromeTraceExporter::new();
        exporter.add_event(&event(EventKind::Call, 0));
        let mut buffer = Vec::new();
        exporter.export(&mut buffer).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        let events = json["traceEvents"].as_array().unwrap();
        assert!(events.iter().any(|e| e["ph"] == "M" && e["name"] == "thread_name"));
        assert_eq!(json["displayTimeUnit"], "ms");
    }
}
