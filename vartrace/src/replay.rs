//! Replay data model for exported traces
//!
//! Parses a Chrome Trace Event Format file produced by
//! [`ChromeTraceExporter`](crate::export::ChromeTraceExporter) back into an
//! internal representation for offline inspection. Parsing is tolerant the
//! same way the exporter's consumers are: unknown phases are skipped and
//! missing fields default rather than fail.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// One event loaded from an exported trace file.
#[derive(Debug, Clone)]
pub struct ReplayEvent {
    pub name: String,
    /// Chrome phase: "B", "E" or "i"
    pub phase: String,
    /// Microseconds relative to trace start
    pub ts: f64,
    pub tid: u32,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub error: Option<String>,
}

/// Aggregate over all completed spans of one function.
#[derive(Debug, Clone)]
pub struct CallSummary {
    pub name: String,
    pub count: usize,
    pub total_us: f64,
    pub max_us: f64,
}

/// Summary statistics for a loaded trace.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReplayStats {
    pub calls: usize,
    pub lines: usize,
    pub exceptions: usize,
    pub contexts: usize,
}

/// Internal data model for a replayed trace (immutable, loaded from file).
#[derive(Debug)]
pub struct ReplayData {
    pub events: Vec<ReplayEvent>,
    pub contexts: Vec<u32>,
    pub duration_us: f64,
}

impl ReplayData {
    /// Parse an exported trace file into our internal representation.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or is not valid JSON
    /// with a `traceEvents` array.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read trace file {}", path.display()))?;
        let json: serde_json::Value =
            serde_json::from_str(&content).context("Trace file is not valid JSON")?;

        let trace_events = json["traceEvents"]
            .as_array()
            .context("Trace file has no traceEvents array")?;

        let mut events = Vec::new();
        let mut contexts = Vec::new();
        let mut max_ts = 0.0f64;

        for event in trace_events {
            let phase = event["ph"].as_str().unwrap_or("");
            // Metadata and unknown phases are not replayable occurrences
            if !matches!(phase, "B" | "E" | "i") {
                continue;
            }

            let tid = u32::try_from(event["tid"].as_u64().unwrap_or(0)).unwrap_or(0);
            let ts = event["ts"].as_f64().unwrap_or(0.0);
            max_ts = max_ts.max(ts);
            if !contexts.contains(&tid) {
                contexts.push(tid);
            }

            events.push(ReplayEvent {
                name: event["name"].as_str().unwrap_or("unknown").to_string(),
                phase: phase.to_string(),
                ts,
                tid,
                file: event["args"]["file"].as_str().map(String::from),
                line: event["args"]["line"].as_u64().and_then(|l| u32::try_from(l).ok()),
                error: event["args"]["error"].as_str().map(String::from),
            });
        }

        contexts.sort_unstable();
        Ok(Self { events, contexts, duration_us: max_ts })
    }

    /// Match begin/end pairs per context and aggregate per function name.
    ///
    /// Spans are matched with one stack per context, so nested calls
    /// attribute correctly; unmatched begins (truncated trace) are dropped.
    #[must_use]
    pub fn call_summaries(&self) -> Vec<CallSummary> {
        let mut open: HashMap<u32, Vec<(String, f64)>> = HashMap::new();
        let mut totals: Vec<CallSummary> = Vec::new();

        for event in &self.events {
            match event.phase.as_str() {
                "B" => {
                    open.entry(event.tid).or_default().push((event.name.clone(), event.ts));
                }
                "E" => {
                    if let Some((name, started)) =
                        open.get_mut(&event.tid).and_then(Vec::pop)
                    {
                        let elapsed = (event.ts - started).max(0.0);
                        match totals.iter_mut().find(|s| s.name == name) {
                            Some(summary) => {
                                summary.count += 1;
                                summary.total_us += elapsed;
                                summary.max_us = summary.max_us.max(elapsed);
                            }
                            None => totals.push(CallSummary {
                                name,
                                count: 1,
                                total_us: elapsed,
                                max_us: elapsed,
                            }),
                        }
                    }
                }
                _ => {}
            }
        }

        totals.sort_by(|a, b| b.total_us.total_cmp(&a.total_us));
        totals
    }

    #[must_use]
    pub fn stats(&self) -> ReplayStats {
        ReplayStats {
            calls: self.events.iter().filter(|e| e.phase == "B").count(),
            lines: self.events.iter().filter(|e| e.phase == "i").count(),
            exceptions: self.events.iter().filter(|e| e.error.is_some()).count(),
            contexts: self.contexts.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_from_file_parses_events() {
        let file = write_fixture(
            r#"{"traceEvents":[
                {"name":"f","cat":"trace","ph":"B","ts":0.0,"pid":1,"tid":1,"args":{"file":"a.rs","line":3}},
                {"name":"f","cat":"trace","ph":"E","ts":150.0,"pid":1,"tid":1,"args":{}},
                {"name":"thread_name","cat":"","ph":"M","ts":0.0,"pid":1,"tid":1,"args":{}}
            ],"displayTimeUnit":"ms"}"#,
        );
        let data = ReplayData::from_file(file.path()).unwrap();
        assert_eq!(data.events.len(), 2);
        assert_eq!(data.contexts, vec![1]);
        assert_eq!(data.events[0].file.as_deref(), Some("a.rs"));
        assert!((data.duration_us - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_call_summaries_match_nested_spans() {
        let file = write_fixture(
            r#"{"traceEvents":[
                {"name":"outer","ph":"B","ts":0.0,"pid":1,"tid":1},
                {"name":"inner","ph":"B","ts":10.0,"pid":1,"tid":1},
                {"name":"inner","ph":"E","ts":30.0,"pid":1,"tid":1},
                {"name":"outer","ph":"E","ts":100.0,"pid":1,"tid":1}
            ]}"#,
        );
        let data = ReplayData::from_file(file.path()).unwrap();
        let summaries = data.call_summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "outer");
        assert!((summaries[0].total_us - 100.0).abs() < f64::EPSILON);
        assert_eq!(summaries[1].name, "inner");
        assert!((summaries[1].total_us - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_file_reports_context() {
        let file = write_fixture("not json");
        let err = ReplayData::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_stats_count_exceptions() {
        let file = write_fixture(
            r#"{"traceEvents":[
                {"name":"g","ph":"B","ts":0.0,"pid":1,"tid":1},
                {"name":"g","ph":"E","ts":5.0,"pid":1,"tid":1,"args":{"error":"panic: boom"}}
            ]}"#,
        );
        let data = ReplayData::from_file(file.path()).unwrap();
        let stats = data.stats();
        assert_eq!(stats.calls, 1);
        assert_eq!(stats.exceptions, 1);
    }
}
