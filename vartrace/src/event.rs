//! Trace event model
//!
//! One [`TraceEvent`] per reportable occurrence, consumed once by the
//! formatter and any registered observers, then discarded. Events serialize
//! for the Chrome trace exporter.

use crate::domain::CallId;
use crate::snapshot::Change;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Kind of a reportable occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    Call,
    Line,
    Return,
    Exception,
}

impl EventKind {
    /// Fixed-width marker used by the text formatter.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Call => "CALL",
            Self::Line => "LINE",
            Self::Return => "RET ",
            Self::Exception => "EXC ",
        }
    }
}

/// A single reportable occurrence within a traced call.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub call_id: CallId,
    pub kind: EventKind,
    /// Name of the traced callable.
    pub function: String,
    pub file: &'static str,
    pub line: u32,
    /// Nesting depth at emission time (0 = outermost traced call).
    pub depth: usize,
    /// Microseconds since the Unix epoch.
    pub timestamp_us: u64,
    /// Non-suppressed binding changes, in reporting order.
    pub changes: Vec<Change>,
    /// Rendered exception for EXCEPTION events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Wall-clock timestamp in microseconds since the Unix epoch.
#[must_use]
pub fn now_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_markers_fixed_width() {
        for kind in [EventKind::Call, EventKind::Line, EventKind::Return, EventKind::Exception] {
            assert_eq!(kind.marker().len(), 4);
        }
    }

    #[test]
    fn test_event_serializes_kind_uppercase() {
        let event = TraceEvent {
            call_id: CallId(1),
            kind: EventKind::Call,
            function: "f".to_string(),
            file: "src/demo.rs",
            line: 3,
            depth: 0,
            timestamp_us: 1,
            changes: Vec::new(),
            detail: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "CALL");
        assert_eq!(json["call_id"], 1);
        assert!(json.get("detail").is_none());
    }
}
