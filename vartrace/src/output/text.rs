//! Plain-text event rendering
//!
//! One line per event: optional tracer prefix, depth indentation, a
//! fixed-width kind marker, the source coordinate, and the change list.
//! Announce-style notes get the shorter leveled form.

use crate::domain::Level;
use crate::event::{EventKind, TraceEvent};
use crate::snapshot::{Change, ChangeKind};
use std::fmt::Write;

/// Renders [`TraceEvent`]s and announce notes to single text lines.
#[derive(Debug, Clone)]
pub struct TextFormatter {
    indent_unit: &'static str,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self { indent_unit: "  " }
    }
}

impl TextFormatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a trace event.
    ///
    /// `level` is only rendered when the owning tracer was configured with a
    /// non-default level; `prefix` labels every line of that tracer.
    #[must_use]
    pub fn render_event(
        &self,
        event: &TraceEvent,
        prefix: Option<&str>,
        level: Option<Level>,
    ) -> String {
        let mut line = String::new();

        if let Some(prefix) = prefix {
            let _ = write!(line, "{prefix}: ");
        }
        line.push_str(&self.indent_unit.repeat(event.depth));
        match level {
            Some(level) => {
                let _ = write!(line, "[{}|{level}]", event.kind.marker().trim_end());
            }
            None => {
                let _ = write!(line, "[{}]", event.kind.marker());
            }
        }
        let _ = write!(line, " {}:{}", event.file, event.line);
        if event.kind != EventKind::Line {
            let _ = write!(line, " {}()", event.function);
        }

        let changes = render_changes(&event.changes);
        match (&event.detail, changes.is_empty()) {
            (Some(detail), true) => {
                let _ = write!(line, ": {detail}");
            }
            (Some(detail), false) => {
                let _ = write!(line, ": {detail} | {changes}");
            }
            (None, false) => {
                let _ = write!(line, ": {changes}");
            }
            (None, true) => {}
        }

        line
    }

    /// Render an announce-style note.
    #[must_use]
    pub fn render_note(&self, level: Level, prefix: Option<&str>, message: &str) -> String {
        match prefix {
            Some(prefix) => format!("[{level}] {prefix}: {message}"),
            None => format!("[{level}] {message}"),
        }
    }
}

fn render_changes(changes: &[Change]) -> String {
    let mut out = String::new();
    for (i, change) in changes.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = match change.kind {
            ChangeKind::Added | ChangeKind::Unchanged => {
                write!(out, "{} = {}", change.name, change.new.as_deref().unwrap_or("?"))
            }
            ChangeKind::Changed => write!(
                out,
                "{}: {} -> {}",
                change.name,
                change.old.as_deref().unwrap_or("?"),
                change.new.as_deref().unwrap_or("?")
            ),
            ChangeKind::Removed => {
                write!(out, "{}: {} -> <gone>", change.name, change.old.as_deref().unwrap_or("?"))
            }
        };
    }
    out
}
