//! # Per-call trace session
//!
//! The emitter's state machine for one decorated invocation:
//!
//! ```text
//! ENTERED ──(line)*──► RETURNING ──► EXITED
//!    │                                 ▲
//!    └──────────(raise)── RAISING ─────┘
//! ```
//!
//! Entering pushes a [`CallStackEntry`](crate::tracker) and emits CALL with
//! every parameter reported as added; each statement boundary diffs the fresh
//! snapshot against the stored one and emits LINE; exit emits RETURN or
//! EXCEPTION and pops the entry. The pop happens exactly once on every path:
//! the explicit exit methods mark the session exited, and `Drop` covers an
//! unwind that bypassed them, so stack entries cannot leak under error
//! conditions.

use crate::domain::{CallId, SourceLocation};
use crate::event::{now_us, EventKind, TraceEvent};
use crate::snapshot::{diff, Change, VariableSnapshot};
use crate::tracer::Tracer;
use crate::tracker;
use crate::value::{CapturedValue, Locals};
use serde::Serialize;

/// Handle to one active traced call. Created by the tracer's entry points
/// and passed to the traced body; not constructible directly.
pub struct TraceSession<'t> {
    tracer: &'t Tracer,
    call_id: CallId,
    function: String,
    file: &'static str,
    call_line: u32,
    depth: usize,
    gated: bool,
    exited: bool,
    return_value: Option<CapturedValue>,
}

impl<'t> TraceSession<'t> {
    /// ENTERED: push the stack entry and report parameters as added.
    ///
    /// CALL is emitted even for depth-gated calls so the call/return skeleton
    /// stays visible when line detail is elided.
    pub(crate) fn enter(
        tracer: &'t Tracer,
        name: &str,
        loc: SourceLocation,
        args: Locals,
    ) -> Self {
        let call_id = tracker::next_call_id();
        let depth = tracker::depth();
        let gated = depth >= tracer.config.depth;
        tracker::enter(call_id, gated);

        let snapshot = tracer.build_snapshot(&args);
        let changes = tracer.filter_changes(diff(None, &snapshot), EventKind::Call);

        let session = Self {
            tracer,
            call_id,
            function: name.to_string(),
            file: loc.file,
            call_line: loc.line,
            depth,
            gated,
            exited: false,
            return_value: None,
        };
        session.emit(EventKind::Call, loc.line, changes, None);
        tracker::record_snapshot(snapshot);
        session
    }

    /// LINE: report a statement boundary with the bindings visible there.
    ///
    /// Skipped entirely for depth-gated calls; the capture itself is the
    /// cost, so gating bounds overhead in recursive code.
    pub fn line(&mut self, line: u32, locals: Locals) {
        if self.gated || self.exited {
            return;
        }
        let snapshot = self.tracer.build_snapshot(&locals);
        let raw = tracker::with_top(|entry| diff(entry.last_snapshot.as_ref(), &snapshot))
            .unwrap_or_else(|| diff(None, &snapshot));
        let changes = self.tracer.filter_changes(raw, EventKind::Line);
        self.emit(EventKind::Line, line, changes, None);
        tracker::record_snapshot(snapshot);
    }

    /// Record the value the RETURN event will report as `return`.
    ///
    /// Overrides the automatic capture done by
    /// [`Tracer::trace_call`](crate::Tracer::trace_call); the only way to
    /// surface a return value under
    /// [`trace_scope`](crate::Tracer::trace_scope).
    pub fn returning<T: Serialize>(&mut self, value: &T) {
        self.return_value = Some(CapturedValue::capture(value));
    }

    #[must_use]
    pub fn call_id(&self) -> CallId {
        self.call_id
    }

    /// Entry depth of this call (0 = outermost).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// True when this call only reports entry/exit (depth gating).
    #[must_use]
    pub fn is_gated(&self) -> bool {
        self.gated
    }

    /// RETURNING → EXITED: report the return pseudo-variable and pop.
    pub(crate) fn finish_with(&mut self, auto_capture: Option<CapturedValue>) {
        if self.exited {
            return;
        }
        let returned = self.return_value.take().or(auto_capture);
        let mut final_snapshot = VariableSnapshot::new();
        if let Some(value) = &returned {
            final_snapshot.push("return", value.render(self.tracer.config.render_budget));
        }
        let raw = tracker::with_top(|entry| diff(entry.last_snapshot.as_ref(), &final_snapshot))
            .unwrap_or_else(|| diff(None, &final_snapshot));
        let changes = self.tracer.filter_changes(raw, EventKind::Return);
        self.emit(EventKind::Return, self.call_line, changes, None);
        self.exit_stack();
    }

    /// RAISING → EXITED: report the rendered exception and pop. The
    /// exception itself propagates unchanged in the caller.
    pub(crate) fn raised(&mut self, detail: String) {
        if self.exited {
            return;
        }
        self.emit(EventKind::Exception, self.call_line, Vec::new(), Some(detail));
        self.exit_stack();
    }

    fn exit_stack(&mut self) {
        self.exited = true;
        tracker::exit(self.call_id);
    }

    fn emit(&self, kind: EventKind, line: u32, changes: Vec<Change>, detail: Option<String>) {
        let event = TraceEvent {
            call_id: self.call_id,
            kind,
            function: self.function.clone(),
            file: self.file,
            line,
            depth: self.depth,
            timestamp_us: now_us(),
            changes,
            detail,
        };
        self.tracer.dispatch(&event);
    }
}

impl Drop for TraceSession<'_> {
    fn drop(&mut self) {
        // Unwind that bypassed the tracer's entry points (or an external
        // cancellation): still observe the exit and keep push/pop parity.
        if !self.exited {
            self.raised("<unwound>".to_string());
        }
    }
}
