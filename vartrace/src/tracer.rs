//! # Tracer - decoration interface and event dispatch
//!
//! A [`Tracer`] is the configured entry point: it owns the parsed watch
//! expressions, the report policy, the sink and the registered observers.
//! Attaching it to a callable means running the body inside
//! [`Tracer::trace_call`] (or [`trace_fallible`](Tracer::trace_fallible) /
//! [`trace_scope`](Tracer::trace_scope)) and reporting statement boundaries
//! through the session handle it passes in:
//!
//! ```
//! use vartrace::{locals, step, Tracer};
//!
//! let tracer = Tracer::new();
//! let result = tracer.trace_call("double_plus_one", vartrace::here!(), locals![], |s| {
//!     let x = 5;
//!     step!(s, x);
//!     let y = 2 * x + 1;
//!     step!(s, y);
//!     y
//! });
//! assert_eq!(result, 11);
//! ```
//!
//! Exceptions stay transparent: a panic inside the body is reported as an
//! EXCEPTION event and resumed unchanged; an `Err` from `trace_fallible` is
//! reported and returned unchanged.

use crate::domain::{Level, SourceLocation, WatchParseError};
use crate::event::{EventKind, TraceEvent};
use crate::observe::TraceObserver;
use crate::output::{self, Sink, StderrSink, TextFormatter};
use crate::session::TraceSession;
use crate::snapshot::{Change, ChangeKind, VariableSnapshot};
use crate::value::{CapturedValue, Locals, DEFAULT_RENDER_BUDGET};
use crate::watch::WatchExpr;
use serde::Serialize;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Report policy and watch configuration, fixed at build time.
#[derive(Debug)]
pub(crate) struct TraceConfig {
    pub(crate) watch: Vec<WatchExpr>,
    /// Nested calls entered at this depth or beyond get entry/exit only.
    pub(crate) depth: usize,
    pub(crate) report_unchanged: bool,
    pub(crate) render_budget: usize,
    pub(crate) prefix: Option<String>,
    pub(crate) level: Level,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            watch: Vec::new(),
            depth: 1,
            report_unchanged: false,
            render_budget: DEFAULT_RENDER_BUDGET,
            prefix: None,
            level: Level::Debug,
        }
    }
}

enum WatchSpec {
    Text(String),
    Parsed(WatchExpr),
}

/// Builder for [`Tracer`]. Only watch parsing can fail.
#[derive(Default)]
pub struct TracerBuilder {
    watch: Vec<WatchSpec>,
    depth: Option<usize>,
    report_unchanged: bool,
    render_budget: Option<usize>,
    sink: Option<Arc<dyn Sink>>,
    prefix: Option<String>,
    level: Option<Level>,
    observers: Vec<Arc<dyn TraceObserver>>,
}

impl TracerBuilder {
    /// Declare a watch expression in textual form (parsed by `build`).
    #[must_use]
    pub fn watch(mut self, spec: impl Into<String>) -> Self {
        self.watch.push(WatchSpec::Text(spec.into()));
        self
    }

    /// Declare an already-constructed watch expression.
    #[must_use]
    pub fn watch_expr(mut self, expr: WatchExpr) -> Self {
        self.watch.push(WatchSpec::Parsed(expr));
        self
    }

    /// Bound the depth at which nested calls keep line-level detail
    /// (minimum 1: the outermost call is always detailed).
    #[must_use]
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth.max(1));
        self
    }

    /// Also report bindings whose rendering did not change.
    #[must_use]
    pub fn report_unchanged(mut self, yes: bool) -> Self {
        self.report_unchanged = yes;
        self
    }

    /// Rendering budget in characters before truncation.
    #[must_use]
    pub fn render_budget(mut self, chars: usize) -> Self {
        self.render_budget = Some(chars);
        self
    }

    /// Output destination (default: stderr).
    #[must_use]
    pub fn output(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Label rendered at the start of every line of this tracer.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Level tag for this tracer's lines (default: debug, not rendered).
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Register a read-only observer of the event stream.
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn TraceObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Parse watch expressions and assemble the tracer.
    ///
    /// # Errors
    /// Returns an error if any textual watch expression fails to parse.
    pub fn build(self) -> Result<Tracer, WatchParseError> {
        let mut watch = Vec::with_capacity(self.watch.len());
        for spec in self.watch {
            watch.push(match spec {
                WatchSpec::Text(text) => WatchExpr::parse(&text)?,
                WatchSpec::Parsed(expr) => expr,
            });
        }

        Ok(Tracer {
            config: TraceConfig {
                watch,
                depth: self.depth.unwrap_or(1),
                report_unchanged: self.report_unchanged,
                render_budget: self.render_budget.unwrap_or(DEFAULT_RENDER_BUDGET),
                prefix: self.prefix,
                level: self.level.unwrap_or(Level::Debug),
            },
            sink: self.sink.unwrap_or_else(|| Arc::new(StderrSink)),
            observers: self.observers,
            formatter: TextFormatter::new(),
        })
    }
}

/// The configured tracing engine. Cheap to share (`&Tracer` everywhere) and
/// safe to use from several threads at once: per-call state lives on the
/// calling thread's stack, only the sink is shared.
pub struct Tracer {
    pub(crate) config: TraceConfig,
    sink: Arc<dyn Sink>,
    observers: Vec<Arc<dyn TraceObserver>>,
    formatter: TextFormatter,
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracer {
    /// Tracer with default policy, writing to stderr.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: TraceConfig::default(),
            sink: Arc::new(StderrSink),
            observers: Vec::new(),
            formatter: TextFormatter::new(),
        }
    }

    #[must_use]
    pub fn builder() -> TracerBuilder {
        TracerBuilder::default()
    }

    /// Trace a call whose body cannot fail (panics excepted).
    ///
    /// The body's return value is captured as the `return` pseudo-variable.
    /// A panic inside the body is reported as an EXCEPTION event and resumed
    /// unchanged.
    pub fn trace_call<R, F>(&self, name: &str, loc: SourceLocation, args: Locals, f: F) -> R
    where
        R: Serialize,
        F: FnOnce(&mut TraceSession<'_>) -> R,
    {
        let mut session = TraceSession::enter(self, name, loc, args);
        match catch_unwind(AssertUnwindSafe(|| f(&mut session))) {
            Ok(value) => {
                session.finish_with(Some(CapturedValue::capture(&value)));
                value
            }
            Err(payload) => {
                session.raised(render_panic(payload.as_ref()));
                resume_unwind(payload)
            }
        }
    }

    /// Trace a fallible call: an `Err` takes the RAISING path (reported as an
    /// EXCEPTION event, then returned unchanged to the caller).
    pub fn trace_fallible<T, E, F>(
        &self,
        name: &str,
        loc: SourceLocation,
        args: Locals,
        f: F,
    ) -> Result<T, E>
    where
        T: Serialize,
        E: std::fmt::Display,
        F: FnOnce(&mut TraceSession<'_>) -> Result<T, E>,
    {
        let mut session = TraceSession::enter(self, name, loc, args);
        match catch_unwind(AssertUnwindSafe(|| f(&mut session))) {
            Ok(Ok(value)) => {
                session.finish_with(Some(CapturedValue::capture(&value)));
                Ok(value)
            }
            Ok(Err(err)) => {
                session.raised(err.to_string());
                Err(err)
            }
            Err(payload) => {
                session.raised(render_panic(payload.as_ref()));
                resume_unwind(payload)
            }
        }
    }

    /// Trace a call without capturing its return value (no `Serialize`
    /// bound); use [`TraceSession::returning`] to capture one explicitly.
    pub fn trace_scope<R, F>(&self, name: &str, loc: SourceLocation, args: Locals, f: F) -> R
    where
        F: FnOnce(&mut TraceSession<'_>) -> R,
    {
        let mut session = TraceSession::enter(self, name, loc, args);
        match catch_unwind(AssertUnwindSafe(|| f(&mut session))) {
            Ok(value) => {
                session.finish_with(None);
                value
            }
            Err(payload) => {
                session.raised(render_panic(payload.as_ref()));
                resume_unwind(payload)
            }
        }
    }

    /// Render locals plus resolved watch labels into one snapshot,
    /// locals first in capture order, watch labels in declaration order.
    pub(crate) fn build_snapshot(&self, locals: &Locals) -> VariableSnapshot {
        let mut snapshot = VariableSnapshot::new();
        for (name, value) in locals {
            snapshot.push(*name, value.render(self.config.render_budget));
        }
        for expr in &self.config.watch {
            for (label, value) in expr.resolve(locals) {
                snapshot.push(label, value.render(self.config.render_budget));
            }
        }
        snapshot
    }

    /// Apply the report policy to a raw change set.
    ///
    /// UNCHANGED is opt-in; REMOVED is reported on LINE events only (on
    /// RETURN every local is trivially gone and only `return` matters).
    pub(crate) fn filter_changes(&self, changes: Vec<Change>, kind: EventKind) -> Vec<Change> {
        changes
            .into_iter()
            .filter(|c| match c.kind {
                ChangeKind::Added | ChangeKind::Changed => true,
                ChangeKind::Unchanged => self.config.report_unchanged,
                ChangeKind::Removed => kind == EventKind::Line,
            })
            .collect()
    }

    /// Format, write, and fan out to observers. Never fails.
    pub(crate) fn dispatch(&self, event: &TraceEvent) {
        let level = (self.config.level != Level::Debug).then_some(self.config.level);
        let line = self.formatter.render_event(event, self.config.prefix.as_deref(), level);
        output::deliver(self.sink.as_ref(), &line);
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

fn render_panic(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: <non-string payload>".to_string()
    }
}
