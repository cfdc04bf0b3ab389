//! # vartrace - Statement-Level Execution Tracing
//!
//! vartrace reports, for an instrumented call, which source line ran and
//! which local variables changed value since the previous observed line,
//! with bounded overhead and without altering the traced program's
//! semantics: every internal failure degrades to placeholder text in the
//! output, and exceptions propagate to the caller unchanged.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Traced Application                      │
//! │        trace_call(..) { step!(s, x, y); .. }                │
//! └──────────────────────────┬──────────────────────────────────┘
//!                            │ (location, scope-snapshot) pairs
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   vartrace (This Crate)                     │
//! │                                                             │
//! │  ┌───────────┐   ┌──────────┐   ┌──────────┐   ┌─────────┐ │
//! │  │  Watch    │──▶│ Snapshot │──▶│ Session  │──▶│ Output  │ │
//! │  │ Resolver  │   │  Differ  │   │ (events) │   │ (sinks) │ │
//! │  └───────────┘   └──────────┘   └────┬─────┘   └─────────┘ │
//! │                                      │                      │
//! │                                      ▼                      │
//! │                     ┌──────────┐   ┌──────────┐            │
//! │                     │ Monitors │   │  Export  │            │
//! │                     │ (policy) │   │ (chrome) │            │
//! │                     └──────────┘   └──────────┘            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! ### Core Pipeline Modules
//!
//! - [`tracer`]: decoration interface (builder, entry points, dispatch)
//! - [`session`]: per-call state machine (CALL → LINE* → RETURN/EXCEPTION)
//! - [`tracker`]: per-thread call stacks, depth gating, call-id allocation
//! - [`snapshot`]: insertion-ordered snapshots and the change differ
//! - [`watch`]: watch-expression parsing and read-only resolution
//! - [`value`]: structural value capture and bounded rendering
//!
//! ### Output and Integration Modules
//!
//! - [`output`]: pluggable sinks and the text formatter
//! - [`announce`]: ad-hoc leveled entries ([`show!`]/[`show_at!`])
//! - [`observe`]: read-only observer seam for policy wrappers
//! - [`monitor`]: slow-call alarms and call accounting
//! - [`export`]: Chrome Trace Event Format export
//! - [`replay`]: offline parsing of exported traces
//! - [`cli`]: command-line arguments for the inspection binary
//!
//! ## Typical Usage
//!
//! ```
//! use vartrace::{here, locals, step, Tracer};
//!
//! let tracer = Tracer::builder()
//!     .watch("samples[*]")
//!     .depth(2)
//!     .build()
//!     .expect("valid watch expressions");
//!
//! let doubled = tracer.trace_call("double", here!(), locals![], |s| {
//!     let samples = vec![1, 2];
//!     let x = 5;
//!     step!(s, samples, x);
//!     x * 2
//! });
//! assert_eq!(doubled, 10);
//! ```
//!
//! ## Key Concepts
//!
//! - **Instrumentation points**: compiled code has no ambient line hook, so
//!   the traced body marks statement boundaries with [`step!`]
//! - **Structural capture**: values cross the boundary as serde trees,
//!   which is what watch expressions traverse
//! - **Rendered equality**: diffing compares rendered forms, bounding output
//!   for loops that touch large objects without semantic change
//! - **Depth gating**: nested calls beyond the configured depth keep their
//!   call/return skeleton but skip line detail

// Expose modules for testing
pub mod announce;
pub mod cli;
pub mod domain;
pub mod event;
pub mod export;
mod macros;
pub mod monitor;
pub mod observe;
pub mod output;
pub mod replay;
pub mod session;
pub mod snapshot;
pub mod tracer;
pub mod tracker;
pub mod value;
pub mod watch;

// Re-export the working surface for convenience
pub use domain::{CallId, Level, SinkError, SourceLocation, WatchParseError};
pub use event::{EventKind, TraceEvent};
pub use observe::{ChannelObserver, TraceObserver};
pub use output::{BufferSink, Sink, StderrSink, TextFormatter, WriteSink};
pub use session::TraceSession;
pub use snapshot::{diff, Change, ChangeKind, VariableSnapshot};
pub use tracer::{Tracer, TracerBuilder};
pub use value::{CapturedValue, Locals};
pub use watch::WatchExpr;
