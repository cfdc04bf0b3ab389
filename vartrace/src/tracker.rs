//! Call-stack tracking
//!
//! One independent stack per thread of control, held in a `thread_local!`:
//! concurrent invocations never observe or mutate each other's entries, and
//! the hot path takes no locks. Each entry carries the most recent snapshot
//! for its call, which is what gives nested calls their own diff lineage.
//!
//! Depth here is presentation and recursion-cost control only: it drives
//! indentation and LINE gating, nothing else.

use crate::domain::CallId;
use crate::snapshot::VariableSnapshot;
use log::warn;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CALL_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique call id.
pub fn next_call_id() -> CallId {
    CallId(NEXT_CALL_ID.fetch_add(1, Ordering::Relaxed))
}

/// Per-invocation bookkeeping on the owning thread's stack.
pub(crate) struct CallStackEntry {
    pub(crate) call_id: CallId,
    /// Entered beyond the configured depth: entry/exit only, no line detail.
    pub(crate) gated: bool,
    pub(crate) last_snapshot: Option<VariableSnapshot>,
}

thread_local! {
    static STACK: RefCell<Vec<CallStackEntry>> = const { RefCell::new(Vec::new()) };
}

/// Current nesting depth on this thread (0 = no active traced call).
#[must_use]
pub fn depth() -> usize {
    STACK.with(|s| s.borrow().len())
}

/// Push an entry for a call entered at the current depth; returns that depth.
pub(crate) fn enter(call_id: CallId, gated: bool) -> usize {
    STACK.with(|s| {
        let mut stack = s.borrow_mut();
        let depth = stack.len();
        stack.push(CallStackEntry { call_id, gated, last_snapshot: None });
        depth
    })
}

/// Pop the top entry. Called exactly once per entered call, on both the
/// return and the unwind path.
pub(crate) fn exit(call_id: CallId) {
    STACK.with(|s| {
        let mut stack = s.borrow_mut();
        match stack.pop() {
            Some(entry) if entry.call_id == call_id => {}
            Some(entry) => {
                warn!("call stack mismatch: expected {call_id}, popped {}", entry.call_id);
            }
            None => warn!("call stack underflow popping {call_id}"),
        }
    });
}

/// Run `f` against the top entry, if any.
pub(crate) fn with_top<R>(f: impl FnOnce(&mut CallStackEntry) -> R) -> Option<R> {
    STACK.with(|s| s.borrow_mut().last_mut().map(f))
}

/// Store the latest snapshot for the active call.
pub(crate) fn record_snapshot(snapshot: VariableSnapshot) {
    with_top(|entry| entry.last_snapshot = Some(snapshot));
}
