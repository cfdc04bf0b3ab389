//! Observer seam for policy wrappers
//!
//! Secondary decorators (threshold alarms, call accounting, export) consume
//! the event stream as read-only observers: they see every CALL/LINE/RETURN/
//! EXCEPTION the engine emits, after the formatter, and can neither mutate
//! snapshots nor suppress emission.

use crate::event::TraceEvent;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Read-only subscriber to the engine's event stream.
///
/// `on_event` runs inline on the traced thread, so implementations must stay
/// bounded and non-blocking.
pub trait TraceObserver: Send + Sync {
    fn on_event(&self, event: &TraceEvent);
}

/// Bridge the observer seam to a bounded channel for out-of-thread consumers.
///
/// Delivery is non-blocking: when the consumer falls behind, events are
/// dropped and counted rather than stalling the traced program.
pub struct ChannelObserver {
    tx: Sender<TraceEvent>,
    dropped: AtomicU64,
}

impl ChannelObserver {
    /// Create an observer and the receiving end of its channel.
    #[must_use]
    pub fn bounded(capacity: usize) -> (Arc<Self>, Receiver<TraceEvent>) {
        let (tx, rx) = bounded(capacity);
        (Arc::new(Self { tx, dropped: AtomicU64::new(0) }), rx)
    }

    /// Number of events dropped because the channel was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl TraceObserver for ChannelObserver {
    fn on_event(&self, event: &TraceEvent) {
        if self.tx.try_send(event.clone()).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CallId;
    use crate::event::EventKind;

    fn event() -> TraceEvent {
        TraceEvent {
            call_id: CallId(1),
            kind: EventKind::Call,
            function: "f".to_string(),
            file: "src/demo.rs",
            line: 1,
            depth: 0,
            timestamp_us: 0,
            changes: Vec::new(),
            detail: None,
        }
    }

    #[test]
    fn test_channel_observer_delivers() {
        let (obs, rx) = ChannelObserver::bounded(4);
        obs.on_event(&event());
        assert_eq!(rx.recv().unwrap().kind, EventKind::Call);
        assert_eq!(obs.dropped(), 0);
    }

    #[test]
    fn test_channel_observer_drops_when_full() {
        let (obs, rx) = ChannelObserver::bounded(1);
        obs.on_event(&event());
        obs.on_event(&event());
        assert_eq!(obs.dropped(), 1);
        drop(rx);
    }
}
