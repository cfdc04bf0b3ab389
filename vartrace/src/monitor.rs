//! Policy monitors built on the observer seam
//!
//! Representatives of the secondary-decorator family: they subscribe to
//! CALL/RETURN/EXCEPTION read-only and keep their own bookkeeping; they never
//! touch snapshots and cannot suppress engine emission. Both are cheap
//! enough to run inline on the traced thread.

// Duration conversions intentionally lose precision for display purposes
#![allow(clippy::cast_precision_loss)]

use crate::domain::CallId;
use crate::event::{EventKind, TraceEvent};
use crate::observe::TraceObserver;
use log::warn;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Flags calls whose CALL→RETURN span exceeds a threshold.
///
/// Alarms go through `log::warn!`; the flagged count is queryable for tests
/// and periodic reporting.
pub struct SlowCallMonitor {
    threshold_us: u64,
    in_flight: Mutex<HashMap<CallId, u64>>,
    flagged: AtomicU64,
}

impl SlowCallMonitor {
    #[must_use]
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold_us: u64::try_from(threshold.as_micros()).unwrap_or(u64::MAX),
            in_flight: Mutex::new(HashMap::new()),
            flagged: AtomicU64::new(0),
        }
    }

    /// Number of calls flagged so far.
    #[must_use]
    pub fn flagged(&self) -> u64 {
        self.flagged.load(Ordering::Relaxed)
    }
}

impl TraceObserver for SlowCallMonitor {
    fn on_event(&self, event: &TraceEvent) {
        let Ok(mut in_flight) = self.in_flight.lock() else {
            return;
        };
        match event.kind {
            EventKind::Call => {
                in_flight.insert(event.call_id, event.timestamp_us);
            }
            EventKind::Return | EventKind::Exception => {
                if let Some(started) = in_flight.remove(&event.call_id) {
                    let elapsed = event.timestamp_us.saturating_sub(started);
                    if elapsed > self.threshold_us {
                        self.flagged.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            "slow call: {}() took {:.1}ms (threshold {:.1}ms)",
                            event.function,
                            elapsed as f64 / 1_000.0,
                            self.threshold_us as f64 / 1_000.0,
                        );
                    }
                }
            }
            EventKind::Line => {}
        }
    }
}

/// Per-event-kind counters over the observed stream.
#[derive(Debug, Default)]
pub struct CallCounters {
    calls: AtomicU64,
    lines: AtomicU64,
    returns: AtomicU64,
    exceptions: AtomicU64,
}

/// Point-in-time view of [`CallCounters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub calls: u64,
    pub lines: u64,
    pub returns: u64,
    pub exceptions: u64,
}

impl CallCounters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            lines: self.lines.load(Ordering::Relaxed),
            returns: self.returns.load(Ordering::Relaxed),
            exceptions: self.exceptions.load(Ordering::Relaxed),
        }
    }
}

impl TraceObserver for CallCounters {
    fn on_event(&self, event: &TraceEvent) {
        let counter = match event.kind {
            EventKind::Call => &self.calls,
            EventKind::Line => &self.lines,
            EventKind::Return => &self.returns,
            EventKind::Exception => &self.exceptions,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
