//! Output sinks and text formatting
//!
//! The engine depends only on the append-only [`Sink`] capability. Each
//! rendered event reaches the sink as one atomic line; the sink is the only
//! resource shared across threads and serializes concurrent appends
//! internally. A write failure is caught at [`deliver`], reported once, and
//! otherwise dropped: instrumentation failure can never crash or alter the
//! traced program.

pub mod text;

pub use text::TextFormatter;

use crate::domain::SinkError;
use log::warn;
use std::io::Write;
use std::sync::{Mutex, Once};

/// An append-only output destination.
pub trait Sink: Send + Sync {
    /// Append one rendered line. Must deliver the line atomically with
    /// respect to concurrent appends.
    fn append(&self, line: &str) -> Result<(), SinkError>;
}

/// Write rendered lines to stderr (the default destination).
#[derive(Debug, Default)]
pub struct StderrSink;

impl Sink for StderrSink {
    fn append(&self, line: &str) -> Result<(), SinkError> {
        // The stderr lock serializes concurrent appends
        let mut err = std::io::stderr().lock();
        writeln!(err, "{line}")?;
        Ok(())
    }
}

/// Adapt any `Write` into a sink, serializing appends with a mutex.
pub struct WriteSink<W: Write + Send> {
    inner: Mutex<W>,
}

impl<W: Write + Send> WriteSink<W> {
    pub fn new(writer: W) -> Self {
        Self { inner: Mutex::new(writer) }
    }

    /// Recover the underlying writer (e.g. to flush and close a file).
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.inner.into_inner().map_err(|_| SinkError::Poisoned)
    }
}

impl<W: Write + Send> Sink for WriteSink<W> {
    fn append(&self, line: &str) -> Result<(), SinkError> {
        let mut writer = self.inner.lock().map_err(|_| SinkError::Poisoned)?;
        writeln!(writer, "{line}")?;
        Ok(())
    }
}

/// In-memory sink for tests and programmatic capture.
#[derive(Debug, Default)]
pub struct BufferSink {
    lines: Mutex<Vec<String>>,
}

impl BufferSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Drain the captured lines.
    #[must_use]
    pub fn take(&self) -> Vec<String> {
        self.lines.lock().map(|mut l| std::mem::take(&mut *l)).unwrap_or_default()
    }
}

impl Sink for BufferSink {
    fn append(&self, line: &str) -> Result<(), SinkError> {
        self.lines.lock().map_err(|_| SinkError::Poisoned)?.push(line.to_string());
        Ok(())
    }
}

/// Deliver a rendered line, swallowing sink failures.
///
/// The first failure in the process is surfaced through `log::warn!`;
/// subsequent ones are dropped silently, never retried.
pub(crate) fn deliver(sink: &dyn Sink, line: &str) {
    static SINK_FAILURE_REPORTED: Once = Once::new();
    if let Err(e) = sink.append(line) {
        SINK_FAILURE_REPORTED.call_once(|| {
            warn!("trace sink rejected write ({e}); further sink failures are dropped");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_sink_captures_lines() {
        let sink = BufferSink::new();
        sink.append("one").unwrap();
        sink.append("two").unwrap();
        assert_eq!(sink.lines(), vec!["one", "two"]);
        assert_eq!(sink.take(), vec!["one", "two"]);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_write_sink_appends_newline() {
        let sink = WriteSink::new(Vec::new());
        sink.append("hello").unwrap();
        let buf = sink.into_inner().unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "hello\n");
    }

    #[test]
    fn test_deliver_swallows_failures() {
        struct FailingSink;
        impl Sink for FailingSink {
            fn append(&self, _: &str) -> Result<(), SinkError> {
                Err(SinkError::Io(std::io::Error::other("disk full")))
            }
        }
        // Must not panic or propagate
        deliver(&FailingSink, "line");
        deliver(&FailingSink, "line");
    }
}
