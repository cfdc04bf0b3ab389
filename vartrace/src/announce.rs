//! Ad-hoc announce interface
//!
//! One-shot leveled entries for call sites that want a better `println!`
//! without decorating anything: no diffing, no call-stack interaction, just
//! the formatter and a sink. Used through the [`show!`](crate::show) and
//! [`show_at!`](crate::show_at) macros.
//!
//! The process-wide default sink is the single piece of ambient state in the
//! crate; it is initialized once at the outermost composition boundary and
//! falls back to stderr.

use crate::domain::Level;
use crate::output::{self, Sink, StderrSink, TextFormatter};
use log::warn;
use std::fmt;
use std::sync::{Arc, OnceLock};

static DEFAULT_SINK: OnceLock<Arc<dyn Sink>> = OnceLock::new();

/// Install the process-wide sink used by the announce interface.
///
/// Effective only on the first call; returns `false` (and warns) if a sink
/// was already installed.
pub fn init_default_sink(sink: Arc<dyn Sink>) -> bool {
    if DEFAULT_SINK.set(sink).is_err() {
        warn!("default announce sink already installed; ignoring re-initialization");
        return false;
    }
    true
}

fn default_sink() -> &'static Arc<dyn Sink> {
    DEFAULT_SINK.get_or_init(|| Arc::new(StderrSink))
}

/// Emit one leveled, optionally prefixed entry through the default sink.
///
/// Prefer the [`show!`](crate::show) / [`show_at!`](crate::show_at) macros,
/// which build the `fmt::Arguments` for you.
pub fn announce(level: Level, prefix: Option<&str>, message: fmt::Arguments<'_>) {
    let line = TextFormatter::new().render_note(level, prefix, &message.to_string());
    output::deliver(default_sink().as_ref(), &line);
}

/// Same as [`announce`], but to an explicit sink (used by tests and by
/// callers that route announcements alongside a tracer's output).
pub fn announce_to(sink: &dyn Sink, level: Level, prefix: Option<&str>, message: fmt::Arguments<'_>) {
    let line = TextFormatter::new().render_note(level, prefix, &message.to_string());
    output::deliver(sink, &line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::BufferSink;

    #[test]
    fn test_announce_to_formats_levels() {
        let sink = BufferSink::new();
        announce_to(&sink, Level::Success, Some("AUTH"), format_args!("user {} authenticated", 7));
        assert_eq!(sink.lines(), vec!["[success] AUTH: user 7 authenticated"]);
    }

    #[test]
    fn test_announce_to_without_prefix() {
        let sink = BufferSink::new();
        announce_to(&sink, Level::Debug, None, format_args!("starting calculation"));
        assert_eq!(sink.lines(), vec!["[debug] starting calculation"]);
    }
}
