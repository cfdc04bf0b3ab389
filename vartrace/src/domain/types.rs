//! Core domain types
//!
//! Small newtypes and enums shared across the engine. Kept free of engine
//! logic so that sinks, observers and the replay tool can depend on them
//! without pulling in the tracer itself.

use serde::Serialize;
use std::fmt;

/// Unique identifier for one traced call invocation.
///
/// Allocated from a process-wide counter; never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CallId(pub u64);

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Source coordinate of an instrumentation point.
///
/// Built by the [`here!`](crate::here) macro from `file!()`/`line!()`, so the
/// file component is always a `'static` compile-time string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

impl SourceLocation {
    #[must_use]
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Severity level for announce-style entries and tracer labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Success,
}

impl Level {
    /// Tag rendered inside the bracketed marker, e.g. `[warning]`.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_id_display() {
        assert_eq!(CallId(42).to_string(), "#42");
    }

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation::new("src/demo.rs", 17);
        assert_eq!(loc.to_string(), "src/demo.rs:17");
    }

    #[test]
    fn test_level_tags() {
        assert_eq!(Level::Warning.to_string(), "warning");
        assert_eq!(Level::Success.tag(), "success");
    }
}
