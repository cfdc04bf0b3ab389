//! Structured error types for vartrace
//!
//! Using thiserror for automatic Display implementation and error chaining.
//!
//! Note the deliberate asymmetry with the rest of the engine: watch-expression
//! *resolution* failures and value *rendering* failures are not errors at all,
//! they degrade to marker values inside the event stream (see
//! [`crate::value::CapturedValue`]). Only construction-time problems (a watch
//! expression that cannot be parsed) and sink writes surface as `Result`s.

use thiserror::Error;

/// A watch expression string could not be parsed at decoration time.
#[derive(Error, Debug)]
pub enum WatchParseError {
    #[error("empty watch expression")]
    Empty,

    #[error("watch expression `{0}` has an unterminated selector (missing `]`)")]
    UnterminatedSelector(String),

    #[error("watch expression `{0}` has an empty selector")]
    EmptySelector(String),

    #[error("watch expression `{0}` mixes quoted keys and numeric indices")]
    MixedSelectors(String),

    #[error("invalid index `{index}` in watch expression `{expr}`")]
    InvalidIndex { expr: String, index: String },

    #[error("invalid attribute path `{0}` (empty segment)")]
    EmptySegment(String),
}

/// The output destination rejected a write.
///
/// Caught at the dispatch boundary and reported once; never propagated to the
/// traced program.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("sink lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_parse_error_display() {
        let err = WatchParseError::UnterminatedSelector("v[0".to_string());
        assert_eq!(err.to_string(), "watch expression `v[0` has an unterminated selector (missing `]`)");
    }

    #[test]
    fn test_invalid_index_display() {
        let err = WatchParseError::InvalidIndex {
            expr: "v[x]".to_string(),
            index: "x".to_string(),
        };
        assert!(err.to_string().contains("v[x]"));
        assert!(err.to_string().contains('x'));
    }
}
