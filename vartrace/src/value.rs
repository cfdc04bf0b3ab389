//! Value capture and rendering
//!
//! Variables cross the instrumentation boundary as [`CapturedValue`]s: a
//! structural `serde_json::Value` tree for anything that serializes, and a
//! placeholder for anything that does not. The structural form is what makes
//! watch-expression traversal (attribute paths, keys, indices, explode)
//! possible without runtime reflection.
//!
//! Rendering never fails: serialization failure degrades to a `<TypeName>`
//! placeholder and oversize renderings are truncated, so a value can slow the
//! trace down by at most one bounded string build.

use serde::Serialize;
use serde_json::Value as JsonValue;

/// Default rendering budget in characters.
pub const DEFAULT_RENDER_BUDGET: usize = 100;

/// Named local bindings captured at one instrumentation point.
///
/// Built by the [`locals!`](crate::locals) macro; names come from
/// `stringify!` so they are always `'static`.
pub type Locals = Vec<(&'static str, CapturedValue)>;

/// A variable value as seen by the tracer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedValue {
    /// Structural capture of a `Serialize` value.
    Structured(JsonValue),
    /// The value could not be serialized; only its type name is known.
    Opaque(&'static str),
    /// A watch expression failed to resolve; carries the failure reason.
    Error(String),
}

impl CapturedValue {
    /// Capture a value structurally, falling back to an opaque placeholder
    /// when serialization fails.
    pub fn capture<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => Self::Structured(v),
            Err(_) => Self::Opaque(std::any::type_name::<T>()),
        }
    }

    /// Error marker for a failed watch resolution.
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error(reason.into())
    }

    /// The structural form, if this value has one.
    #[must_use]
    pub fn as_structured(&self) -> Option<&JsonValue> {
        match self {
            Self::Structured(v) => Some(v),
            _ => None,
        }
    }

    /// Render to the stable textual form used for diffing and display.
    ///
    /// Two values that render identically are treated as unchanged by the
    /// differ, which bounds output volume for loops touching large objects
    /// without semantic change.
    #[must_use]
    pub fn render(&self, budget: usize) -> String {
        let full = match self {
            Self::Structured(v) => {
                serde_json::to_string(v).unwrap_or_else(|_| "<unrenderable>".to_string())
            }
            Self::Opaque(ty) => format!("<{ty}>"),
            Self::Error(reason) => format!("<unavailable: {reason}>"),
        };
        truncate(full, budget)
    }
}

/// Truncate to `budget` characters, appending a marker with the elided count.
fn truncate(s: String, budget: usize) -> String {
    let total = s.chars().count();
    if total <= budget {
        return s;
    }
    let head: String = s.chars().take(budget).collect();
    format!("{head}...(+{})", total - budget)
}
