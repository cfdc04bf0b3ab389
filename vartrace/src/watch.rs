//! Watch-expression parsing and resolution
//!
//! A watch expression surfaces a derived value next to the plain locals:
//!
//! - `point.velocity.x` - attribute path, traversed over structural fields
//! - `config['host','port']` - explicit keys into a mapping variable
//! - `samples[0,-1]` - explicit indices into a sequence (negative from end)
//! - `samples[*]` - explode every element into its own pseudo-variable
//!
//! Expressions are parsed once at decoration time ([`WatchExpr::parse`]) and
//! re-resolved against the captured scope on every execution step. Resolution
//! is read-only over already-captured value trees and can never fail the
//! traced call: every miss degrades to a [`CapturedValue::Error`] marker for
//! the affected label only, leaving sibling labels and plain locals intact.

use crate::domain::WatchParseError;
use crate::value::CapturedValue;
use serde_json::Value as JsonValue;

/// A parsed watch request, dispatched by variant during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchExpr {
    /// `a.b.c` - traverse structural fields starting at variable `a`.
    Attrs { path: Vec<String> },
    /// `m['k1','k2']` - select explicit keys of mapping variable `m`.
    Keys { var: String, keys: Vec<String> },
    /// `v[0,2,-1]` - select explicit indices of sequence variable `v`.
    Indices { var: String, indices: Vec<i64> },
    /// `v[*]` - one pseudo-variable per element of `v`.
    Explode { var: String },
}

impl WatchExpr {
    /// Parse the textual form. Called once when the tracer is built.
    pub fn parse(spec: &str) -> Result<Self, WatchParseError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(WatchParseError::Empty);
        }

        if let Some(open) = spec.find('[') {
            let Some(inner) = spec[open..].strip_prefix('[').and_then(|s| s.strip_suffix(']'))
            else {
                return Err(WatchParseError::UnterminatedSelector(spec.to_string()));
            };
            let var = spec[..open].trim();
            if var.is_empty() {
                return Err(WatchParseError::Empty);
            }

            if inner.trim() == "*" {
                return Ok(Self::Explode { var: var.to_string() });
            }
            return parse_selectors(spec, var, inner);
        }

        let path: Vec<String> = spec.split('.').map(str::trim).map(String::from).collect();
        if path.iter().any(String::is_empty) {
            return Err(WatchParseError::EmptySegment(spec.to_string()));
        }
        Ok(Self::Attrs { path })
    }

    /// Resolve against a captured scope into `(label, value)` pairs.
    ///
    /// Partial success is preserved: one bad key never suppresses the others.
    #[must_use]
    pub fn resolve(&self, scope: &[(&str, CapturedValue)]) -> Vec<(String, CapturedValue)> {
        match self {
            Self::Attrs { path } => vec![resolve_attrs(path, scope)],
            Self::Keys { var, keys } => keys
                .iter()
                .map(|key| {
                    let label = format!("{var}['{key}']");
                    let value = match lookup_structured(scope, var) {
                        Err(marker) => marker,
                        Ok(JsonValue::Object(map)) => map.get(key).map_or_else(
                            || CapturedValue::error(format!("no key '{key}'")),
                            |v| CapturedValue::Structured(v.clone()),
                        ),
                        Ok(_) => CapturedValue::error(format!("'{var}' is not a mapping")),
                    };
                    (label, value)
                })
                .collect(),
            Self::Indices { var, indices } => indices
                .iter()
                .map(|&index| {
                    let label = format!("{var}[{index}]");
                    let value = match lookup_structured(scope, var) {
                        Err(marker) => marker,
                        Ok(JsonValue::Array(items)) => normalize_index(index, items.len())
                            .and_then(|i| items.get(i))
                            .map_or_else(
                                || CapturedValue::error(format!("index {index} out of range")),
                                |v| CapturedValue::Structured(v.clone()),
                            ),
                        Ok(_) => CapturedValue::error(format!("'{var}' is not a sequence")),
                    };
                    (label, value)
                })
                .collect(),
            Self::Explode { var } => match lookup_structured(scope, var) {
                Err(marker) => vec![(var.clone(), marker)],
                Ok(JsonValue::Array(items)) => items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (format!("{var}[{i}]"), CapturedValue::Structured(v.clone())))
                    .collect(),
                Ok(JsonValue::Object(map)) => map
                    .iter()
                    .map(|(k, v)| (format!("{var}['{k}']"), CapturedValue::Structured(v.clone())))
                    .collect(),
                Ok(_) => {
                    vec![(var.clone(), CapturedValue::error(format!("'{var}' is not iterable")))]
                }
            },
        }
    }
}

fn parse_selectors(spec: &str, var: &str, inner: &str) -> Result<WatchExpr, WatchParseError> {
    let items: Vec<&str> = inner.split(',').map(str::trim).collect();
    if items.iter().any(|s| s.is_empty()) {
        return Err(WatchParseError::EmptySelector(spec.to_string()));
    }

    let quoted = |s: &str| {
        (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
            || (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
    };

    if items.iter().all(|s| quoted(s)) {
        let keys = items.iter().map(|s| s[1..s.len() - 1].to_string()).collect();
        return Ok(WatchExpr::Keys { var: var.to_string(), keys });
    }
    if items.iter().any(|s| quoted(s)) {
        return Err(WatchParseError::MixedSelectors(spec.to_string()));
    }

    let indices = items
        .iter()
        .map(|s| {
            s.parse::<i64>().map_err(|_| WatchParseError::InvalidIndex {
                expr: spec.to_string(),
                index: (*s).to_string(),
            })
        })
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(WatchExpr::Indices { var: var.to_string(), indices })
}

/// Walk an attribute path; any missing hop yields an error marker carrying
/// the failing segment.
fn resolve_attrs(path: &[String], scope: &[(&str, CapturedValue)]) -> (String, CapturedValue) {
    let label = path.join(".");
    let base = &path[0];

    let mut current = match lookup_structured(scope, base) {
        Ok(v) => v,
        Err(marker) => return (label, marker),
    };

    for segment in &path[1..] {
        match current {
            JsonValue::Object(map) => match map.get(segment) {
                Some(next) => current = next,
                None => {
                    return (label, CapturedValue::error(format!("no attribute '{segment}'")));
                }
            },
            _ => {
                return (
                    label,
                    CapturedValue::error(format!("'{segment}' reached a non-structural value")),
                );
            }
        }
    }

    (label, CapturedValue::Structured(current.clone()))
}

/// Find a variable in scope and require a structural capture.
fn lookup_structured<'a>(
    scope: &'a [(&str, CapturedValue)],
    name: &str,
) -> Result<&'a JsonValue, CapturedValue> {
    match scope.iter().find(|(n, _)| *n == name) {
        None => Err(CapturedValue::error(format!("name '{name}' is not defined"))),
        Some((_, CapturedValue::Structured(v))) => Ok(v),
        Some((_, CapturedValue::Opaque(ty))) => {
            Err(CapturedValue::error(format!("'{name}' is opaque ({ty})")))
        }
        Some((_, CapturedValue::Error(reason))) => Err(CapturedValue::error(reason.clone())),
    }
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    if index >= 0 {
        usize::try_from(index).ok().filter(|&i| i < len)
    } else {
        let back = usize::try_from(-index).ok()?;
        len.checked_sub(back)
    }
}
