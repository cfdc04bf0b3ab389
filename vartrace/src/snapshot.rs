//! Variable snapshots and the snapshot differ
//!
//! A [`VariableSnapshot`] is the rendered view of every binding visible at
//! one instrumentation point (locals plus resolved watch labels), in the
//! order the names first appeared. Snapshots are immutable once built; the
//! emitter compares consecutive snapshots of the same call with [`diff`].
//!
//! Equality is decided on the rendered representation, not on identity: two
//! re-bindings that render identically report as unchanged.

use serde::Serialize;

/// Immutable, insertion-ordered mapping from variable name to rendered value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableSnapshot {
    entries: Vec<(String, String)>,
}

impl VariableSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding. A repeated name overwrites its value in place, keeping
    /// the original position so reported order stays stable across steps.
    pub fn push(&mut self, name: impl Into<String>, rendered: String) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = rendered;
        } else {
            self.entries.push((name, rendered));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How a binding changed between two consecutive snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Changed,
    Unchanged,
    Removed,
}

/// One reported binding change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub name: String,
    pub kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new: Option<String>,
}

/// Compute the ordered change set between two snapshots.
///
/// Current-snapshot entries come first in their insertion order, then
/// removals in previous-snapshot order, so output is deterministic across
/// runs with the same execution path. The differ reports everything
/// including `Unchanged`; suppression is the emitter's policy, not ours.
#[must_use]
pub fn diff(previous: Option<&VariableSnapshot>, current: &VariableSnapshot) -> Vec<Change> {
    let mut changes = Vec::with_capacity(current.len());

    for (name, new) in current.iter() {
        let change = match previous.and_then(|p| p.get(name)) {
            None => Change {
                name: name.to_string(),
                kind: ChangeKind::Added,
                old: None,
                new: Some(new.to_string()),
            },
            Some(old) if old != new => Change {
                name: name.to_string(),
                kind: ChangeKind::Changed,
                old: Some(old.to_string()),
                new: Some(new.to_string()),
            },
            Some(_) => Change {
                name: name.to_string(),
                kind: ChangeKind::Unchanged,
                old: None,
                new: Some(new.to_string()),
            },
        };
        changes.push(change);
    }

    if let Some(previous) = previous {
        for (name, old) in previous.iter() {
            if current.get(name).is_none() {
                changes.push(Change {
                    name: name.to_string(),
                    kind: ChangeKind::Removed,
                    old: Some(old.to_string()),
                    new: None,
                });
            }
        }
    }

    changes
}
