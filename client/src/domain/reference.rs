//! Identifier normalisation for heterogeneous remote references.
//!
//! The resource store is not consistent about how it encodes a reference to
//! another record: the same logical link may arrive as a bare number, a bare
//! string, a nested object carrying an `id` field, or be missing entirely.
//! Every comparison in the crate goes through [`CanonicalId`] so that a
//! numeric `3` and a string `"3"` join correctly, and so that two missing
//! references never accidentally match each other.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A reference value exactly as the remote store serialised it.
///
/// Deserialisation is untagged: the wire shape decides the variant. Nested
/// objects keep only their `id` field; the surrounding payload (for example a
/// fully embedded course inside an enrollment) is deliberately discarded so
/// that no view is ever computed from stale embedded copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRef {
    /// Numeric identifier, e.g. `3`.
    Number(i64),
    /// String identifier, e.g. `"3"` or `"a1f4"`.
    Text(String),
    /// Nested object exposing an `id`-like field, e.g. `{"id": 3, ...}`.
    Nested(NestedRef),
}

/// The `id` carrier inside a nested reference object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedRef {
    /// Inner identifier; may itself be numeric or string, or absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Box<RawRef>>,
}

impl RawRef {
    /// Wrap an identifier in the nested `{"id": ...}` shape the store uses
    /// for foreign keys sent back on create/update bodies.
    pub fn into_nested(self) -> Self {
        Self::Nested(NestedRef {
            id: Some(Box::new(self)),
        })
    }

    /// Reduce this raw value to its canonical comparison form.
    pub fn canonical(&self) -> CanonicalId {
        match self {
            Self::Number(value) => CanonicalId::Resolved(value.to_string()),
            Self::Text(value) if value.is_empty() => CanonicalId::Unresolved,
            Self::Text(value) => CanonicalId::Resolved(value.clone()),
            Self::Nested(nested) => nested
                .id
                .as_deref()
                .map_or(CanonicalId::Unresolved, RawRef::canonical),
        }
    }
}

/// Canonical, comparison-safe form of an entity reference.
///
/// `Unresolved` is the sentinel for an absent or empty reference. It is a
/// distinct value under `==` (so it can key maps), but [`CanonicalId::matches`]
/// (the predicate every join uses) treats it as matching nothing, including
/// another `Unresolved`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalId {
    /// A concrete identifier rendered as a string.
    Resolved(String),
    /// Absent or empty reference; never joins to anything.
    Unresolved,
}

impl CanonicalId {
    /// Construct a resolved identifier. Intended for callers that hold an id
    /// from the UI layer (route parameters, selection state).
    pub fn resolved(id: impl Into<String>) -> Self {
        Self::Resolved(id.into())
    }

    /// Whether this identifier carries a concrete value.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// The raw string form, if resolved.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Resolved(value) => Some(value.as_str()),
            Self::Unresolved => None,
        }
    }

    /// Join predicate: true only when both sides are resolved and equal.
    pub fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Resolved(a), Self::Resolved(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(value) => f.write_str(value),
            Self::Unresolved => f.write_str("(unresolved)"),
        }
    }
}

/// Normalise a possibly-absent reference. Total and pure: the worst outcome
/// is [`CanonicalId::Unresolved`].
pub fn normalize(reference: Option<&RawRef>) -> CanonicalId {
    reference.map_or(CanonicalId::Unresolved, RawRef::canonical)
}

/// Normalise the first reference in a fallback chain that resolves.
///
/// Enrollment records spell their foreign keys in several dialects
/// (`studentId`, `userId`, nested `student`); the chain mirrors the order the
/// original views consulted companion fields.
pub fn normalize_chain<'a, I>(references: I) -> CanonicalId
where
    I: IntoIterator<Item = Option<&'a RawRef>>,
{
    for reference in references {
        let id = normalize(reference);
        if id.is_resolved() {
            return id;
        }
    }
    CanonicalId::Unresolved
}
