//! Card identity, field snapshots, and partial edits.
//!
//! # Overview
//!
//! Cards themselves (creation, deletion, board membership) are owned by the
//! board CRUD layer. This module only models what the collaboration core
//! needs to version and diff a card:
//!
//! - [`CardRef`] — opaque identifier, scoped to one board.
//! - [`CardSnapshot`] — the full field values of a card at one version.
//! - [`CardPatch`] — a partial edit: each field optionally replaced.
//! - [`CardField`] — the closed field catalog used for field-level diffs,
//!   so no consumer can silently skip a field.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Identity newtypes
// ---------------------------------------------------------------------------

/// Opaque card identifier, scoped to one board.
///
/// Ordered and hashable so derived views (blocked sets, critical paths)
/// can be deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardRef(String);

impl CardRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identity of a collaborator, as provided by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// CardField
// ---------------------------------------------------------------------------

/// The closed catalog of editable card fields.
///
/// Field-level diffing and overlap detection iterate [`CardField::ALL`], so
/// adding a field here forces every diff consumer through the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardField {
    Title,
    Description,
    Column,
    Assignee,
    Labels,
}

impl CardField {
    /// All editable fields in catalog order.
    pub const ALL: [Self; 5] = [
        Self::Title,
        Self::Description,
        Self::Column,
        Self::Assignee,
        Self::Labels,
    ];

    /// Canonical `snake_case` name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Column => "column",
            Self::Assignee => "assignee",
            Self::Labels => "labels",
        }
    }
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CardSnapshot
// ---------------------------------------------------------------------------

/// The full field values of a card at one version.
///
/// Snapshots are immutable once stored in the version ledger; edits go
/// through [`CardPatch::apply_to`], which produces a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSnapshot {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// The board column the card currently sits in (e.g. `todo`, `doing`).
    pub column: String,
    #[serde(default)]
    pub assignee: Option<ActorId>,
    /// Sorted so snapshots with the same labels compare equal.
    #[serde(default)]
    pub labels: BTreeSet<String>,
}

impl CardSnapshot {
    /// Minimal snapshot for a freshly created card.
    pub fn new(title: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            column: column.into(),
            assignee: None,
            labels: BTreeSet::new(),
        }
    }

    /// The value of one field as JSON, for field-level diffs.
    pub fn field_value(&self, field: CardField) -> Value {
        match field {
            CardField::Title => Value::String(self.title.clone()),
            CardField::Description => Value::String(self.description.clone()),
            CardField::Column => Value::String(self.column.clone()),
            CardField::Assignee => self
                .assignee
                .as_ref()
                .map_or(Value::Null, |a| Value::String(a.as_str().to_string())),
            CardField::Labels => Value::Array(
                self.labels
                    .iter()
                    .map(|l| Value::String(l.clone()))
                    .collect(),
            ),
        }
    }

    /// Fields whose values differ between `self` and `other`.
    pub fn changed_fields_from(&self, other: &Self) -> Vec<CardField> {
        CardField::ALL
            .into_iter()
            .filter(|f| self.field_value(*f) != other.field_value(*f))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// CardPatch
// ---------------------------------------------------------------------------

/// A partial card edit: `Some` replaces the field, `None` leaves it alone.
///
/// `assignee` is doubly optional so an edit can distinguish "unchanged"
/// (`None`) from "clear the assignee" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub assignee: Option<Option<ActorId>>,
    #[serde(default)]
    pub labels: Option<BTreeSet<String>>,
}

impl CardPatch {
    /// An empty patch (changes nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the patch changes no field at all.
    ///
    /// Empty edits are rejected before they reach the ledger, so a version
    /// number is never spent on a no-op.
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// The fields this patch touches, in catalog order.
    pub fn changed_fields(&self) -> Vec<CardField> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push(CardField::Title);
        }
        if self.description.is_some() {
            fields.push(CardField::Description);
        }
        if self.column.is_some() {
            fields.push(CardField::Column);
        }
        if self.assignee.is_some() {
            fields.push(CardField::Assignee);
        }
        if self.labels.is_some() {
            fields.push(CardField::Labels);
        }
        fields
    }

    /// Apply the patch to a base snapshot, producing the edited snapshot.
    pub fn apply_to(&self, base: &CardSnapshot) -> CardSnapshot {
        let mut next = base.clone();
        if let Some(title) = &self.title {
            next.title = title.clone();
        }
        if let Some(description) = &self.description {
            next.description = description.clone();
        }
        if let Some(column) = &self.column {
            next.column = column.clone();
        }
        if let Some(assignee) = &self.assignee {
            next.assignee = assignee.clone();
        }
        if let Some(labels) = &self.labels {
            next.labels = labels.clone();
        }
        next
    }

    // Builder-style setters, used heavily in tests and by manual merges.

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_assignee(mut self, assignee: Option<ActorId>) -> Self {
        self.assignee = Some(assignee);
        self
    }

    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_changes_nothing() {
        let patch = CardPatch::new();
        assert!(patch.is_empty());
        assert!(patch.changed_fields().is_empty());

        let base = CardSnapshot::new("Ship login page", "todo");
        assert_eq!(patch.apply_to(&base), base);
    }

    #[test]
    fn patch_replaces_only_named_fields() {
        let base = CardSnapshot::new("Ship login page", "todo");
        let patch = CardPatch::new().with_column("doing");

        let next = patch.apply_to(&base);
        assert_eq!(next.column, "doing");
        assert_eq!(next.title, base.title);
        assert_eq!(next.description, base.description);
        assert_eq!(patch.changed_fields(), vec![CardField::Column]);
    }

    #[test]
    fn clearing_assignee_is_a_change() {
        let mut base = CardSnapshot::new("Ship login page", "doing");
        base.assignee = Some(ActorId::from("alice"));

        let patch = CardPatch::new().with_assignee(None);
        assert!(!patch.is_empty());

        let next = patch.apply_to(&base);
        assert_eq!(next.assignee, None);
    }

    #[test]
    fn changed_fields_from_detects_label_differences() {
        let base = CardSnapshot::new("Ship login page", "todo");
        let edited = CardPatch::new()
            .with_labels(["frontend", "auth"])
            .apply_to(&base);

        assert_eq!(edited.changed_fields_from(&base), vec![CardField::Labels]);
        // Label order never matters: BTreeSet sorts.
        let reordered = CardPatch::new()
            .with_labels(["auth", "frontend"])
            .apply_to(&base);
        assert_eq!(edited, reordered);
    }

    #[test]
    fn field_values_round_trip_as_json() {
        let mut snap = CardSnapshot::new("Ship login page", "todo");
        snap.assignee = Some(ActorId::from("bob"));
        snap.labels = ["auth"].into_iter().map(String::from).collect();

        assert_eq!(
            snap.field_value(CardField::Title),
            Value::String("Ship login page".into())
        );
        assert_eq!(
            snap.field_value(CardField::Assignee),
            Value::String("bob".into())
        );
        assert_eq!(
            snap.field_value(CardField::Labels),
            Value::Array(vec![Value::String("auth".into())])
        );

        let unassigned = CardSnapshot::new("x", "todo");
        assert_eq!(unassigned.field_value(CardField::Assignee), Value::Null);
    }

    #[test]
    fn card_refs_order_lexicographically() {
        let mut refs = vec![CardRef::from("c-3"), CardRef::from("c-1"), CardRef::from("c-2")];
        refs.sort();
        assert_eq!(
            refs.iter().map(CardRef::as_str).collect::<Vec<_>>(),
            vec!["c-1", "c-2", "c-3"]
        );
    }
}
