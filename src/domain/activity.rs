//! Append-only audit trail of ledger mutations.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::*;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ExpenseAdded,
    ExpenseUpdated,
    ExpenseDeleted,
    MemberAdded,
    MemberRemoved,
    GroupUpdated,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActivityKind::ExpenseAdded => "expense_added",
            ActivityKind::ExpenseUpdated => "expense_updated",
            ActivityKind::ExpenseDeleted => "expense_deleted",
            ActivityKind::MemberAdded => "member_added",
            ActivityKind::MemberRemoved => "member_removed",
            ActivityKind::GroupUpdated => "group_updated",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    pub id: ActivityId,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl Identifiable for ActivityEntry {
    fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Newest-first activity sequence.
///
/// Entries are only ever prepended; timestamps never decrease from oldest to
/// newest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ActivityLog(Vec<ActivityEntry>);

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new entry at the head of the log and returns its id.
    ///
    /// `at` is clamped to the newest existing timestamp when the wall clock
    /// went backwards.
    pub fn record(
        &mut self,
        kind: ActivityKind,
        description: impl Into<String>,
        at: DateTime<Utc>,
    ) -> ActivityId {
        let timestamp = match self.latest_timestamp() {
            Some(latest) if latest > at => latest,
            _ => at,
        };
        let id = ActivityId::generate();
        self.0.insert(
            0,
            ActivityEntry {
                id: id.clone(),
                kind,
                description: description.into(),
                timestamp,
            },
        );
        id
    }

    /// The first `n` entries of the newest-first ordering.
    pub fn recent(&self, n: usize) -> &[ActivityEntry] {
        &self.0[..n.min(self.0.len())]
    }

    /// Drops everything but the newest `n` entries.
    pub fn retain_newest(&mut self, n: usize) {
        self.0.truncate(n);
    }

    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.0.first().map(|entry| entry.timestamp)
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<ActivityEntry>> for ActivityLog {
    fn from(entries: Vec<ActivityEntry>) -> Self {
        Self(entries)
    }
}
