// Dashboard domain model
use crate::domain::ids::DashboardId;
use crate::domain::widget::WidgetConfig;
use chrono::{DateTime, Utc};

pub const MAX_VERSIONS: usize = 20;

/// Stored copy of every widget configuration at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub widgets: Vec<WidgetConfig>,
}

impl Snapshot {
    pub fn new(timestamp: DateTime<Utc>, widgets: Vec<WidgetConfig>) -> Self {
        Self { timestamp, widgets }
    }
}

/// Bounded history of snapshots, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionHistory {
    entries: Vec<Snapshot>,
}

impl VersionHistory {
    pub fn from_entries(entries: Vec<Snapshot>) -> Self {
        Self { entries }
    }

    /// Append `snapshot` unless its widgets equal the latest entry's, then drop
    /// the oldest entries beyond `max`. Returns whether it was appended.
    pub fn record(&mut self, snapshot: Snapshot, max: usize) -> bool {
        if self
            .latest()
            .is_some_and(|last| last.widgets == snapshot.widgets)
        {
            return false;
        }
        self.entries.push(snapshot);
        if self.entries.len() > max {
            let excess = self.entries.len() - max;
            self.entries.drain(..excess);
        }
        true
    }

    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries most recent first, as listed in the history panel.
    pub fn newest_first(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter().rev()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub id: DashboardId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub widgets: Vec<WidgetConfig>,
    pub versions: VersionHistory,
    pub imported_from: Option<String>,
}

impl Dashboard {
    pub fn new(id: DashboardId, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at: now,
            updated_at: now,
            widgets: Vec::new(),
            versions: VersionHistory::default(),
            imported_from: None,
        }
    }
}
