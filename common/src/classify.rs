//! Buckets incidents and maintenance windows for display, and picks the
//! "recent N" slices every list view shows.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Result, StatusError};
use crate::types::{Incident, Maintenance, MaintenanceStatus, MaintenanceUpdate, Service};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IncidentPartition<'a> {
    pub active: Vec<&'a Incident>,
    pub resolved: Vec<&'a Incident>,
}

impl IncidentPartition<'_> {
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

pub fn partition_incidents(incidents: &[Incident]) -> IncidentPartition<'_> {
    let (resolved, active): (Vec<&Incident>, Vec<&Incident>) = incidents
        .iter()
        .partition(|incident| incident.status.is_resolved());
    IncidentPartition { active, resolved }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaintenancePartition<'a> {
    pub upcoming: Vec<&'a Maintenance>,
    pub in_progress: Vec<&'a Maintenance>,
    pub completed: Vec<&'a Maintenance>,
    /// Every `scheduled` entry, then every `in_progress` entry, each in input order.
    pub active: Vec<&'a Maintenance>,
}

pub fn partition_maintenances(maintenances: &[Maintenance]) -> MaintenancePartition<'_> {
    let mut upcoming = Vec::new();
    let mut in_progress = Vec::new();
    let mut completed = Vec::new();
    for maintenance in maintenances {
        match maintenance.status {
            MaintenanceStatus::Scheduled => upcoming.push(maintenance),
            MaintenanceStatus::InProgress => in_progress.push(maintenance),
            MaintenanceStatus::Completed => completed.push(maintenance),
        }
    }
    let active = upcoming.iter().chain(in_progress.iter()).copied().collect();
    MaintenancePartition {
        upcoming,
        in_progress,
        completed,
        active,
    }
}

/// The timestamp "recent" lists sort on.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Timestamped for Incident {
    fn timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Timestamped for Maintenance {
    fn timestamp(&self) -> DateTime<Utc> {
        self.start_at
    }
}

impl Timestamped for MaintenanceUpdate {
    fn timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Timestamped for Service {
    fn timestamp(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl<T: Timestamped + ?Sized> Timestamped for &T {
    fn timestamp(&self) -> DateTime<Utc> {
        (**self).timestamp()
    }
}

/// Most-recent-first view over borrowed records. Iterating does not consume it,
/// so a view can be walked any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct Recent<'a, T> {
    items: Vec<&'a T>,
}

impl<'a, T> Recent<'a, T> {
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, &'a T>> {
        self.items.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[&'a T] {
        &self.items
    }
}

impl<'a, 'r, T> IntoIterator for &'r Recent<'a, T> {
    type Item = &'a T;
    type IntoIter = std::iter::Copied<std::slice::Iter<'r, &'a T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Serialize> Serialize for Recent<'_, T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// The `n` most recent entries by [`Timestamped::timestamp`], newest first.
pub fn recent_n<T: Timestamped>(items: &[T], n: i64) -> Result<Recent<'_, T>> {
    recent_n_by(items, n, T::timestamp)
}

/// Like [`recent_n`] with an explicit sort key. Equal keys keep input order.
pub fn recent_n_by<T, K, F>(items: &[T], n: i64, key: F) -> Result<Recent<'_, T>>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    if n < 0 {
        return Err(StatusError::InvalidArgument(format!(
            "recent item count must be non-negative, got {}",
            n
        )));
    }
    let limit = usize::try_from(n).unwrap_or(usize::MAX);
    if limit == 0 {
        return Ok(Recent { items: Vec::new() });
    }

    let mut refs: Vec<&T> = items.iter().collect();
    refs.sort_by(|a, b| key(*b).cmp(&key(*a)));
    refs.truncate(limit);
    Ok(Recent { items: refs })
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LatestUpdate<'a> {
    Update(&'a MaintenanceUpdate),
    NoUpdates,
}

impl<'a> LatestUpdate<'a> {
    pub fn update(self) -> Option<&'a MaintenanceUpdate> {
        match self {
            LatestUpdate::Update(update) => Some(update),
            LatestUpdate::NoUpdates => None,
        }
    }
}

impl fmt::Display for LatestUpdate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatestUpdate::Update(update) => f.write_str(&update.message),
            LatestUpdate::NoUpdates => f.write_str("No updates"),
        }
    }
}

pub fn most_recent_update(maintenance: &Maintenance) -> LatestUpdate<'_> {
    // Stored order is not trusted; pick by timestamp, first one wins a tie.
    let mut latest: Option<&MaintenanceUpdate> = None;
    for update in &maintenance.updates {
        match latest {
            Some(current) if current.created_at >= update.created_at => {}
            _ => latest = Some(update),
        }
    }
    latest.map_or(LatestUpdate::NoUpdates, LatestUpdate::Update)
}
