//! Display-ready shapes built from one snapshot of an organization's records.
//!
//! Every view is assembled once per request and handed to the renderer as a
//! whole, so all consumers see the same classification.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::aggregate::{classify, classify_statuses, label_for, OverallStatus, StatusLabel};
use crate::classify::{
    most_recent_update, partition_incidents, partition_maintenances, recent_n, IncidentPartition,
    LatestUpdate, Recent,
};
use crate::error::Result;
use crate::types::{Incident, Maintenance, Organization, Service, ServiceGroup, ServiceStatus};

/// Per-status service counts. Every status is present, zero or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    counts: [usize; 5],
}

impl StatusCounts {
    pub fn get(&self, status: ServiceStatus) -> usize {
        self.counts[status.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ServiceStatus, usize)> + '_ {
        ServiceStatus::ALL
            .into_iter()
            .map(move |status| (status, self.get(status)))
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl Serialize for StatusCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ServiceStatus::ALL.len()))?;
        for (status, count) in self.iter() {
            map.serialize_entry(status.as_str(), &count)?;
        }
        map.end()
    }
}

pub fn build_service_status_counts(services: &[Service]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for service in services {
        counts.counts[service.status.index()] += 1;
    }
    counts
}

pub fn has_issues(services: &[Service]) -> bool {
    crate::aggregate::has_issues(services)
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupedServices<'a> {
    pub group: &'a ServiceGroup,
    pub services: Vec<&'a Service>,
    pub service_count: usize,
    /// Services in the group that are not operational.
    pub issue_count: usize,
    pub status: OverallStatus,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ServiceGrouping<'a> {
    pub groups: Vec<GroupedServices<'a>>,
    pub ungrouped: Vec<&'a Service>,
}

/// Groups keep the order they were supplied in; a repeated group id keeps only
/// its first position. Services pointing at unknown groups land in `ungrouped`.
pub fn group_services_by_group<'a>(
    services: &'a [Service],
    groups: &'a [ServiceGroup],
) -> ServiceGrouping<'a> {
    let mut slots: Vec<(&'a ServiceGroup, Vec<&'a Service>)> = Vec::with_capacity(groups.len());
    let mut index: HashMap<&'a str, usize> = HashMap::with_capacity(groups.len());
    for group in groups {
        if !index.contains_key(group.id.as_str()) {
            index.insert(group.id.as_str(), slots.len());
            slots.push((group, Vec::new()));
        }
    }

    let mut ungrouped = Vec::new();
    for service in services {
        let slot = service
            .group_id
            .as_deref()
            .and_then(|group_id| index.get(group_id).copied());
        match slot {
            Some(slot) => slots[slot].1.push(service),
            None => ungrouped.push(service),
        }
    }

    let groups = slots
        .into_iter()
        .map(|(group, services)| {
            let issue_count = services
                .iter()
                .filter(|service| service.status != ServiceStatus::Operational)
                .count();
            GroupedServices {
                group,
                service_count: services.len(),
                issue_count,
                status: classify_statuses(services.iter().map(|service| service.status)),
                services,
            }
        })
        .collect();

    ServiceGrouping { groups, ungrouped }
}

/// One maintenance window with the update a card shows for it.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRow<'a> {
    #[serde(flatten)]
    pub maintenance: &'a Maintenance,
    pub status_label: &'static str,
    pub latest_update: LatestUpdate<'a>,
}

impl<'a> MaintenanceRow<'a> {
    pub fn new(maintenance: &'a Maintenance) -> Self {
        MaintenanceRow {
            maintenance,
            status_label: maintenance.status.label(),
            latest_update: most_recent_update(maintenance),
        }
    }
}

fn rows<'a>(maintenances: &[&'a Maintenance]) -> Vec<MaintenanceRow<'a>> {
    maintenances.iter().map(|m| MaintenanceRow::new(*m)).collect()
}

fn plural(count: usize, noun: &str) -> String {
    if count > 1 {
        format!("{} {}s", count, noun)
    } else {
        format!("{} {}", count, noun)
    }
}

pub fn incident_summary(active: usize) -> String {
    if active == 0 {
        "No active incidents".to_string()
    } else {
        format!("{} being tracked", plural(active, "incident"))
    }
}

pub fn maintenance_summary(active: usize) -> String {
    if active == 0 {
        "No scheduled maintenance".to_string()
    } else {
        format!("{} planned", plural(active, "maintenance"))
    }
}

/// Organization dashboard: status card, counts and the recent lists.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView<'a> {
    pub overall: OverallStatus,
    pub label: StatusLabel,
    pub counts: StatusCounts,
    pub active_incident_count: usize,
    pub incident_summary: String,
    pub active_maintenance_count: usize,
    pub maintenance_summary: String,
    pub recent_incidents: Recent<'a, Incident>,
    pub recent_maintenances: Vec<MaintenanceRow<'a>>,
}

impl<'a> DashboardView<'a> {
    pub fn assemble(
        services: &'a [Service],
        incidents: &'a [Incident],
        maintenances: &'a [Maintenance],
        recent_limit: i64,
    ) -> Result<Self> {
        let overall = classify(services);
        let active_incident_count = partition_incidents(incidents).active_count();
        let maintenance = partition_maintenances(maintenances);
        let recent_active: Vec<&'a Maintenance> = recent_n(&maintenance.active, recent_limit)?
            .iter()
            .copied()
            .collect();

        Ok(DashboardView {
            overall,
            label: label_for(overall),
            counts: build_service_status_counts(services),
            active_incident_count,
            incident_summary: incident_summary(active_incident_count),
            active_maintenance_count: maintenance.active.len(),
            maintenance_summary: maintenance_summary(maintenance.active.len()),
            recent_incidents: recent_n(incidents, recent_limit)?,
            recent_maintenances: rows(&recent_active),
        })
    }
}

/// Services page: groups, ungrouped services and the tenant-wide badge.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ServicesView<'a> {
    pub overall: OverallStatus,
    pub has_issues: bool,
    pub counts: StatusCounts,
    pub grouping: ServiceGrouping<'a>,
}

impl<'a> ServicesView<'a> {
    pub fn assemble(services: &'a [Service], groups: &'a [ServiceGroup]) -> Self {
        let overall = classify(services);
        ServicesView {
            overall,
            has_issues: overall != OverallStatus::Operational,
            counts: build_service_status_counts(services),
            grouping: group_services_by_group(services, groups),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IncidentsView<'a> {
    pub active_count: usize,
    pub summary: String,
    #[serde(flatten)]
    pub partition: IncidentPartition<'a>,
}

impl<'a> IncidentsView<'a> {
    pub fn assemble(incidents: &'a [Incident]) -> Self {
        let partition = partition_incidents(incidents);
        IncidentsView {
            active_count: partition.active_count(),
            summary: incident_summary(partition.active_count()),
            partition,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceView<'a> {
    pub upcoming: Vec<MaintenanceRow<'a>>,
    pub in_progress: Vec<MaintenanceRow<'a>>,
    pub completed: Vec<MaintenanceRow<'a>>,
    pub active: Vec<MaintenanceRow<'a>>,
}

impl<'a> MaintenanceView<'a> {
    pub fn assemble(maintenances: &'a [Maintenance]) -> Self {
        let partition = partition_maintenances(maintenances);
        MaintenanceView {
            upcoming: rows(&partition.upcoming),
            in_progress: rows(&partition.in_progress),
            completed: rows(&partition.completed),
            active: rows(&partition.active),
        }
    }
}

/// Public status page for one organization.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StatusPageView<'a> {
    pub organization: &'a Organization,
    pub overall: OverallStatus,
    pub label: StatusLabel,
    pub has_issues: bool,
    pub grouping: ServiceGrouping<'a>,
    pub active_incidents: Vec<&'a Incident>,
    pub active_maintenances: Vec<MaintenanceRow<'a>>,
}

impl<'a> StatusPageView<'a> {
    pub fn assemble(
        organization: &'a Organization,
        services: &'a [Service],
        groups: &'a [ServiceGroup],
        incidents: &'a [Incident],
        maintenances: &'a [Maintenance],
    ) -> Self {
        let overall = classify(services);
        StatusPageView {
            organization,
            overall,
            label: label_for(overall),
            has_issues: overall != OverallStatus::Operational,
            grouping: group_services_by_group(services, groups),
            active_incidents: partition_incidents(incidents).active,
            active_maintenances: rows(&partition_maintenances(maintenances).active),
        }
    }
}
