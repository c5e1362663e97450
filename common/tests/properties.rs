use chrono::{DateTime, Duration, TimeZone, Utc};
use common::{
    build_service_status_counts, classify, group_services_by_group, partition_incidents,
    partition_maintenances, recent_n, Impact, Incident, IncidentStatus, Maintenance,
    MaintenanceStatus, OverallStatus, Service, ServiceGroup, ServiceStatus, StatusError,
};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn service_status() -> impl Strategy<Value = ServiceStatus> {
    prop::sample::select(ServiceStatus::ALL.to_vec())
}

fn incident_status() -> impl Strategy<Value = IncidentStatus> {
    prop::sample::select(vec![
        IncidentStatus::Investigating,
        IncidentStatus::Identified,
        IncidentStatus::Monitoring,
        IncidentStatus::Resolved,
    ])
}

fn maintenance_status() -> impl Strategy<Value = MaintenanceStatus> {
    prop::sample::select(vec![
        MaintenanceStatus::Scheduled,
        MaintenanceStatus::InProgress,
        MaintenanceStatus::Completed,
    ])
}

fn services_from(entries: Vec<(ServiceStatus, Option<u8>)>) -> Vec<Service> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, (status, group))| Service {
            id: format!("svc-{}", i),
            organization_id: "org".to_string(),
            name: format!("service {}", i),
            description: String::new(),
            status,
            group_id: group.map(|g| format!("grp-{}", g)),
            updated_at: at(i as i64),
        })
        .collect()
}

fn incidents_from(entries: Vec<(IncidentStatus, i64)>) -> Vec<Incident> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, (status, minutes))| Incident {
            id: format!("inc-{}", i),
            organization_id: "org".to_string(),
            title: format!("incident {}", i),
            status,
            impact: Impact::Minor,
            created_at: at(minutes),
            service_ids: vec![],
        })
        .collect()
}

fn maintenances_from(entries: Vec<(MaintenanceStatus, i64)>) -> Vec<Maintenance> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, (status, minutes))| Maintenance {
            id: format!("mnt-{}", i),
            organization_id: "org".to_string(),
            title: format!("window {}", i),
            description: String::new(),
            status,
            start_at: at(minutes),
            end_at: at(minutes + 60),
            service_ids: vec![],
            updates: vec![],
        })
        .collect()
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn any_major_outage_dominates(
        generated in prop::collection::vec(service_status(), 0..20),
        position in any::<prop::sample::Index>(),
    ) {
        let mut statuses = generated;
        let at_index = position.index(statuses.len() + 1);
        statuses.insert(at_index, ServiceStatus::MajorOutage);
        let services = services_from(statuses.into_iter().map(|s| (s, None)).collect());
        prop_assert_eq!(classify(&services), OverallStatus::MajorOutage);
    }

    #[test]
    fn degraded_or_maintenance_without_outage_is_degraded(
        statuses in prop::collection::vec(
            prop::sample::select(vec![
                ServiceStatus::Operational,
                ServiceStatus::Degraded,
                ServiceStatus::Maintenance,
            ]),
            1..20,
        ),
    ) {
        prop_assume!(statuses.iter().any(|s| *s != ServiceStatus::Operational));
        let services = services_from(statuses.into_iter().map(|s| (s, None)).collect());
        prop_assert_eq!(classify(&services), OverallStatus::Degraded);
    }

    #[test]
    fn classification_ignores_order(
        statuses in prop::collection::vec(service_status(), 0..20),
    ) {
        let forward = services_from(statuses.iter().map(|s| (*s, None)).collect());
        let backward = services_from(statuses.iter().rev().map(|s| (*s, None)).collect());
        prop_assert_eq!(classify(&forward), classify(&backward));
    }

    #[test]
    fn incident_partition_is_complete_and_disjoint(
        entries in prop::collection::vec((incident_status(), 0i64..10_000), 0..30),
    ) {
        let incidents = incidents_from(entries);
        let partition = partition_incidents(&incidents);
        prop_assert_eq!(partition.active.len() + partition.resolved.len(), incidents.len());
        prop_assert!(partition.resolved.iter().all(|i| i.status == IncidentStatus::Resolved));
        prop_assert!(partition.active.iter().all(|i| i.status != IncidentStatus::Resolved));
        for incident in &incidents {
            let in_active = partition.active.iter().any(|i| i.id == incident.id);
            let in_resolved = partition.resolved.iter().any(|i| i.id == incident.id);
            prop_assert!(in_active != in_resolved);
        }
    }

    #[test]
    fn active_maintenance_has_scheduled_first(
        entries in prop::collection::vec((maintenance_status(), 0i64..10_000), 0..30),
    ) {
        let maintenances = maintenances_from(entries);
        let partition = partition_maintenances(&maintenances);
        let first_in_progress = partition
            .active
            .iter()
            .position(|m| m.status == MaintenanceStatus::InProgress)
            .unwrap_or(partition.active.len());
        prop_assert!(partition.active[..first_in_progress]
            .iter()
            .all(|m| m.status == MaintenanceStatus::Scheduled));
        prop_assert!(partition.active[first_in_progress..]
            .iter()
            .all(|m| m.status == MaintenanceStatus::InProgress));
        prop_assert_eq!(
            partition.active.len(),
            partition.upcoming.len() + partition.in_progress.len()
        );
    }

    #[test]
    fn recent_n_is_sorted_and_bounded(
        entries in prop::collection::vec((incident_status(), 0i64..10_000), 0..30),
        n in 0i64..40,
    ) {
        let incidents = incidents_from(entries);
        let recent = recent_n(&incidents, n).unwrap();
        prop_assert_eq!(recent.len(), (n as usize).min(incidents.len()));
        let stamps: Vec<_> = recent.iter().map(|i| i.created_at).collect();
        prop_assert!(stamps.windows(2).all(|pair| pair[0] >= pair[1]));
        if let Some(newest) = incidents.iter().map(|i| i.created_at).max() {
            if n > 0 {
                prop_assert_eq!(stamps[0], newest);
            }
        }
    }

    #[test]
    fn recent_n_rejects_any_negative_count(n in i64::MIN..0) {
        let incidents = incidents_from(vec![(IncidentStatus::Resolved, 1)]);
        prop_assert!(matches!(recent_n(&incidents, n), Err(StatusError::InvalidArgument(_))));
    }

    #[test]
    fn grouping_places_each_service_exactly_once(
        entries in prop::collection::vec((service_status(), prop::option::of(0u8..6)), 0..30),
        group_count in 0u8..4,
    ) {
        let services = services_from(entries);
        let groups: Vec<ServiceGroup> = (0..group_count)
            .map(|g| ServiceGroup {
                id: format!("grp-{}", g),
                name: format!("group {}", g),
                organization_id: "org".to_string(),
            })
            .collect();
        let grouping = group_services_by_group(&services, &groups);
        prop_assert_eq!(grouping.groups.len(), groups.len());
        for service in &services {
            let placements = grouping
                .groups
                .iter()
                .flat_map(|g| g.services.iter())
                .chain(grouping.ungrouped.iter())
                .filter(|s| s.id == service.id)
                .count();
            prop_assert_eq!(placements, 1);
        }
    }

    #[test]
    fn status_counts_sum_to_population(
        statuses in prop::collection::vec(service_status(), 0..40),
    ) {
        let services = services_from(statuses.into_iter().map(|s| (s, None)).collect());
        let counts = build_service_status_counts(&services);
        prop_assert_eq!(counts.total(), services.len());
        prop_assert_eq!(counts.iter().count(), 5);
    }
}

#[test]
fn empty_collection_is_operational() {
    assert_eq!(classify(&[]), OverallStatus::Operational);
}
