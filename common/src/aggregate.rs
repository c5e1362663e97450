//! Overall health of an organization, derived from its services.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StatusError};
use crate::types::{IconKind, Service, ServiceStatus};

/// Worst-case-first aggregate of every service in a tenant.
///
/// Variants are declared in ascending severity so `Ord` follows precedence.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum OverallStatus {
    Operational,
    Degraded,
    PartialOutage,
    MajorOutage,
}

impl OverallStatus {
    pub const ALL: [OverallStatus; 4] = [
        OverallStatus::Operational,
        OverallStatus::Degraded,
        OverallStatus::PartialOutage,
        OverallStatus::MajorOutage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OverallStatus::Operational => "operational",
            OverallStatus::Degraded => "degraded",
            OverallStatus::PartialOutage => "partialOutage",
            OverallStatus::MajorOutage => "majorOutage",
        }
    }

    /// Contribution of one service. `maintenance` counts as degraded here even
    /// though it stays a distinct per-service status.
    fn from_service(status: ServiceStatus) -> Self {
        match status {
            ServiceStatus::Operational => OverallStatus::Operational,
            ServiceStatus::Degraded | ServiceStatus::Maintenance => OverallStatus::Degraded,
            ServiceStatus::PartialOutage => OverallStatus::PartialOutage,
            ServiceStatus::MajorOutage => OverallStatus::MajorOutage,
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverallStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self> {
        OverallStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| StatusError::InvalidStatus(s.to_string()))
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLabel {
    pub message: &'static str,
    pub icon: IconKind,
}

pub fn classify(services: &[Service]) -> OverallStatus {
    classify_statuses(services.iter().map(|service| service.status))
}

/// Same precedence as [`classify`], over bare statuses.
pub fn classify_statuses<I>(statuses: I) -> OverallStatus
where
    I: IntoIterator<Item = ServiceStatus>,
{
    let mut overall = OverallStatus::Operational;
    for status in statuses {
        overall = overall.max(OverallStatus::from_service(status));
        if overall == OverallStatus::MajorOutage {
            break;
        }
    }
    debug!("classified services as {}", overall);
    overall
}

pub fn label_for(status: OverallStatus) -> StatusLabel {
    let (message, icon) = match status {
        OverallStatus::Operational => ("All Systems Operational", IconKind::CheckCircle),
        OverallStatus::Degraded => ("Degraded Performance", IconKind::Activity),
        OverallStatus::PartialOutage => ("Partial System Outage", IconKind::AlertTriangle),
        OverallStatus::MajorOutage => ("Major System Outage", IconKind::AlertTriangle),
    };
    StatusLabel { message, icon }
}

/// Label lookup for a status that arrived as text, e.g. from a cached page.
/// Unknown values are an error, never "operational".
pub fn label_for_raw(raw: &str) -> Result<StatusLabel> {
    raw.parse().map(label_for)
}

pub fn has_issues(services: &[Service]) -> bool {
    classify(services) != OverallStatus::Operational
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn svc(status: ServiceStatus) -> Service {
        Service {
            id: format!("svc-{}", status),
            organization_id: "org-1".to_string(),
            name: status.to_string(),
            description: String::new(),
            status,
            group_id: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_is_operational() {
        assert_eq!(classify(&[]), OverallStatus::Operational);
        assert!(!has_issues(&[]));
    }

    #[test]
    fn major_outage_wins() {
        let services = vec![
            svc(ServiceStatus::Operational),
            svc(ServiceStatus::Degraded),
            svc(ServiceStatus::MajorOutage),
        ];
        assert_eq!(classify(&services), OverallStatus::MajorOutage);
    }

    #[test]
    fn partial_outage_beats_degraded_and_maintenance() {
        let services = vec![
            svc(ServiceStatus::Maintenance),
            svc(ServiceStatus::PartialOutage),
            svc(ServiceStatus::Degraded),
        ];
        assert_eq!(classify(&services), OverallStatus::PartialOutage);
    }

    #[test]
    fn maintenance_alone_reads_as_degraded() {
        let services = vec![svc(ServiceStatus::Operational), svc(ServiceStatus::Maintenance)];
        assert_eq!(classify(&services), OverallStatus::Degraded);
        assert!(has_issues(&services));
    }

    #[test]
    fn all_operational() {
        let services = vec![svc(ServiceStatus::Operational); 4];
        assert_eq!(classify(&services), OverallStatus::Operational);
    }

    #[test]
    fn labels_cover_every_overall_status() {
        assert_eq!(label_for(OverallStatus::Operational).message, "All Systems Operational");
        assert_eq!(label_for(OverallStatus::Degraded).message, "Degraded Performance");
        assert_eq!(label_for(OverallStatus::PartialOutage).message, "Partial System Outage");
        assert_eq!(label_for(OverallStatus::MajorOutage).message, "Major System Outage");
        assert_eq!(label_for(OverallStatus::Degraded).icon, IconKind::Activity);
    }

    #[test]
    fn raw_label_rejects_values_outside_domain() {
        assert_eq!(
            label_for_raw("partialOutage").unwrap().message,
            "Partial System Outage"
        );
        // Per-service `maintenance` is not an overall status.
        assert_eq!(
            label_for_raw("maintenance"),
            Err(StatusError::InvalidStatus("maintenance".to_string()))
        );
        assert!(label_for_raw("").is_err());
    }
}
