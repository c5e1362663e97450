use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StatusError};

/// Health of a single monitored service.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase", try_from = "String")]
pub enum ServiceStatus {
    Operational,
    Degraded,
    PartialOutage,
    MajorOutage,
    Maintenance,
}

impl ServiceStatus {
    pub const ALL: [ServiceStatus; 5] = [
        ServiceStatus::Operational,
        ServiceStatus::Degraded,
        ServiceStatus::PartialOutage,
        ServiceStatus::MajorOutage,
        ServiceStatus::Maintenance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStatus::Operational => "operational",
            ServiceStatus::Degraded => "degraded",
            ServiceStatus::PartialOutage => "partialOutage",
            ServiceStatus::MajorOutage => "majorOutage",
            ServiceStatus::Maintenance => "maintenance",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            ServiceStatus::Operational => 0,
            ServiceStatus::Degraded => 1,
            ServiceStatus::PartialOutage => 2,
            ServiceStatus::MajorOutage => 3,
            ServiceStatus::Maintenance => 4,
        }
    }

    /// Card text for a single service.
    pub fn details(self) -> ServiceStatusDetails {
        let (text, description, icon) = match self {
            ServiceStatus::Operational => (
                "Operational",
                "This service is operating normally",
                IconKind::CheckCircle,
            ),
            ServiceStatus::Degraded => (
                "Degraded",
                "This service is experiencing performance issues",
                IconKind::AlertTriangle,
            ),
            ServiceStatus::PartialOutage => (
                "Partial Outage",
                "Some components of this service are unavailable",
                IconKind::AlertTriangle,
            ),
            ServiceStatus::MajorOutage => (
                "Major Outage",
                "This service is currently unavailable",
                IconKind::AlertOctagon,
            ),
            ServiceStatus::Maintenance => (
                "Maintenance",
                "This service is undergoing scheduled maintenance",
                IconKind::Clock,
            ),
        };
        ServiceStatusDetails { text, description, icon }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceStatusDetails {
    pub text: &'static str,
    pub description: &'static str,
    pub icon: IconKind,
}

/// Icon hint handed to the presentation layer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum IconKind {
    CheckCircle,
    Activity,
    AlertTriangle,
    AlertOctagon,
    Clock,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum IncidentStatus {
    Investigating,
    Identified,
    Monitoring,
    Resolved,
}

impl IncidentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IncidentStatus::Investigating => "investigating",
            IncidentStatus::Identified => "identified",
            IncidentStatus::Monitoring => "monitoring",
            IncidentStatus::Resolved => "resolved",
        }
    }

    pub fn is_resolved(self) -> bool {
        match self {
            IncidentStatus::Resolved => true,
            IncidentStatus::Investigating | IncidentStatus::Identified | IncidentStatus::Monitoring => {
                false
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IncidentStatus::Investigating => "Investigating",
            IncidentStatus::Identified => "Identified",
            IncidentStatus::Monitoring => "Monitoring",
            IncidentStatus::Resolved => "Resolved",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Impact {
    None,
    Minor,
    Major,
    Critical,
}

impl Impact {
    pub fn as_str(self) -> &'static str {
        match self {
            Impact::None => "none",
            Impact::Minor => "minor",
            Impact::Major => "major",
            Impact::Critical => "critical",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum MaintenanceStatus {
    Scheduled,
    InProgress,
    Completed,
}

impl MaintenanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MaintenanceStatus::Scheduled => "scheduled",
            MaintenanceStatus::InProgress => "in_progress",
            MaintenanceStatus::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MaintenanceStatus::Scheduled => "Scheduled",
            MaintenanceStatus::InProgress => "In Progress",
            MaintenanceStatus::Completed => "Completed",
        }
    }

    pub fn icon(self) -> IconKind {
        match self {
            MaintenanceStatus::Scheduled => IconKind::Clock,
            MaintenanceStatus::InProgress => IconKind::Activity,
            MaintenanceStatus::Completed => IconKind::CheckCircle,
        }
    }
}

macro_rules! closed_set {
    ($ty:ident, $field:literal, [$($variant:ident),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = StatusError;

            fn from_str(s: &str) -> Result<Self> {
                $(
                    if s == $ty::$variant.as_str() {
                        return Ok($ty::$variant);
                    }
                )+
                Err(StatusError::integrity($field, s))
            }
        }

        impl TryFrom<String> for $ty {
            type Error = StatusError;

            fn try_from(value: String) -> Result<Self> {
                value.parse()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_set!(ServiceStatus, "service status", [Operational, Degraded, PartialOutage, MajorOutage, Maintenance]);
closed_set!(IncidentStatus, "incident status", [Investigating, Identified, Monitoring, Resolved]);
closed_set!(Impact, "impact", [None, Minor, Major, Critical]);
closed_set!(MaintenanceStatus, "maintenance status", [Scheduled, InProgress, Completed]);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: String,
    pub slug: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: ServiceStatus,
    #[serde(default)]
    pub group_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceGroup {
    pub id: String,
    pub name: String,
    pub organization_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub status: IncidentStatus,
    pub impact: Impact,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub service_ids: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceUpdate {
    pub id: String,
    pub message: String,
    pub status: MaintenanceStatus,
    pub created_at: DateTime<Utc>,
    pub author: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Maintenance {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: MaintenanceStatus,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(default)]
    pub service_ids: Vec<String>,
    #[serde(default)]
    pub updates: Vec<MaintenanceUpdate>,
}

impl Maintenance {
    /// Rejects windows whose end is not strictly after the start.
    pub fn validate(&self) -> Result<()> {
        if self.end_at <= self.start_at {
            return Err(StatusError::InvalidArgument(format!(
                "maintenance {} ends at {} which is not after its start {}",
                self.id,
                self.end_at.to_rfc3339(),
                self.start_at.to_rfc3339()
            )));
        }
        Ok(())
    }
}
