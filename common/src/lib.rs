pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod gateway;
pub mod types;
pub mod view;

pub use aggregate::{classify, has_issues, label_for, label_for_raw, OverallStatus, StatusLabel};
pub use classify::{
    most_recent_update, partition_incidents, partition_maintenances, recent_n, recent_n_by,
    IncidentPartition, LatestUpdate, MaintenancePartition, Recent, Timestamped,
};
pub use config::*;
pub use error::StatusError;
pub use gateway::{DataGateway, Identity, IdentityGateway, TenantRecords};
pub use types::*;
pub use view::{
    build_service_status_counts, group_services_by_group, DashboardView, GroupedServices,
    IncidentsView, MaintenanceRow, MaintenanceView, ServiceGrouping, ServicesView, StatusCounts,
    StatusPageView,
};
