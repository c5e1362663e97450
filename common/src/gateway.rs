//! Boundaries to the record store and the identity provider.
//!
//! Every read is scoped by organization id. Implementations own persistence,
//! mutations and authorization; the view layer only consumes what they return.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::types::{Incident, Maintenance, Organization, Service, ServiceGroup};

pub trait DataGateway {
    fn find_organization_by_slug(&self, slug: &str) -> Result<Option<Organization>>;
    fn list_services(&self, organization_id: &str) -> Result<Vec<Service>>;
    fn list_service_groups(&self, organization_id: &str) -> Result<Vec<ServiceGroup>>;
    fn list_incidents(&self, organization_id: &str) -> Result<Vec<Incident>>;
    /// Each maintenance carries its affected service ids and its updates.
    fn list_maintenances(&self, organization_id: &str) -> Result<Vec<Maintenance>>;

    /// All four lists for one organization. Gateways that can read them from a
    /// single source should override this so the lists agree with each other.
    fn fetch_all(&self, organization_id: &str) -> Result<TenantRecords> {
        Ok(TenantRecords {
            services: self.list_services(organization_id)?,
            groups: self.list_service_groups(organization_id)?,
            incidents: self.list_incidents(organization_id)?,
            maintenances: self.list_maintenances(organization_id)?,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub organization_id: String,
}

pub trait IdentityGateway {
    fn current_identity(&self) -> Result<Identity>;
}

/// Everything one organization's pages need, fetched in one pass.
#[derive(Debug, Clone, Default)]
pub struct TenantRecords {
    pub services: Vec<Service>,
    pub groups: Vec<ServiceGroup>,
    pub incidents: Vec<Incident>,
    pub maintenances: Vec<Maintenance>,
}

impl TenantRecords {
    pub fn fetch<G: DataGateway + ?Sized>(gateway: &G, organization_id: &str) -> Result<Self> {
        gateway.fetch_all(organization_id)
    }
}
