use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use common::{DataGateway, Incident, Maintenance, Organization, Service, ServiceGroup, TenantRecords};
use log::{debug, warn};
use serde::Deserialize;


/// Read-only gateway over one JSON snapshot per organization.
#[derive(Clone, Debug)]
pub struct SnapshotGateway { dir: PathBuf }

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    organization: Option<Organization>,
    #[serde(default)]
    services: Vec<Service>,
    #[serde(default)]
    service_groups: Vec<ServiceGroup>,
    #[serde(default)]
    incidents: Vec<Incident>,
    #[serde(default)]
    maintenances: Vec<Maintenance>,
}

#[derive(Deserialize)]
struct OrganizationOnly {
    organization: Option<Organization>,
}


impl SnapshotGateway {
pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
}

pub fn dir(&self) -> &Path {
    &self.dir
}

fn path_for(&self, organization_id: &str) -> Result<PathBuf> {
    let safe = !organization_id.is_empty()
        && organization_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !safe {
        bail!("invalid organization id '{}'", organization_id);
    }
    Ok(self.dir.join(format!("{}.json", organization_id)))
}

// Missing snapshot means the tenant has no records yet.
fn read(&self, organization_id: &str) -> Result<Snapshot> {
    let path = self.path_for(organization_id)?;
    if !path.exists() {
        debug!("No snapshot for {} at {}", organization_id, path.display());
        return Ok(Snapshot::default());
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&content)
        .with_context(|| format!("parsing snapshot {}", path.display()))?;
    if let Some(ref organization) = snapshot.organization {
        if organization.id != organization_id {
            bail!("snapshot {} belongs to organization {}", path.display(), organization.id);
        }
    }
    Ok(snapshot)
}
}

/// Keeps only records owned by `organization_id`.
fn scoped<T>(records: Vec<T>, organization_id: &str, kind: &str, owner: impl Fn(&T) -> &str) -> Vec<T> {
    let total = records.len();
    let kept: Vec<T> = records
        .into_iter()
        .filter(|record| owner(record) == organization_id)
        .collect();
    if kept.len() != total {
        warn!(
            "Dropped {} {} belonging to other organizations from snapshot {}",
            total - kept.len(),
            kind,
            organization_id
        );
    }
    kept
}

impl DataGateway for SnapshotGateway {
    fn find_organization_by_slug(&self, slug: &str) -> Result<Option<Organization>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("listing snapshots in {}", self.dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)
                .with_context(|| format!("reading snapshot {}", path.display()))?;
            let header: OrganizationOnly = match serde_json::from_str(&content) {
                Ok(header) => header,
                Err(e) => {
                    warn!("Skipping unreadable snapshot {}: {}", path.display(), e);
                    continue;
                }
            };
            if let Some(organization) = header.organization {
                if organization.slug == slug {
                    // Records are looked up by id, so the file must be named after it.
                    let stem = path.file_stem().and_then(|stem| stem.to_str());
                    if stem != Some(organization.id.as_str()) {
                        bail!(
                            "snapshot {} holds organization {} but is not named {}.json",
                            path.display(),
                            organization.id,
                            organization.id
                        );
                    }
                    return Ok(Some(organization));
                }
            }
        }
        Ok(None)
    }

    fn list_services(&self, organization_id: &str) -> Result<Vec<Service>> {
        let snapshot = self.read(organization_id)?;
        Ok(scoped(snapshot.services, organization_id, "services", |s| s.organization_id.as_str()))
    }

    fn list_service_groups(&self, organization_id: &str) -> Result<Vec<ServiceGroup>> {
        let snapshot = self.read(organization_id)?;
        Ok(scoped(snapshot.service_groups, organization_id, "service groups", |g| g.organization_id.as_str()))
    }

    fn list_incidents(&self, organization_id: &str) -> Result<Vec<Incident>> {
        let snapshot = self.read(organization_id)?;
        Ok(scoped(snapshot.incidents, organization_id, "incidents", |i| i.organization_id.as_str()))
    }

    fn list_maintenances(&self, organization_id: &str) -> Result<Vec<Maintenance>> {
        let snapshot = self.read(organization_id)?;
        checked_maintenances(snapshot.maintenances, organization_id)
    }

    // One parse feeds every list, so a snapshot replaced mid-request is never mixed.
    fn fetch_all(&self, organization_id: &str) -> Result<TenantRecords> {
        let snapshot = self.read(organization_id)?;
        Ok(TenantRecords {
            services: scoped(snapshot.services, organization_id, "services", |s| s.organization_id.as_str()),
            groups: scoped(snapshot.service_groups, organization_id, "service groups", |g| g.organization_id.as_str()),
            incidents: scoped(snapshot.incidents, organization_id, "incidents", |i| i.organization_id.as_str()),
            maintenances: checked_maintenances(snapshot.maintenances, organization_id)?,
        })
    }
}

fn checked_maintenances(maintenances: Vec<Maintenance>, organization_id: &str) -> Result<Vec<Maintenance>> {
    let maintenances = scoped(maintenances, organization_id, "maintenances", |m| m.organization_id.as_str());
    for maintenance in &maintenances {
        maintenance.validate()?;
    }
    Ok(maintenances)
}
