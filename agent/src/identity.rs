use anyhow::{bail, Result};
use common::{Identity, IdentityConfig, IdentityGateway};


/// Identity fixed by the `[identity]` config section.
#[derive(Clone, Debug)]
pub struct StaticIdentity { identity: Identity }

impl StaticIdentity {
    pub fn from_config(config: &IdentityConfig) -> Self {
        Self {
            identity: Identity {
                user_id: config.user_id.clone(),
                organization_id: config.organization_id.clone(),
            },
        }
    }
}

impl IdentityGateway for StaticIdentity {
    fn current_identity(&self) -> Result<Identity> {
        if self.identity.organization_id.is_empty() {
            bail!("user {} has no active organization", self.identity.user_id);
        }
        Ok(self.identity.clone())
    }
}

/// Uses the requested organization, falling back to the caller's active one.
pub fn resolve_organization(requested: Option<String>, identity: &dyn IdentityGateway) -> Result<String> {
    match requested {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Ok(identity.current_identity()?.organization_id),
    }
}
