use serde::{Deserialize, Serialize};
use std::fs;
use anyhow::{Context, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub agent: AgentConfig,
    pub ipc: IpcConfig,
    pub identity: IdentityConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Directory holding one `<organization id>.json` snapshot per tenant.
    pub snapshot_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcConfig {
    #[serde(default = "default_socket_path")]
    pub socket_path: String,
}

/// The operator the agent answers for when a request names no organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub user_id: String,
    pub organization_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: i64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig { recent_limit: default_recent_limit() }
    }
}

fn default_socket_path() -> String { "/run/statuspage/statuspage.sock".to_string() }
fn default_recent_limit() -> i64 { 3 }

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.display.recent_limit < 0 {
            anyhow::bail!("display.recent_limit must be non-negative, got {}", config.display.recent_limit);
        }
        Ok(config)
    }

    pub fn default_path() -> String {
        std::env::var("STATUSPAGE_CONFIG")
            .unwrap_or_else(|_| "./config/default.toml".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
[agent]
snapshot_dir = "/var/lib/statuspage"

[ipc]

[identity]
user_id = "user_1"
organization_id = "org_1"
"#;

    #[test]
    fn defaults_fill_optional_sections() {
        let config = Config::parse(MINIMAL).unwrap();
        assert_eq!(config.display.recent_limit, 3);
        assert_eq!(config.ipc.socket_path, "/run/statuspage/statuspage.sock");
        assert_eq!(config.identity.organization_id, "org_1");
    }

    #[test]
    fn negative_recent_limit_is_rejected() {
        let raw = format!("{}\n[display]\nrecent_limit = -1\n", MINIMAL);
        assert!(Config::parse(&raw).is_err());
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}\n[display]\nrecent_limit = 5\n", MINIMAL).unwrap();
        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.display.recent_limit, 5);
        assert_eq!(config.agent.snapshot_dir, "/var/lib/statuspage");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = Config::load("/nonexistent/statuspage.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/statuspage.toml"));
    }
}
