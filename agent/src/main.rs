use anyhow::Result;
use tokio::signal;
use log::{info, warn};
use std::sync::Arc;

mod identity;
mod ipc;
mod snapshot;

use identity::StaticIdentity;
use ipc::{start_ipc_server, AgentState};
use snapshot::SnapshotGateway;
use common::Config;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    info!("Starting status page agent");

    // Load configuration
    let config_path = Config::default_path();
    let config = Config::load(&config_path)?;
    info!("Config loaded from {}", config_path);

    let gateway = SnapshotGateway::new(&config.agent.snapshot_dir);
    if !gateway.dir().is_dir() {
        warn!("Snapshot directory {} does not exist yet", config.agent.snapshot_dir);
    }
    info!("Reading snapshots from {}", config.agent.snapshot_dir);

    let identity = StaticIdentity::from_config(&config.identity);
    info!(
        "Acting for user {} in organization {}",
        config.identity.user_id, config.identity.organization_id
    );

    let state = Arc::new(AgentState {
        gateway,
        identity,
        recent_limit: config.display.recent_limit,
    });

    // Start IPC server
    start_ipc_server(state, config.ipc.socket_path.clone()).await?;
    info!("IPC server started on {}", config.ipc.socket_path);

    info!("Status page agent is running");

    // Wait for ctrl-c
    signal::ctrl_c().await?;
    info!("Shutting down");
    let _ = std::fs::remove_file(&config.ipc.socket_path);
    Ok(())
}
