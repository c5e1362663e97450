use crate::identity::{resolve_organization, StaticIdentity};
use crate::snapshot::SnapshotGateway;
use common::{
    DashboardView, DataGateway, IncidentsView, MaintenanceView, ServicesView, StatusPageView,
    TenantRecords,
};
use anyhow::Result;
use tokio::net::{UnixListener, UnixStream};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use serde::{Deserialize, Serialize};
use log::{info, error, warn};
use std::time::{SystemTime, UNIX_EPOCH};
use std::sync::Arc;

static START_TIME: std::sync::OnceLock<u64> = std::sync::OnceLock::new();

const MAX_REQUEST_BYTES: u64 = 64 * 1024;

/// Collaborators every request handler reads from.
#[derive(Clone)]
pub struct AgentState {
    pub gateway: SnapshotGateway,
    pub identity: StaticIdentity,
    pub recent_limit: i64,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "method")]
enum IpcRequest {
    #[serde(rename = "health")]
    Health,
    #[serde(rename = "overview")]
    Overview { organization_id: Option<String> },
    #[serde(rename = "services")]
    Services { organization_id: Option<String> },
    #[serde(rename = "incidents")]
    Incidents { organization_id: Option<String> },
    #[serde(rename = "maintenance")]
    Maintenance { organization_id: Option<String> },
    #[serde(rename = "public")]
    Public { slug: String },
}

#[derive(Serialize, Debug)]
struct IpcResponse {
    success: bool,
    data: serde_json::Value,
}

impl IpcResponse {
    fn ok<T: Serialize>(view: &T) -> Self {
        match serde_json::to_value(view) {
            Ok(data) => IpcResponse { success: true, data },
            Err(e) => IpcResponse::failure(format!("Failed to encode view: {}", e)),
        }
    }

    fn failure(message: String) -> Self {
        IpcResponse {
            success: false,
            data: serde_json::json!({ "error": message }),
        }
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub async fn start_ipc_server(state: Arc<AgentState>, socket_path: String) -> Result<()> {
    // Remove old socket if exists
    let _ = std::fs::remove_file(&socket_path);

    let listener = UnixListener::bind(&socket_path)?;

    // Set socket permissions to 0666 (read/write for all users)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o666);
        std::fs::set_permissions(&socket_path, perms)?;
    }

    info!("IPC server listening on {}", socket_path);
    START_TIME.get_or_init(now_secs);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let state = state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, &state).await {
                            error!("Client error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    });

    Ok(())
}

async fn handle_client(stream: UnixStream, state: &AgentState) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader.take(MAX_REQUEST_BYTES));

    // One request per connection, ended by a newline or by the client closing its write half.
    let mut request_str = String::new();
    let n = reader.read_line(&mut request_str).await?;

    if n == 0 {
        return Ok(());
    }

    info!("IPC request: {}", request_str.trim());

    let response = match serde_json::from_str::<IpcRequest>(&request_str) {
        Ok(req) => handle_request(req, state),
        Err(e) => {
            warn!("Invalid request: {}", e);
            IpcResponse::failure(format!("Invalid request: {}", e))
        }
    };

    let response_json = serde_json::to_string(&response)?;
    writer.write_all(response_json.as_bytes()).await?;
    writer.write_all(b"\n").await?;

    Ok(())
}

// Every request re-reads the gateway; views are never cached between calls.
fn handle_request(req: IpcRequest, state: &AgentState) -> IpcResponse {
    let result = match req {
        IpcRequest::Health => Ok(handle_health(state)),
        IpcRequest::Overview { organization_id } => handle_overview(state, organization_id),
        IpcRequest::Services { organization_id } => handle_services(state, organization_id),
        IpcRequest::Incidents { organization_id } => handle_incidents(state, organization_id),
        IpcRequest::Maintenance { organization_id } => handle_maintenance(state, organization_id),
        IpcRequest::Public { slug } => handle_public(state, &slug),
    };
    result.unwrap_or_else(|e| {
        error!("Request failed: {:#}", e);
        IpcResponse::failure(format!("{:#}", e))
    })
}

fn handle_health(state: &AgentState) -> IpcResponse {
    let uptime_secs = now_secs().saturating_sub(*START_TIME.get().unwrap_or(&0));
    IpcResponse {
        success: true,
        data: serde_json::json!({
            "status": "running",
            "uptime_seconds": uptime_secs,
            "snapshot_dir": state.gateway.dir().display().to_string(),
            "recent_limit": state.recent_limit,
        }),
    }
}

fn fetch(state: &AgentState, organization_id: Option<String>) -> Result<TenantRecords> {
    let organization_id = resolve_organization(organization_id, &state.identity)?;
    TenantRecords::fetch(&state.gateway, &organization_id)
}

fn handle_overview(state: &AgentState, organization_id: Option<String>) -> Result<IpcResponse> {
    let records = fetch(state, organization_id)?;
    let view = DashboardView::assemble(
        &records.services,
        &records.incidents,
        &records.maintenances,
        state.recent_limit,
    )?;
    Ok(IpcResponse::ok(&view))
}

fn handle_services(state: &AgentState, organization_id: Option<String>) -> Result<IpcResponse> {
    let records = fetch(state, organization_id)?;
    Ok(IpcResponse::ok(&ServicesView::assemble(&records.services, &records.groups)))
}

fn handle_incidents(state: &AgentState, organization_id: Option<String>) -> Result<IpcResponse> {
    let records = fetch(state, organization_id)?;
    Ok(IpcResponse::ok(&IncidentsView::assemble(&records.incidents)))
}

fn handle_maintenance(state: &AgentState, organization_id: Option<String>) -> Result<IpcResponse> {
    let records = fetch(state, organization_id)?;
    Ok(IpcResponse::ok(&MaintenanceView::assemble(&records.maintenances)))
}

fn handle_public(state: &AgentState, slug: &str) -> Result<IpcResponse> {
    let organization = match state.gateway.find_organization_by_slug(slug)? {
        Some(organization) => organization,
        None => return Ok(IpcResponse::failure("Organization not found".to_string())),
    };
    let records = TenantRecords::fetch(&state.gateway, &organization.id)?;
    let page = StatusPageView::assemble(
        &organization,
        &records.services,
        &records.groups,
        &records.incidents,
        &records.maintenances,
    );
    Ok(IpcResponse::ok(&page))
}
