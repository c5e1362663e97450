use tokio::net::UnixStream;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use log::debug;
use common::{label_for_raw, IconKind, ServiceStatus};

const DEFAULT_SOCKET: &str = "/run/statuspage/statuspage.sock";

#[derive(Parser, Debug)]
#[command(name = "statuspage-cli", about = "Query the status page agent")]
struct Cli {
    /// Agent socket path
    #[arg(long, env = "STATUSPAGE_SOCKET", default_value = DEFAULT_SOCKET)]
    socket: String,

    /// Organization to query instead of the agent's active one
    #[arg(long)]
    org: Option<String>,

    /// Print the raw JSON view
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// Agent uptime and settings
    Health,
    /// Dashboard: overall status, counts, recent incidents and maintenance
    Overview,
    /// Services grouped by service group
    Services,
    /// Active and resolved incidents
    Incidents,
    /// Maintenance windows by state
    Maintenance,
    /// Public status page for an organization slug
    Public { slug: String },
}

impl Command {
    fn method(&self) -> &'static str {
        match self {
            Command::Health => "health",
            Command::Overview => "overview",
            Command::Services => "services",
            Command::Incidents => "incidents",
            Command::Maintenance => "maintenance",
            Command::Public { .. } => "public",
        }
    }
}

#[derive(Serialize, Debug)]
struct IpcRequest {
    method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    slug: Option<String>,
}

impl IpcRequest {
    /// Wire form: one JSON object ended by a newline.
    fn to_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    fn build(command: &Command, org: Option<String>) -> Self {
        let slug = match command {
            Command::Public { slug } => Some(slug.clone()),
            _ => None,
        };
        let organization_id = match command {
            Command::Health | Command::Public { .. } => None,
            _ => org,
        };
        IpcRequest { method: command.method().to_string(), organization_id, slug }
    }
}

#[derive(Deserialize)]
struct IpcResponse {
    success: bool,
    data: Value,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let request = IpcRequest::build(&cli.command, cli.org.clone());
    let response = send_request(&cli.socket, &request).await?;

    if !response.success {
        eprintln!("{} {}", "Error:".red().bold(), response.data.get("error").unwrap_or(&serde_json::json!("Unknown error")));
        std::process::exit(1);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response.data)?);
        return Ok(());
    }

    match cli.command {
        Command::Health => print_health(&response.data),
        Command::Overview => print_overview(&response.data)?,
        Command::Services => print_services(&response.data)?,
        Command::Incidents => print_incidents(&response.data),
        Command::Maintenance => print_maintenance(&response.data),
        Command::Public { .. } => print_public(&response.data)?,
    }

    Ok(())
}

async fn send_request(socket_path: &str, request: &IpcRequest) -> Result<IpcResponse> {
    let mut stream = UnixStream::connect(socket_path).await
        .map_err(|e| anyhow::anyhow!("cannot reach agent at {}: {}", socket_path, e))?;

    let request_line = request.to_line()?;
    debug!("Sending {} to {}", request_line.trim_end(), socket_path);
    stream.write_all(request_line.as_bytes()).await?;
    stream.shutdown().await?;

    let mut buffer = Vec::new();
    stream.read_to_end(&mut buffer).await?;
    debug!("Received {} bytes", buffer.len());

    let response: IpcResponse = serde_json::from_slice(&buffer)?;
    Ok(response)
}

fn service_color(status: ServiceStatus) -> Color {
    match status {
        ServiceStatus::Operational => Color::Green,
        ServiceStatus::Degraded => Color::Yellow,
        ServiceStatus::PartialOutage => Color::BrightRed,
        ServiceStatus::MajorOutage => Color::Red,
        ServiceStatus::Maintenance => Color::Blue,
    }
}

fn icon_glyph(icon: IconKind) -> &'static str {
    match icon {
        IconKind::CheckCircle => "[ok]",
        IconKind::Activity => "[~~]",
        IconKind::AlertTriangle => "[!!]",
        IconKind::AlertOctagon => "[XX]",
        IconKind::Clock => "[..]",
    }
}

/// Header line for an overall status as sent by the agent.
fn overall_line(data: &Value) -> Result<String> {
    let raw = data["overall"].as_str().unwrap_or_default();
    let label = label_for_raw(raw)?;
    let color = match raw {
        "operational" => Color::Green,
        "degraded" => Color::Yellow,
        _ => Color::Red,
    };
    Ok(format!("{} {}", icon_glyph(label.icon), label.message).color(color).bold().to_string())
}

fn service_line(service: &Value) -> Result<String> {
    let name = service["name"].as_str().unwrap_or("?");
    let status: ServiceStatus = service["status"].as_str().unwrap_or_default().parse()?;
    let details = status.details();
    Ok(format!(
        "  {} {:28} {}",
        icon_glyph(details.icon),
        truncate(name, 28).bright_white(),
        details.text.color(service_color(status)).bold()
    ))
}

fn print_health(data: &Value) {
    println!("\n{}", "Status Page Agent".bright_cyan().bold());
    println!("  {:14} {}", "Status:".bright_cyan(), data["status"].as_str().unwrap_or("unknown").bright_green());
    println!("  {:14} {}", "Uptime:".bright_cyan(), format_uptime(data["uptime_seconds"].as_u64().unwrap_or(0)));
    println!("  {:14} {}", "Snapshots:".bright_cyan(), data["snapshot_dir"].as_str().unwrap_or("?"));
    println!("  {:14} {}\n", "Recent limit:".bright_cyan(), data["recent_limit"]);
}

fn print_overview(data: &Value) -> Result<()> {
    println!("\n{}", overall_line(data)?);

    println!("\n{}", "Services".bright_cyan().bold());
    for status in ServiceStatus::ALL {
        let count = data["counts"][status.as_str()].as_u64().unwrap_or(0);
        println!("  {:16} {}", status.details().text.color(service_color(status)), count);
    }

    println!("\n{} {}", "Incidents:".bright_cyan().bold(), data["incidentSummary"].as_str().unwrap_or(""));
    for incident in as_list(&data["recentIncidents"]) {
        print_incident_row(incident);
    }

    println!("\n{} {}", "Maintenance:".bright_cyan().bold(), data["maintenanceSummary"].as_str().unwrap_or(""));
    for row in as_list(&data["recentMaintenances"]) {
        print_maintenance_row(row);
    }
    println!();
    Ok(())
}

fn print_services(data: &Value) -> Result<()> {
    let badge = if data["hasIssues"].as_bool().unwrap_or(false) {
        "Issues detected".bright_yellow().bold()
    } else {
        "All services operational".bright_green().bold()
    };
    println!("\n{}", badge);

    for entry in as_list(&data["grouping"]["groups"]) {
        let name = entry["group"]["name"].as_str().unwrap_or("?");
        let count = entry["serviceCount"].as_u64().unwrap_or(0);
        let issues = entry["issueCount"].as_u64().unwrap_or(0);
        println!(
            "\n{} {}",
            name.bright_cyan().bold(),
            format!("({} service{}, {} with issues)", count, if count == 1 { "" } else { "s" }, issues).dimmed()
        );
        for service in as_list(&entry["services"]) {
            println!("{}", service_line(service)?);
        }
    }

    let ungrouped = as_list(&data["grouping"]["ungrouped"]);
    if !ungrouped.is_empty() {
        println!("\n{}", "Ungrouped".bright_cyan().bold());
        for service in ungrouped {
            println!("{}", service_line(service)?);
        }
    }
    println!();
    Ok(())
}

fn print_incidents(data: &Value) {
    println!("\n{} {}", "Active:".bright_cyan().bold(), data["summary"].as_str().unwrap_or(""));
    for incident in as_list(&data["active"]) {
        print_incident_row(incident);
    }
    let resolved = as_list(&data["resolved"]);
    println!("\n{} {}", "Resolved:".bright_cyan().bold(), resolved.len());
    for incident in resolved {
        print_incident_row(incident);
    }
    println!();
}

fn print_maintenance(data: &Value) {
    for (title, key) in [("Scheduled", "upcoming"), ("In progress", "inProgress"), ("Completed", "completed")] {
        let rows = as_list(&data[key]);
        println!("\n{} {}", format!("{}:", title).bright_cyan().bold(), rows.len());
        for row in rows {
            print_maintenance_row(row);
        }
    }
    println!();
}

fn print_public(data: &Value) -> Result<()> {
    println!("\n{}", data["organization"]["name"].as_str().unwrap_or("?").bright_white().bold());
    println!("{}", overall_line(data)?);
    print_services(data)?;

    let incidents = as_list(&data["activeIncidents"]);
    if !incidents.is_empty() {
        println!("{}", "Active incidents".bright_cyan().bold());
        for incident in incidents {
            print_incident_row(incident);
        }
    }
    let maintenances = as_list(&data["activeMaintenances"]);
    if !maintenances.is_empty() {
        println!("\n{}", "Scheduled maintenance".bright_cyan().bold());
        for row in maintenances {
            print_maintenance_row(row);
        }
    }
    println!();
    Ok(())
}

fn print_incident_row(incident: &Value) {
    let status = incident["status"].as_str().unwrap_or("?");
    let status_color = if status == "resolved" { Color::Green } else { Color::Yellow };
    let impact = incident["impact"].as_str().unwrap_or("?");
    let impact_color = match impact {
        "critical" => Color::Red,
        "major" => Color::BrightRed,
        "minor" => Color::Yellow,
        _ => Color::White,
    };
    println!(
        "  {} {:32} {:14} {}",
        format_timestamp(incident["createdAt"].as_str().unwrap_or("")).dimmed(),
        truncate(incident["title"].as_str().unwrap_or("?"), 32).bright_white(),
        capitalize(status).color(status_color),
        impact.color(impact_color)
    );
}

fn print_maintenance_row(row: &Value) {
    println!(
        "  {} {:32} {}",
        format_range(row["startAt"].as_str().unwrap_or(""), row["endAt"].as_str().unwrap_or("")).dimmed(),
        truncate(row["title"].as_str().unwrap_or("?"), 32).bright_white(),
        row["statusLabel"].as_str().unwrap_or("?").bright_blue()
    );
    let latest = &row["latestUpdate"];
    match latest["kind"].as_str() {
        Some("update") => println!(
            "      {} {}",
            format_timestamp(latest["createdAt"].as_str().unwrap_or("")).dimmed(),
            latest["message"].as_str().unwrap_or("")
        ),
        _ => println!("      {}", "No updates".dimmed().italic()),
    }
}

fn as_list(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or(&[])
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

fn format_timestamp(ts: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => "Invalid timestamp".to_string(),
    }
}

fn format_range(start: &str, end: &str) -> String {
    match (chrono::DateTime::parse_from_rfc3339(start), chrono::DateTime::parse_from_rfc3339(end)) {
        (Ok(start), Ok(end)) if start.date_naive() == end.date_naive() => {
            format!("{} - {}", start.format("%Y-%m-%d %H:%M"), end.format("%H:%M"))
        }
        (Ok(start), Ok(end)) => {
            format!("{} - {}", start.format("%Y-%m-%d %H:%M"), end.format("%Y-%m-%d %H:%M"))
        }
        _ => "Invalid window".to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        format!("{:width$}", s, width = max_len)
    } else {
        let kept: String = s.chars().take(max_len - 2).collect();
        format!("{}..", kept)
    }
}
