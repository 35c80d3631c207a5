use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use serde::Serialize;
use tirta_client::{HttpValveApi, Page, Resource, SimValveApi, ValveApi, ValveQuery};
use tirta_core::{
    Alert, AlertId, BulkOperation, BulkRequest, CommandRecord, Customer, FleetOverview,
    FleetStatistics, Meter, MeterId, Payment, Percentage, Priority, Property, Tariff,
    ValveCommand, ValveId, ValveSnapshot, ValveState, ValveStatus,
};
use tirta_dashboard::{
    BackendConfig, Config, FleetFilter, FleetWatcher, PollConfig, SessionEvent, StatusWatcher,
    ValveSession,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "tirta-dashboard")]
#[command(about = "Valve control dashboard for the Tirta water platform")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "tirta-dashboard.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fleet overview with statistics
    Overview {
        /// Case-insensitive search over valve code, meter code, property name
        #[arg(long)]
        search: Option<String>,
        /// Filter by device status (active, inactive, maintenance, error, offline)
        #[arg(long)]
        status: Option<String>,
        /// Filter by physical state (open, closed, partial, unknown)
        #[arg(long)]
        state: Option<String>,
    },
    /// Paginated valve listing with backend-side filters
    List {
        /// Filter by device status (active, inactive, maintenance, error, offline)
        #[arg(long)]
        status: Option<String>,
        /// Filter by physical state (open, closed, partial, unknown)
        #[arg(long)]
        state: Option<String>,
        /// Only valves attached to this meter
        #[arg(long)]
        meter: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Single-valve status snapshot
    Status { valve: String },
    /// Recent commands for a valve
    Commands {
        valve: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Open a valve
    Open {
        valve: String,
        #[arg(long)]
        reason: Option<String>,
        /// low, normal, high or emergency
        #[arg(long)]
        priority: Option<String>,
    },
    /// Close a valve
    Close {
        valve: String,
        #[arg(long)]
        reason: Option<String>,
        /// low, normal, high or emergency
        #[arg(long)]
        priority: Option<String>,
    },
    /// Open a valve partially
    PartialOpen {
        valve: String,
        /// Target opening in percent (0-100)
        percentage: u8,
        #[arg(long)]
        reason: Option<String>,
        /// low, normal, high or emergency
        #[arg(long)]
        priority: Option<String>,
    },
    /// Emergency close; cancels the valve's pending command queue
    EmergencyClose {
        valve: String,
        /// Why the valve is being closed
        #[arg(long)]
        reason: String,
    },
    /// Ask the device to report its state
    StatusCheck { valve: String },
    /// Manual override control
    Override {
        valve: String,
        #[command(subcommand)]
        action: OverrideAction,
    },
    /// Active alerts for a valve
    Alerts {
        valve: String,
        #[command(subcommand)]
        action: Option<AlertAction>,
    },
    /// Run one command across many valves
    Bulk {
        /// open, close, emergency_close or status_check
        operation: String,
        /// Comma-separated valve ids
        #[arg(long, value_delimiter = ',')]
        valves: Vec<String>,
        #[arg(long)]
        reason: String,
        /// low, normal, high or emergency
        #[arg(long)]
        priority: Option<String>,
    },
    /// Failed and timed-out commands across the fleet
    Failed {
        /// Trailing window in hours
        #[arg(long, default_value_t = 24)]
        hours: u32,
    },
    /// Fleet statistics block
    Stats,
    /// Browse a CRUD collection; needs the http backend
    Resources {
        /// customers, properties, meters, payments or tariffs
        collection: String,
        /// Fetch a single row by id
        #[arg(long)]
        id: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Read or write a platform setting; needs the http backend
    Setting {
        key: String,
        /// JSON value to store; omit to read
        #[arg(long)]
        value: Option<String>,
    },
    /// Live view; a valve id narrows it to that valve
    Watch { valve: Option<String> },
}

#[derive(Subcommand)]
enum OverrideAction {
    /// Hand the valve to a human on site
    On {
        #[arg(long)]
        reason: String,
    },
    /// Return the valve to remote control
    Off,
}

#[derive(Subcommand)]
enum AlertAction {
    /// Acknowledge an alert
    Ack { alert: String },
    /// Resolve an alert
    Resolve {
        alert: String,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tirta_dashboard=info,tirta_client=info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        info!(path = ?cli.config, "Loading configuration");
        Config::load(&cli.config)?
    } else {
        info!("No configuration file found, using defaults");
        Config::default()
    };

    match cli.command {
        Command::Resources {
            collection,
            id,
            limit,
            offset,
        } => {
            let api = http_backend(config.backend)?;
            show_resource(&api, &collection, id.as_deref(), Page { limit, offset }).await
        }
        Command::Setting { key, value } => {
            let api = http_backend(config.backend)?;
            match value {
                Some(raw) => {
                    // Bare strings are accepted as-is, anything else must be JSON.
                    let value = serde_json::from_str(&raw)
                        .unwrap_or(serde_json::Value::String(raw));
                    api.put_setting(&key, &value).await?;
                    println!("setting {key} updated");
                }
                None => {
                    let value = api.setting(&key).await?;
                    println!("{value}");
                }
            }
            Ok(())
        }
        command => match config.backend {
            BackendConfig::Sim { valve_count } => {
                info!(valve_count, "Using simulated backend");
                run(
                    Arc::new(SimValveApi::seeded(valve_count)),
                    command,
                    config.poll,
                )
                .await
            }
            backend @ BackendConfig::Http { .. } => {
                let api = http_backend(backend)?;
                run(Arc::new(api), command, config.poll).await
            }
        },
    }
}

fn http_backend(backend: BackendConfig) -> color_eyre::Result<HttpValveApi> {
    let BackendConfig::Http { base_url, token } = backend else {
        return Err(eyre!("this operation is only served by the http backend"));
    };
    info!(%base_url, "Using HTTP backend");
    let mut api = HttpValveApi::new(&base_url);
    if let Some(token) = token {
        api = api.with_token(token);
    }
    Ok(api)
}

async fn run<V: ValveApi>(
    api: Arc<V>,
    command: Command,
    poll: PollConfig,
) -> color_eyre::Result<()> {
    match command {
        Command::Overview {
            search,
            status,
            state,
        } => {
            let mut filter = FleetFilter::new();
            if let Some(search) = search {
                filter = filter.with_search(search);
            }
            if let Some(status) = status {
                filter = filter.with_status(parse_status(&status)?);
            }
            if let Some(state) = state {
                filter = filter.with_state(parse_state(&state)?);
            }
            let overview = api.overview().await?;
            print_overview(&overview, &filter);
        }
        Command::List {
            status,
            state,
            meter,
            limit,
            offset,
        } => {
            let mut query = ValveQuery::new().with_limit(limit).with_offset(offset);
            if let Some(status) = status {
                query = query.with_status(parse_status(&status)?);
            }
            if let Some(state) = state {
                query = query.with_state(parse_state(&state)?);
            }
            if let Some(meter) = meter {
                query = query.with_meter(MeterId::new(meter));
            }
            let page = api.valves(&query).await?;
            for valve in &page.items {
                println!(
                    "{:<10} {:<12} {:<8} batt {:>5} sig {:>8}",
                    valve.valve_id,
                    valve.status,
                    valve.current_state,
                    fmt_percent(valve.battery_level),
                    fmt_signal(valve.signal_strength),
                );
            }
            let shown = page.pagination.offset as usize + page.items.len();
            println!(
                "{shown} of {} valves{}",
                page.pagination.total,
                if page.pagination.has_more {
                    ", more available"
                } else {
                    ""
                }
            );
        }
        Command::Status { valve } => {
            let snapshot = api.snapshot(&ValveId::new(valve)).await?;
            print_snapshot(&snapshot);
        }
        Command::Commands { valve, limit } => {
            let commands = api.commands(&ValveId::new(valve), limit).await?;
            if commands.is_empty() {
                println!("no commands recorded");
            }
            for command in &commands {
                println!("{}", command_summary(command));
            }
        }
        Command::Open {
            valve,
            reason,
            priority,
        } => {
            let command = ValveCommand::Open {
                reason: reason.map(Into::into),
                priority: parse_priority_or_default(priority.as_deref())?,
            };
            send_via_session(api, ValveId::new(valve), command, &poll).await?;
        }
        Command::Close {
            valve,
            reason,
            priority,
        } => {
            let command = ValveCommand::Close {
                reason: reason.map(Into::into),
                priority: parse_priority_or_default(priority.as_deref())?,
            };
            send_via_session(api, ValveId::new(valve), command, &poll).await?;
        }
        Command::PartialOpen {
            valve,
            percentage,
            reason,
            priority,
        } => {
            let command = ValveCommand::PartialOpen {
                percentage: Percentage(percentage),
                reason: reason.map(Into::into),
                priority: parse_priority_or_default(priority.as_deref())?,
            };
            send_via_session(api, ValveId::new(valve), command, &poll).await?;
        }
        Command::EmergencyClose { valve, reason } => {
            let command = ValveCommand::EmergencyClose {
                reason: reason.into(),
            };
            send_via_session(api, ValveId::new(valve), command, &poll).await?;
        }
        Command::StatusCheck { valve } => {
            send_via_session(api, ValveId::new(valve), ValveCommand::StatusCheck, &poll).await?;
        }
        Command::Override { valve, action } => {
            let valve = ValveId::new(valve);
            match action {
                OverrideAction::On { reason } => {
                    api.enable_override(&valve, &reason).await?;
                    println!("manual override enabled for {valve}");
                }
                OverrideAction::Off => {
                    api.disable_override(&valve).await?;
                    println!("manual override disabled for {valve}");
                }
            }
        }
        Command::Alerts { valve, action } => {
            let valve = ValveId::new(valve);
            match action {
                None => {
                    let alerts = api.alerts(&valve).await?;
                    if alerts.is_empty() {
                        println!("no active alerts for {valve}");
                    }
                    for alert in &alerts {
                        println!("{}", alert_summary(alert));
                    }
                }
                Some(AlertAction::Ack { alert }) => {
                    api.acknowledge_alert(&AlertId::new(alert)).await?;
                    println!("alert acknowledged");
                }
                Some(AlertAction::Resolve { alert, notes }) => {
                    api.resolve_alert(&AlertId::new(alert), notes.as_deref())
                        .await?;
                    println!("alert resolved");
                }
            }
        }
        Command::Bulk {
            operation,
            valves,
            reason,
            priority,
        } => {
            if valves.is_empty() {
                return Err(eyre!("no valve ids given, use --valves"));
            }
            let request = BulkRequest {
                valve_ids: valves.into_iter().map(ValveId::new).collect(),
                operation: parse_operation(&operation)?,
                reason: reason.into(),
                priority: priority.as_deref().map(parse_priority).transpose()?,
            };
            let outcome = api.bulk(&request).await?;
            println!(
                "bulk {}: {} processed, {} errors",
                outcome.operation, outcome.total_processed, outcome.total_errors
            );
            for receipt in &outcome.successful {
                println!("  {} accepted ({})", receipt.valve_id, receipt.command_id);
            }
            for error in &outcome.errors {
                println!("  {} refused: {}", error.valve_id, error.error);
            }
        }
        Command::Failed { hours } => {
            let failed = api.failed_commands(hours).await?;
            if failed.is_empty() {
                println!("no failed commands in the last {hours}h");
            }
            for command in &failed {
                println!("{} {}", command.valve_id, command_summary(command));
            }
        }
        Command::Stats => {
            let statistics = api.statistics().await?;
            print_statistics(&statistics);
        }
        Command::Watch { valve } => match valve {
            Some(valve) => watch_valve(api, ValveId::new(valve), &poll).await?,
            None => watch_fleet(api, &poll).await?,
        },
        // Routed to the concrete HTTP client before reaching here.
        Command::Resources { .. } | Command::Setting { .. } => {
            return Err(eyre!("this operation is only served by the http backend"));
        }
    }
    Ok(())
}

async fn show_resource(
    api: &HttpValveApi,
    collection: &str,
    id: Option<&str>,
    page: Page,
) -> color_eyre::Result<()> {
    match collection {
        "customers" => browse::<Customer>(api, id, page).await,
        "properties" => browse::<Property>(api, id, page).await,
        "meters" => browse::<Meter>(api, id, page).await,
        "payments" => browse::<Payment>(api, id, page).await,
        "tariffs" => browse::<Tariff>(api, id, page).await,
        other => Err(eyre!("unknown collection '{other}'")),
    }
}

async fn browse<T: Resource + Serialize>(
    api: &HttpValveApi,
    id: Option<&str>,
    page: Page,
) -> color_eyre::Result<()> {
    let client = api.resource::<T>();
    match id {
        Some(id) => {
            let row = client.get(id).await?;
            println!("{}", serde_json::to_string_pretty(&row)?);
        }
        None => {
            let rows = client.list(page).await?;
            for row in &rows.items {
                println!("{}", serde_json::to_string(row)?);
            }
            println!(
                "{} of {} rows (offset {})",
                rows.items.len(),
                rows.pagination.total,
                rows.pagination.offset
            );
        }
    }
    Ok(())
}

/// Drives a command through a fresh session and waits for the
/// post-command re-poll so the printed state is current.
async fn send_via_session<V: ValveApi>(
    api: Arc<V>,
    valve: ValveId,
    command: ValveCommand,
    poll: &PollConfig,
) -> color_eyre::Result<()> {
    let repoll = Duration::from_millis(poll.command_repoll_ms);
    let (session, mut events) = ValveSession::new(api, valve, repoll);

    session.refresh().await;
    if let Some(message) = session.last_error().await {
        return Err(eyre!("{message}"));
    }
    while events.try_recv().is_ok() {}

    let receipt = session.dispatch(command).await?;
    println!(
        "command accepted: {} [{} {}] status={}",
        receipt.command_id, receipt.command_type, receipt.priority, receipt.status
    );

    let deadline = repoll + Duration::from_secs(5);
    loop {
        match tokio::time::timeout(deadline, events.recv()).await {
            Ok(Some(SessionEvent::Refreshed)) => break,
            Ok(Some(SessionEvent::Error(message))) => {
                warn!(%message, "post-command refresh failed");
                break;
            }
            Ok(Some(SessionEvent::Accepted(_))) => continue,
            Ok(None) | Err(_) => break,
        }
    }
    if let Some(snapshot) = session.snapshot().await {
        print_snapshot(&snapshot);
    }
    Ok(())
}

async fn watch_valve<V: ValveApi>(
    api: Arc<V>,
    valve: ValveId,
    poll: &PollConfig,
) -> color_eyre::Result<()> {
    let repoll = Duration::from_millis(poll.command_repoll_ms);
    let (session, mut events) = ValveSession::new(api, valve, repoll);
    let watcher = StatusWatcher::spawn(
        session.clone(),
        Duration::from_secs(poll.status_interval_secs),
    );
    info!(valve = %session.valve(), "watching valve, Ctrl+C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
            event = events.recv() => {
                match event {
                    Some(SessionEvent::Refreshed) => {
                        if let Some(snapshot) = session.snapshot().await {
                            println!("{}", watch_line(&snapshot));
                        }
                    }
                    Some(SessionEvent::Error(message)) => {
                        eprintln!("error: {message}");
                    }
                    Some(SessionEvent::Accepted(receipt)) => {
                        println!("command accepted: {}", receipt.command_id);
                    }
                    None => break,
                }
            }
        }
    }

    watcher.shutdown().await;
    Ok(())
}

async fn watch_fleet<V: ValveApi>(api: Arc<V>, poll: &PollConfig) -> color_eyre::Result<()> {
    let watcher = FleetWatcher::spawn(api, Duration::from_secs(poll.fleet_interval_secs));
    let mut overview_rx = watcher.subscribe();
    info!("watching fleet, Ctrl+C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
            changed = overview_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let overview = overview_rx.borrow_and_update().clone();
                if let Some(overview) = overview {
                    print_overview(&overview, &FleetFilter::new());
                    println!();
                }
            }
        }
    }

    watcher.shutdown().await;
    Ok(())
}

fn parse_status(value: &str) -> color_eyre::Result<ValveStatus> {
    match value {
        "active" => Ok(ValveStatus::Active),
        "inactive" => Ok(ValveStatus::Inactive),
        "maintenance" => Ok(ValveStatus::Maintenance),
        "error" => Ok(ValveStatus::Error),
        "offline" => Ok(ValveStatus::Offline),
        other => Err(eyre!("unknown valve status '{other}'")),
    }
}

fn parse_state(value: &str) -> color_eyre::Result<ValveState> {
    match value {
        "open" => Ok(ValveState::Open),
        "closed" => Ok(ValveState::Closed),
        "partial" => Ok(ValveState::Partial),
        "unknown" => Ok(ValveState::Unknown),
        other => Err(eyre!("unknown valve state '{other}'")),
    }
}

fn parse_priority(value: &str) -> color_eyre::Result<Priority> {
    match value {
        "low" => Ok(Priority::Low),
        "normal" => Ok(Priority::Normal),
        "high" => Ok(Priority::High),
        "emergency" => Ok(Priority::Emergency),
        other => Err(eyre!("unknown priority '{other}'")),
    }
}

fn parse_priority_or_default(value: Option<&str>) -> color_eyre::Result<Priority> {
    value.map_or(Ok(Priority::Normal), parse_priority)
}

fn parse_operation(value: &str) -> color_eyre::Result<BulkOperation> {
    match value {
        "open" => Ok(BulkOperation::Open),
        "close" => Ok(BulkOperation::Close),
        "emergency_close" => Ok(BulkOperation::EmergencyClose),
        "status_check" => Ok(BulkOperation::StatusCheck),
        other => Err(eyre!("unknown bulk operation '{other}'")),
    }
}

fn print_overview(overview: &FleetOverview, filter: &FleetFilter) {
    print_statistics(&overview.statistics);
    println!();
    println!(
        "{:<10} {:<12} {:<8} {:<19} {:<26} {:>6} {:>8} {:>12}  {}",
        "VALVE", "STATUS", "STATE", "HEALTH", "PROPERTY", "BATT", "SIGNAL", "CREDIT", "NOTES"
    );
    for row in filter.apply(&overview.valves) {
        let mut notes = Vec::new();
        if row.valve.is_manual_override {
            notes.push("override".to_owned());
        }
        if row.pending_commands > 0 {
            notes.push(format!("{} pending", row.pending_commands));
        }
        if row.active_alerts > 0 {
            notes.push(format!("{} alerts", row.active_alerts));
        }
        println!(
            "{:<10} {:<12} {:<8} {:<19} {:<26} {:>6} {:>8} {:>12.2}  {}",
            row.valve.valve_id,
            row.valve.status,
            row.valve.current_state,
            row.health_status,
            row.property_name,
            fmt_percent(row.valve.battery_level),
            fmt_signal(row.valve.signal_strength),
            row.last_credit,
            notes.join(", "),
        );
    }
}

fn print_statistics(statistics: &FleetStatistics) {
    let valves = &statistics.valve_statistics;
    let commands = &statistics.command_statistics;
    println!("system health: {}", statistics.system_health);
    println!(
        "valves: {} total, {} active, {} offline, {} maintenance, {} error",
        valves.total_valves,
        valves.active_valves,
        valves.offline_valves,
        valves.maintenance_valves,
        valves.error_valves,
    );
    println!(
        "states: {} open, {} closed, {} partial; {} low battery",
        valves.open_valves, valves.closed_valves, valves.partial_valves, valves.low_battery_valves,
    );
    println!(
        "telemetry: avg battery {}, avg signal {}",
        valves
            .avg_battery_level
            .map_or_else(|| "-".to_owned(), |v| format!("{v:.1}%")),
        valves
            .avg_signal_strength
            .map_or_else(|| "-".to_owned(), |v| format!("{v:.1} dBm")),
    );
    println!(
        "commands 24h: {} total, {} pending, {} completed, {} failed, {} timeout, {} emergency",
        commands.total_commands,
        commands.pending_commands,
        commands.completed_commands,
        commands.failed_commands,
        commands.timeout_commands,
        commands.emergency_commands,
    );
    if let Some(avg) = commands.avg_completion_time_seconds {
        println!("avg completion time: {avg:.1}s");
    }
    println!("updated: {}", statistics.last_updated);
}

fn print_snapshot(snapshot: &ValveSnapshot) {
    let valve = &snapshot.valve;
    println!(
        "{} ({} {}, fw {})",
        valve.valve_id, valve.valve_model, valve.valve_type, valve.firmware_version
    );
    println!(
        "  status: {}  state: {}  health: {}",
        valve.status, valve.current_state, snapshot.health_status
    );
    println!(
        "  battery: {}  signal: {}  pressure: {}  temperature: {}",
        fmt_percent(valve.battery_level),
        fmt_signal(valve.signal_strength),
        fmt_pressure(valve.operating_pressure, valve.max_pressure),
        valve
            .temperature
            .map_or_else(|| "-".to_owned(), |v| format!("{v:.1} C")),
    );
    if let Some(meter) = &snapshot.meter {
        println!(
            "  meter: {}  credit: {:.2}  auto control: {}",
            meter.meter_id,
            meter.last_credit,
            if meter.auto_valve_control { "on" } else { "off" }
        );
    }
    if valve.is_manual_override {
        let reason = valve
            .manual_override_reason
            .as_deref()
            .unwrap_or("no reason recorded");
        println!("  manual override: {reason}");
    }
    if let (Some(kind), Some(at)) = (valve.last_command, valve.last_command_at) {
        println!("  last command: {kind} at {at}");
    }
    if !snapshot.active_alerts.is_empty() {
        println!("  alerts:");
        for alert in snapshot.active_alerts.iter() {
            println!("    {}", alert_summary(alert));
        }
    }
    if !snapshot.recent_commands.is_empty() {
        println!("  recent commands:");
        for command in snapshot.recent_commands.iter() {
            println!("    {}", command_summary(command));
        }
    }
    println!("  updated: {}", snapshot.last_updated);
}

fn watch_line(snapshot: &ValveSnapshot) -> String {
    let valve = &snapshot.valve;
    format!(
        "{} | {} {} {} | batt {} sig {} | {} alerts",
        snapshot.last_updated,
        valve.valve_id,
        valve.current_state,
        snapshot.health_status,
        fmt_percent(valve.battery_level),
        fmt_signal(valve.signal_strength),
        snapshot.active_alerts.len(),
    )
}

fn command_summary(command: &CommandRecord) -> String {
    let mut line = format!(
        "{} {} [{}] {} at {}",
        command.id, command.command_type, command.priority, command.status, command.created_at
    );
    if let Some(message) = command.error_message.as_deref() {
        line.push_str(" (");
        line.push_str(message);
        line.push(')');
    }
    line
}

fn alert_summary(alert: &Alert) -> String {
    let ack = if alert.is_acknowledged { " [ack]" } else { "" };
    format!(
        "[{}] {} {}: {}{} (id: {})",
        alert.severity, alert.alert_type, alert.title, alert.message, ack, alert.id
    )
}

fn fmt_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_owned(), |v| format!("{v:.0}%"))
}

fn fmt_signal(value: Option<i16>) -> String {
    value.map_or_else(|| "-".to_owned(), |v| format!("{v} dBm"))
}

fn fmt_pressure(value: Option<f64>, max: f64) -> String {
    value.map_or_else(
        || "-".to_owned(),
        |v| format!("{v:.1}/{max:.1} bar"),
    )
}
