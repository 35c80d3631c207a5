use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use rand::Rng;
use tirta_core::{
    Alert, AlertId, AlertType, BulkError, BulkOperation, BulkOutcome, BulkRequest, CommandId,
    CommandKind, CommandReceipt, CommandRecord, CommandStatistics, CommandStatus, FleetOverview,
    FleetStatistics, FleetValve, HealthStatus, LOW_BATTERY_PERCENT, MeterId, MeterLink,
    PRESSURE_WARN_RATIO, Priority, PropertyId, Severity, SystemHealth, UserId, Valve,
    ValveCommand, ValveId, ValveSnapshot, ValveState, ValveStatistics, ValveStatus, ValveType,
    WEAK_SIGNAL_DBM,
};
use tokio::sync::Mutex;
use ulid::Ulid;

use crate::{
    ClientError,
    api::{Paginated, Pagination, ValveApi, ValveQuery},
};

const SIM_ACTOR: &str = "system";
const DEFAULT_LIMIT: u32 = 50;

/// In-process [`ValveApi`] backed by a fixture fleet.
///
/// This is the local-development and test stand-in for the platform
/// backend, and it enforces the same gates the real device-control
/// service does: inactive and maintenance valves refuse every command,
/// manual override refuses everything but emergency close, and
/// emergency-priority commands cancel the pending queue first. The one
/// deliberate compression: the command queue drains instantly, so a
/// dispatched command has already acted on the valve by the time its
/// pending receipt comes back.
pub struct SimValveApi {
    state: Arc<Mutex<SimState>>,
}

struct SimState {
    fleet: Vec<FleetValve>,
    commands: Vec<CommandRecord>,
    alerts: Vec<Alert>,
    snapshot_fetches: u64,
    overview_fetches: u64,
    unreachable: bool,
}

impl SimValveApi {
    /// A randomized fleet of `count` valves with a plausible spread of
    /// states, degradations, and one unit under manual override.
    pub fn seeded(count: usize) -> Self {
        let now = Timestamp::now();
        let fleet = sample_fleet(count, now);
        let alerts = seed_alerts(&fleet, now);
        Self::with_parts(fleet, Vec::new(), alerts)
    }

    /// An exact fleet, for tests that need deterministic rows.
    pub fn with_fleet(fleet: Vec<FleetValve>) -> Self {
        Self::with_parts(fleet, Vec::new(), Vec::new())
    }

    fn with_parts(
        fleet: Vec<FleetValve>,
        commands: Vec<CommandRecord>,
        alerts: Vec<Alert>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                fleet,
                commands,
                alerts,
                snapshot_fetches: 0,
                overview_fetches: 0,
                unreachable: false,
            })),
        }
    }

    /// Seeds a command row, e.g. a pending command for cancellation tests.
    pub async fn push_command(&self, record: CommandRecord) {
        self.state.lock().await.commands.push(record);
    }

    /// Seeds an alert row.
    pub async fn push_alert(&self, alert: Alert) {
        self.state.lock().await.alerts.push(alert);
    }

    /// While set, every operation fails the way an unreachable backend
    /// would.
    pub async fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().await.unreachable = unreachable;
    }

    /// How many single-valve snapshot fetches were attempted.
    pub async fn snapshot_fetches(&self) -> u64 {
        self.state.lock().await.snapshot_fetches
    }

    /// How many overview fetches were attempted.
    pub async fn overview_fetches(&self) -> u64 {
        self.state.lock().await.overview_fetches
    }

    /// Copy of a stored command row, newest first ordering not applied.
    pub async fn command_log(&self) -> Vec<CommandRecord> {
        self.state.lock().await.commands.clone()
    }
}

impl Default for SimValveApi {
    fn default() -> Self {
        Self::seeded(12)
    }
}

impl SimState {
    fn check_reachable(&self) -> Result<(), ClientError> {
        if self.unreachable {
            Err(ClientError::api("backend unreachable"))
        } else {
            Ok(())
        }
    }

    /// Valves answer to their row id and to the device code the overview
    /// prints. Internal bookkeeping always uses the row id.
    fn row_index(&self, valve: &ValveId) -> Result<usize, ClientError> {
        self.fleet
            .iter()
            .position(|row| row.valve.id == *valve || row.valve.valve_id == valve.0)
            .ok_or_else(|| ClientError::api("Valve not found"))
    }

    fn pending_count(&self, valve: &ValveId) -> u32 {
        self.commands
            .iter()
            .filter(|c| c.valve_id == *valve && c.status == CommandStatus::Pending)
            .count() as u32
    }

    fn active_alert_count(&self, valve: &ValveId) -> u32 {
        self.alerts
            .iter()
            .filter(|a| a.valve_id == *valve && !a.is_resolved)
            .count() as u32
    }

    /// Unresolved alerts for one valve, most severe first, newest within
    /// a severity.
    fn active_alerts(&self, valve: &ValveId) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .iter()
            .filter(|a| a.valve_id == *valve && !a.is_resolved)
            .cloned()
            .collect();
        alerts.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then(b.created_at.cmp(&a.created_at))
        });
        alerts
    }

    fn recent_commands(&self, valve: &ValveId, limit: usize) -> Vec<CommandRecord> {
        self.commands
            .iter()
            .rev()
            .filter(|c| c.valve_id == *valve)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Rows as the overview endpoint serves them, derived fields freshly
    /// computed, ordered by business code.
    fn served_rows(&self, now: Timestamp) -> Vec<FleetValve> {
        let mut rows: Vec<FleetValve> = self
            .fleet
            .iter()
            .map(|row| {
                let mut served = row.clone();
                served.health_status = row.valve.health(now);
                served.pending_commands = self.pending_count(&row.valve.id);
                served.active_alerts = self.active_alert_count(&row.valve.id);
                served
            })
            .collect();
        rows.sort_by(|a, b| a.valve.valve_id.cmp(&b.valve.valve_id));
        rows
    }

    fn statistics(&self, now: Timestamp) -> FleetStatistics {
        let mut valve_statistics = ValveStatistics {
            total_valves: self.fleet.len() as u32,
            active_valves: 0,
            offline_valves: 0,
            maintenance_valves: 0,
            error_valves: 0,
            open_valves: 0,
            closed_valves: 0,
            partial_valves: 0,
            low_battery_valves: 0,
            avg_battery_level: None,
            avg_signal_strength: None,
        };
        let mut battery = (0.0f64, 0u32);
        let mut signal = (0.0f64, 0u32);
        for row in &self.fleet {
            match row.valve.status {
                ValveStatus::Active => valve_statistics.active_valves += 1,
                ValveStatus::Offline => valve_statistics.offline_valves += 1,
                ValveStatus::Maintenance => valve_statistics.maintenance_valves += 1,
                ValveStatus::Error => valve_statistics.error_valves += 1,
                ValveStatus::Inactive => {}
            }
            match row.valve.current_state {
                ValveState::Open => valve_statistics.open_valves += 1,
                ValveState::Closed => valve_statistics.closed_valves += 1,
                ValveState::Partial => valve_statistics.partial_valves += 1,
                ValveState::Unknown => {}
            }
            if let Some(level) = row.valve.battery_level {
                // The fleet report counts a flat battery at exactly 20%,
                // the per-valve health rule flips just below it.
                if level <= LOW_BATTERY_PERCENT {
                    valve_statistics.low_battery_valves += 1;
                }
                battery = (battery.0 + level, battery.1 + 1);
            }
            if let Some(strength) = row.valve.signal_strength {
                signal = (signal.0 + f64::from(strength), signal.1 + 1);
            }
        }
        if battery.1 > 0 {
            valve_statistics.avg_battery_level = Some(battery.0 / f64::from(battery.1));
        }
        if signal.1 > 0 {
            valve_statistics.avg_signal_strength = Some(signal.0 / f64::from(signal.1));
        }

        let window_start = now.as_second() - 24 * 3600;
        let mut command_statistics = CommandStatistics {
            total_commands: 0,
            pending_commands: 0,
            completed_commands: 0,
            failed_commands: 0,
            timeout_commands: 0,
            emergency_commands: 0,
            avg_completion_time_seconds: None,
        };
        let mut completion = (0.0f64, 0u32);
        for command in &self.commands {
            if command.created_at.as_second() < window_start {
                continue;
            }
            command_statistics.total_commands += 1;
            match command.status {
                CommandStatus::Pending => command_statistics.pending_commands += 1,
                CommandStatus::Completed => command_statistics.completed_commands += 1,
                CommandStatus::Failed => command_statistics.failed_commands += 1,
                CommandStatus::Timeout => command_statistics.timeout_commands += 1,
                _ => {}
            }
            if command.priority == Priority::Emergency {
                command_statistics.emergency_commands += 1;
            }
            if command.status == CommandStatus::Completed {
                if let Some(completed_at) = command.completed_at {
                    let secs = completed_at.as_second() - command.created_at.as_second();
                    completion = (completion.0 + secs as f64, completion.1 + 1);
                }
            }
        }
        if completion.1 > 0 {
            command_statistics.avg_completion_time_seconds =
                Some(completion.0 / f64::from(completion.1));
        }

        FleetStatistics {
            system_health: SystemHealth::from_counts(
                valve_statistics.active_valves,
                valve_statistics.total_valves,
            ),
            valve_statistics,
            command_statistics,
            last_updated: now,
        }
    }

    /// The device-control gate plus the instant-queue command effect.
    fn apply_command(
        &mut self,
        valve: &ValveId,
        command: &ValveCommand,
        now: Timestamp,
    ) -> Result<CommandReceipt, ClientError> {
        let index = self.row_index(valve)?;
        let valve = self.fleet[index].valve.id.clone();
        // Request validation precedes the device gates, matching the
        // backend's error precedence.
        match command {
            ValveCommand::PartialOpen { percentage, .. } if percentage.0 > 100 => {
                return Err(ClientError::api("Percentage must be between 0 and 100"));
            }
            ValveCommand::EmergencyClose { reason } if reason.trim().is_empty() => {
                return Err(ClientError::api("Reason is required for emergency close"));
            }
            _ => {}
        }
        let kind = command.kind();
        {
            let row = &self.fleet[index];
            match row.valve.status {
                ValveStatus::Inactive => {
                    return Err(ClientError::api("Cannot send commands to inactive valve"));
                }
                ValveStatus::Maintenance => {
                    return Err(ClientError::api("Valve is under maintenance"));
                }
                _ => {}
            }
            if row.valve.is_manual_override && kind != CommandKind::EmergencyClose {
                return Err(ClientError::api(
                    "Valve is in manual override mode. Only emergency commands are allowed.",
                ));
            }
        }

        let priority = command.priority();
        if priority == Priority::Emergency {
            self.cancel_pending(&valve, now);
        }

        let command_value = match command {
            ValveCommand::PartialOpen { percentage, .. } => {
                Some(serde_json::json!({ "percentage": percentage.0 }))
            }
            _ => None,
        };
        let new_state = match command {
            ValveCommand::Open { .. } => Some(ValveState::Open),
            ValveCommand::Close { .. } | ValveCommand::EmergencyClose { .. } => {
                Some(ValveState::Closed)
            }
            ValveCommand::PartialOpen { .. } => Some(ValveState::Partial),
            ValveCommand::StatusCheck => None,
        };

        let id = CommandId::new(Ulid::new().to_string());
        let record = CommandRecord {
            id: id.clone(),
            valve_id: valve.clone(),
            command_type: kind,
            command_value,
            initiated_by: UserId::new(SIM_ACTOR),
            initiated_by_name: None,
            reason: Some(command.effective_reason()),
            priority,
            status: CommandStatus::Completed,
            sent_at: Some(now),
            acknowledged_at: Some(now),
            completed_at: Some(now),
            response_data: None,
            error_message: None,
            retry_count: 0,
            max_retries: 3,
            timeout_seconds: 300,
            expires_at: Timestamp::from_second(now.as_second() + 300).ok(),
            created_at: now,
            updated_at: now,
        };

        let row = &mut self.fleet[index];
        if let Some(state) = new_state {
            row.valve.current_state = state;
            row.valve.last_command = Some(kind);
            row.valve.last_command_at = Some(now);
        }
        row.valve.last_response_at = Some(now);
        row.valve.updated_at = now;

        tracing::debug!(
            valve = %row.valve.valve_id,
            kind = %kind,
            %priority,
            "simulated valve command applied"
        );
        self.commands.push(record);

        Ok(CommandReceipt {
            command_id: id,
            valve_id: valve.clone(),
            command_type: kind,
            status: CommandStatus::Pending,
            priority,
            created_at: now,
        })
    }

    fn cancel_pending(&mut self, valve: &ValveId, now: Timestamp) {
        for command in &mut self.commands {
            if command.valve_id == *valve && command.status == CommandStatus::Pending {
                command.status = CommandStatus::Cancelled;
                command.error_message = Some("Cancelled due to emergency command".into());
                command.updated_at = now;
            }
        }
    }
}

#[async_trait]
impl ValveApi for SimValveApi {
    async fn valves(&self, query: &ValveQuery) -> Result<Paginated<Valve>, ClientError> {
        let state = self.state.lock().await;
        state.check_reachable()?;
        let matches: Vec<&FleetValve> = state
            .fleet
            .iter()
            .filter(|row| query.status.is_none_or(|s| row.valve.status == s))
            .filter(|row| query.state.is_none_or(|s| row.valve.current_state == s))
            .filter(|row| {
                query
                    .meter_id
                    .as_ref()
                    .is_none_or(|m| row.valve.meter_id == *m)
            })
            .collect();
        let total = matches.len() as u32;
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
        let offset = query.offset.unwrap_or(0);
        let items: Vec<Valve> = matches
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|row| row.valve.clone())
            .collect();
        let has_more = offset + (items.len() as u32) < total;
        Ok(Paginated {
            items,
            pagination: Pagination {
                total,
                limit,
                offset,
                has_more,
            },
        })
    }

    async fn snapshot(&self, valve: &ValveId) -> Result<ValveSnapshot, ClientError> {
        let mut state = self.state.lock().await;
        state.snapshot_fetches += 1;
        state.check_reachable()?;
        let now = Timestamp::now();
        let index = state.row_index(valve)?;
        let row = &state.fleet[index];
        let canonical = row.valve.id.clone();
        Ok(ValveSnapshot {
            valve: row.valve.clone(),
            meter: Some(MeterLink {
                meter_id: row.valve.meter_id.clone(),
                last_credit: row.last_credit,
                auto_valve_control: row.auto_valve_control,
            }),
            recent_commands: state.recent_commands(&canonical, 5).into(),
            active_alerts: state.active_alerts(&canonical).into(),
            health_status: row.valve.health(now),
            last_updated: now,
        })
    }

    async fn overview(&self) -> Result<FleetOverview, ClientError> {
        let mut state = self.state.lock().await;
        state.overview_fetches += 1;
        state.check_reachable()?;
        let now = Timestamp::now();
        Ok(FleetOverview {
            valves: state.served_rows(now).into(),
            statistics: state.statistics(now),
        })
    }

    async fn send_command(
        &self,
        valve: &ValveId,
        command: &ValveCommand,
    ) -> Result<CommandReceipt, ClientError> {
        let mut state = self.state.lock().await;
        state.check_reachable()?;
        state.apply_command(valve, command, Timestamp::now())
    }

    async fn commands(
        &self,
        valve: &ValveId,
        limit: u32,
    ) -> Result<Vec<CommandRecord>, ClientError> {
        let state = self.state.lock().await;
        state.check_reachable()?;
        let index = state.row_index(valve)?;
        let canonical = state.fleet[index].valve.id.clone();
        Ok(state.recent_commands(&canonical, limit as usize))
    }

    async fn alerts(&self, valve: &ValveId) -> Result<Vec<Alert>, ClientError> {
        let state = self.state.lock().await;
        state.check_reachable()?;
        let index = state.row_index(valve)?;
        let canonical = state.fleet[index].valve.id.clone();
        Ok(state.active_alerts(&canonical))
    }

    async fn acknowledge_alert(&self, alert: &AlertId) -> Result<(), ClientError> {
        let mut state = self.state.lock().await;
        state.check_reachable()?;
        let now = Timestamp::now();
        let alert = state
            .alerts
            .iter_mut()
            .find(|a| a.id == *alert)
            .ok_or_else(|| ClientError::api("Alert not found"))?;
        alert.is_acknowledged = true;
        alert.acknowledged_by = Some(UserId::new(SIM_ACTOR));
        alert.acknowledged_at = Some(now);
        Ok(())
    }

    async fn resolve_alert(
        &self,
        alert: &AlertId,
        notes: Option<&str>,
    ) -> Result<(), ClientError> {
        let mut state = self.state.lock().await;
        state.check_reachable()?;
        let now = Timestamp::now();
        let alert = state
            .alerts
            .iter_mut()
            .find(|a| a.id == *alert)
            .ok_or_else(|| ClientError::api("Alert not found"))?;
        alert.is_resolved = true;
        alert.resolved_by = Some(UserId::new(SIM_ACTOR));
        alert.resolved_at = Some(now);
        alert.resolution_notes = notes.map(Into::into);
        Ok(())
    }

    async fn enable_override(&self, valve: &ValveId, reason: &str) -> Result<(), ClientError> {
        if reason.trim().is_empty() {
            return Err(ClientError::api("Reason is required"));
        }
        let mut state = self.state.lock().await;
        state.check_reachable()?;
        let now = Timestamp::now();
        let index = state.row_index(valve)?;
        let code;
        let canonical;
        {
            let row = &mut state.fleet[index];
            row.valve.is_manual_override = true;
            row.valve.manual_override_reason = Some(reason.into());
            row.valve.manual_override_at = Some(now);
            row.valve.updated_at = now;
            code = row.valve.valve_id.clone();
            canonical = row.valve.id.clone();
        }
        state.alerts.push(Alert {
            id: AlertId::new(Ulid::new().to_string()),
            valve_id: canonical,
            alert_type: AlertType::ManualOverride,
            severity: Severity::Info,
            title: "Manual Override Enabled".into(),
            message: format!("Valve {code} was placed under manual override: {reason}").into(),
            alert_data: None,
            is_acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
            is_resolved: false,
            resolved_by: None,
            resolved_at: None,
            resolution_notes: None,
            created_at: now,
        });
        Ok(())
    }

    async fn disable_override(&self, valve: &ValveId) -> Result<(), ClientError> {
        let mut state = self.state.lock().await;
        state.check_reachable()?;
        let now = Timestamp::now();
        let index = state.row_index(valve)?;
        let canonical;
        {
            let row = &mut state.fleet[index];
            row.valve.is_manual_override = false;
            row.valve.manual_override_reason = None;
            row.valve.manual_override_at = None;
            row.valve.updated_at = now;
            canonical = row.valve.id.clone();
        }
        for alert in &mut state.alerts {
            if alert.valve_id == canonical
                && alert.alert_type == AlertType::ManualOverride
                && !alert.is_resolved
            {
                alert.is_resolved = true;
                alert.resolved_by = Some(UserId::new(SIM_ACTOR));
                alert.resolved_at = Some(now);
                alert.resolution_notes = Some("Override disabled".into());
            }
        }
        Ok(())
    }

    async fn statistics(&self) -> Result<FleetStatistics, ClientError> {
        let state = self.state.lock().await;
        state.check_reachable()?;
        Ok(state.statistics(Timestamp::now()))
    }

    async fn failed_commands(&self, hours: u32) -> Result<Vec<CommandRecord>, ClientError> {
        let state = self.state.lock().await;
        state.check_reachable()?;
        let window_start = Timestamp::now().as_second() - i64::from(hours) * 3600;
        Ok(state
            .commands
            .iter()
            .rev()
            .filter(|c| {
                matches!(c.status, CommandStatus::Failed | CommandStatus::Timeout)
                    && c.created_at.as_second() >= window_start
            })
            .cloned()
            .collect())
    }

    async fn bulk(&self, request: &BulkRequest) -> Result<BulkOutcome, ClientError> {
        if request.reason.trim().is_empty() {
            return Err(ClientError::api("Reason is required"));
        }
        let mut state = self.state.lock().await;
        state.check_reachable()?;
        let priority = request.priority.unwrap_or_default();
        let mut successful = Vec::new();
        let mut errors = Vec::new();
        for valve in &request.valve_ids {
            let command = match request.operation {
                BulkOperation::Open => ValveCommand::Open {
                    reason: Some(request.reason.clone()),
                    priority,
                },
                BulkOperation::Close => ValveCommand::Close {
                    reason: Some(request.reason.clone()),
                    priority,
                },
                BulkOperation::EmergencyClose => ValveCommand::EmergencyClose {
                    reason: request.reason.clone(),
                },
                BulkOperation::StatusCheck => ValveCommand::StatusCheck,
            };
            match state.apply_command(valve, &command, Timestamp::now()) {
                Ok(receipt) => successful.push(receipt),
                Err(err) => errors.push(BulkError {
                    valve_id: valve.clone(),
                    error: err.to_string().into(),
                }),
            }
        }
        Ok(BulkOutcome {
            operation: request.operation,
            total_processed: successful.len() as u32,
            total_errors: errors.len() as u32,
            successful,
            errors,
        })
    }

    async fn valves_by_meter(&self, meter: &MeterId) -> Result<Vec<Valve>, ClientError> {
        let state = self.state.lock().await;
        state.check_reachable()?;
        Ok(state
            .fleet
            .iter()
            .filter(|row| row.valve.meter_id == *meter)
            .map(|row| row.valve.clone())
            .collect())
    }
}

const PROPERTY_NAMES: &[&str] = &[
    "Taman Anggrek Residence",
    "Green Lake Apartments",
    "Menteng Park Tower",
    "Kemang Village",
    "Sudirman Suites",
    "Pondok Indah Estate",
];

const CLIENT_NAMES: &[&str] = &["Tirta Jaya Water Authority", "Tirta Musi Utility"];

/// Builds `count` fixture valves. Most are healthy and open, with a
/// spread of closed, degraded, and out-of-service units mixed in; the
/// fifth valve sits under manual override.
fn sample_fleet(count: usize, now: Timestamp) -> Vec<FleetValve> {
    let mut rng = rand::rng();
    let mut fleet = Vec::with_capacity(count);
    for i in 0..count {
        let status = if rng.random_ratio(85, 100) {
            ValveStatus::Active
        } else {
            match rng.random_range(0..4) {
                0 => ValveStatus::Inactive,
                1 => ValveStatus::Maintenance,
                2 => ValveStatus::Error,
                _ => ValveStatus::Offline,
            }
        };
        let current_state = if status == ValveStatus::Offline {
            ValveState::Unknown
        } else {
            match rng.random_range(0..10) {
                0..=5 => ValveState::Open,
                6..=8 => ValveState::Closed,
                _ => ValveState::Partial,
            }
        };
        let valve_type = match rng.random_range(0..10) {
            0..=5 => ValveType::Main,
            6..=7 => ValveType::Secondary,
            8 => ValveType::Emergency,
            _ => ValveType::Bypass,
        };
        let last_response_age = if status == ValveStatus::Offline {
            rng.random_range(3600..86_400)
        } else {
            rng.random_range(5..600)
        };
        let is_manual_override = i == 4;
        let max_pressure = 10.0;

        let valve = Valve {
            id: ValveId::new(Ulid::new().to_string()),
            valve_id: format!("VLV-{:04}", i + 1).into(),
            meter_id: MeterId::new(format!("MTR-{:04}", i + 1)),
            property_id: PropertyId::new(Ulid::new().to_string()),
            valve_type,
            valve_model: "AquaGate 200".into(),
            valve_serial: format!("AG2-{:06}", 140_000 + i).into(),
            firmware_version: "2.4.1".into(),
            hardware_version: "1.2".into(),
            location_description: Some(
                format!("Utility riser, block {}", (b'A' + (i % 6) as u8) as char).into(),
            ),
            latitude: Some(-6.2 + rng.random_range(-0.05..0.05)),
            longitude: Some(106.8 + rng.random_range(-0.05..0.05)),
            installation_date: Timestamp::from_second(now.as_second() - 86_400 * 365)
                .unwrap_or(now),
            status,
            current_state,
            last_command: None,
            last_command_at: None,
            last_response_at: Timestamp::from_second(now.as_second() - last_response_age).ok(),
            battery_level: Some(rng.random_range(8.0..100.0)),
            signal_strength: Some(rng.random_range(-95..-40)),
            operating_pressure: Some(rng.random_range(1.0..9.5)),
            max_pressure,
            temperature: Some(rng.random_range(18.0..35.0)),
            is_manual_override,
            manual_override_reason: is_manual_override
                .then(|| "Field maintenance crew on site".into()),
            manual_override_at: is_manual_override.then_some(now),
            auto_close_enabled: rng.random_ratio(7, 10),
            emergency_close_enabled: true,
            created_at: Timestamp::from_second(now.as_second() - 86_400 * 400).unwrap_or(now),
            updated_at: now,
        };
        fleet.push(FleetValve {
            valve,
            property_name: PROPERTY_NAMES[i % PROPERTY_NAMES.len()].into(),
            client_name: CLIENT_NAMES[i % CLIENT_NAMES.len()].into(),
            last_credit: rng.random_range(0.0..500_000.0),
            auto_valve_control: rng.random_ratio(7, 10),
            low_credit_threshold: 10_000.0,
            health_status: HealthStatus::Normal,
            pending_commands: 0,
            active_alerts: 0,
        });
    }
    fleet
}

/// Raises the alerts the backend monitoring rules would have raised for
/// the seeded telemetry.
fn seed_alerts(fleet: &[FleetValve], now: Timestamp) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let mut push = |valve: &Valve, alert_type, severity, title: &str, message: String| {
        alerts.push(Alert {
            id: AlertId::new(Ulid::new().to_string()),
            valve_id: valve.id.clone(),
            alert_type,
            severity,
            title: title.into(),
            message: message.into(),
            alert_data: None,
            is_acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
            is_resolved: false,
            resolved_by: None,
            resolved_at: None,
            resolution_notes: None,
            created_at: now,
        });
    };
    for row in fleet {
        let valve = &row.valve;
        let code = &valve.valve_id;
        if let Some(level) = valve.battery_level {
            if level <= 10.0 {
                push(
                    valve,
                    AlertType::LowBattery,
                    Severity::Critical,
                    "Critical Battery Level",
                    format!("Valve {code} battery level is critically low at {level:.0}%"),
                );
            } else if level <= LOW_BATTERY_PERCENT {
                push(
                    valve,
                    AlertType::LowBattery,
                    Severity::Warning,
                    "Low Battery Warning",
                    format!("Valve {code} battery level is {level:.0}%"),
                );
            }
        }
        if let Some(pressure) = valve.operating_pressure {
            let max = valve.max_pressure;
            if pressure > max * PRESSURE_WARN_RATIO {
                push(
                    valve,
                    AlertType::PressureHigh,
                    Severity::Warning,
                    "High Pressure Warning",
                    format!("Valve {code} operating pressure is {pressure:.1} bar (max: {max:.1} bar)"),
                );
            }
        }
        if let Some(strength) = valve.signal_strength {
            if strength < WEAK_SIGNAL_DBM {
                push(
                    valve,
                    AlertType::CommunicationLost,
                    Severity::Warning,
                    "Weak Signal",
                    format!("Valve {code} has weak signal strength: {strength} dBm"),
                );
            }
        }
        if valve.is_manual_override {
            let reason = valve
                .manual_override_reason
                .as_deref()
                .unwrap_or("no reason recorded");
            push(
                valve,
                AlertType::ManualOverride,
                Severity::Info,
                "Manual Override Enabled",
                format!("Valve {code} was placed under manual override: {reason}"),
            );
        }
    }
    alerts
}
