use serde::{Deserialize, Serialize};
use ulid::Ulid;

mod command;
mod fleet;
mod resource;

pub use command::*;
pub use fleet::*;
pub use resource::*;

// Backend payloads are decoded once and then read-mostly. `Box<str>` and
// `Box<[T]>` keep those allocations compact and make accidental cloning of
// large values visible at the call site.
pub(crate) type BoxStr = Box<str>;
pub(crate) type BoxList<T> = Box<[T]>;

macro_rules! str_id {
    ($($(#[$doc:meta])* $name:ident),+ $(,)?) => {$(
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub BoxStr);

        impl $name {
            pub fn new(value: impl Into<BoxStr>) -> Self {
                Self(value.into())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    )+};
}

str_id! {
    /// Backend row id of a valve; the key used by all valve endpoints.
    ValveId,
    /// Backend row id of a meter.
    MeterId,
    /// Backend row id of a property.
    PropertyId,
    /// Backend row id of a customer.
    CustomerId,
    /// Backend row id of a payment.
    PaymentId,
    /// Backend row id of a tariff.
    TariffId,
    /// Backend row id of a valve command.
    CommandId,
    /// Backend row id of a valve alert.
    AlertId,
    /// Backend row id of the user a command or acknowledgement is attributed to.
    UserId,
}

/// Client-generated correlation id attached to each outgoing command.
/// Logged on both ends; the backend is not assumed to deduplicate on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Ulid);

impl RequestId {
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Percentage value in the range 0–100 (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Percentage(pub u8);

impl Percentage {
    pub const FULL: Percentage = Percentage(100);

    /// Returns `None` when `value` exceeds 100.
    pub fn new(value: u8) -> Option<Self> {
        (value <= 100).then_some(Self(value))
    }
}

/// Battery level below which a valve is reported unhealthy, in percent.
pub const LOW_BATTERY_PERCENT: f64 = 20.0;
/// Signal strength below which a valve is reported unhealthy, in dBm.
pub const WEAK_SIGNAL_DBM: i16 = -80;
/// Fraction of `max_pressure` above which operating pressure is unhealthy.
pub const PRESSURE_WARN_RATIO: f64 = 0.9;
/// Silence on the device channel longer than this counts as lost communication.
pub const COMMS_TIMEOUT_SECONDS: i64 = 30 * 60;

/// Hardware classification of a valve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValveType {
    Main,
    Secondary,
    Emergency,
    Bypass,
}

impl ValveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Secondary => "secondary",
            Self::Emergency => "emergency",
            Self::Bypass => "bypass",
        }
    }
}

impl std::fmt::Display for ValveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device health reported by the backend. Distinct from the physical
/// position, which lives in [`ValveState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValveStatus {
    Active,
    Inactive,
    Maintenance,
    Error,
    Offline,
}

impl ValveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Maintenance => "maintenance",
            Self::Error => "error",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for ValveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical position of the valve actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValveState {
    Open,
    Closed,
    Partial,
    Unknown,
}

impl ValveState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Partial => "partial",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ValveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote shutoff valve as reported by the backend.
///
/// The client never owns one of these; it caches the last fetched snapshot
/// and the backend remains authoritative for every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Valve {
    /// Stable identity of this valve.
    pub id: ValveId,
    /// Business code printed on the unit, e.g. `VLV-0001`.
    pub valve_id: BoxStr,
    /// Meter this valve is plumbed to.
    pub meter_id: MeterId,
    /// Property the valve is installed at.
    pub property_id: PropertyId,
    pub valve_type: ValveType,
    pub valve_model: BoxStr,
    pub valve_serial: BoxStr,
    pub firmware_version: BoxStr,
    pub hardware_version: BoxStr,
    pub location_description: Option<BoxStr>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub installation_date: jiff::Timestamp,
    /// Device health.
    pub status: ValveStatus,
    /// Physical position.
    pub current_state: ValveState,
    /// Most recent actuator command, if any was ever issued.
    pub last_command: Option<CommandKind>,
    pub last_command_at: Option<jiff::Timestamp>,
    /// Last time the device answered on its control channel.
    pub last_response_at: Option<jiff::Timestamp>,
    /// Battery charge in percent. Absent until the device first reports.
    pub battery_level: Option<f64>,
    /// Received signal strength in dBm.
    pub signal_strength: Option<i16>,
    /// Line pressure at the valve in bar.
    pub operating_pressure: Option<f64>,
    /// Rated maximum pressure in bar.
    pub max_pressure: f64,
    /// Housing temperature in °C.
    pub temperature: Option<f64>,
    /// A human has taken direct control; remote commands are restricted
    /// to emergency close while this is set.
    pub is_manual_override: bool,
    pub manual_override_reason: Option<BoxStr>,
    pub manual_override_at: Option<jiff::Timestamp>,
    pub auto_close_enabled: bool,
    pub emergency_close_enabled: bool,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl Valve {
    /// Derives the health classification the platform shows for a valve.
    ///
    /// Device status wins over telemetry, telemetry over silence. First
    /// matching rule applies.
    pub fn health(&self, now: jiff::Timestamp) -> HealthStatus {
        match self.status {
            ValveStatus::Offline => return HealthStatus::Offline,
            ValveStatus::Error => return HealthStatus::Error,
            ValveStatus::Maintenance => return HealthStatus::Maintenance,
            ValveStatus::Active | ValveStatus::Inactive => {}
        }

        if self.battery_level.is_some_and(|b| b < LOW_BATTERY_PERCENT) {
            return HealthStatus::LowBattery;
        }
        if self.signal_strength.is_some_and(|s| s < WEAK_SIGNAL_DBM) {
            return HealthStatus::WeakSignal;
        }
        if self
            .operating_pressure
            .is_some_and(|p| p > self.max_pressure * PRESSURE_WARN_RATIO)
        {
            return HealthStatus::HighPressure;
        }
        if let Some(last) = self.last_response_at {
            if now.as_second() - last.as_second() > COMMS_TIMEOUT_SECONDS {
                return HealthStatus::CommunicationLost;
            }
        }

        HealthStatus::Normal
    }
}

/// Health classification derived from device status and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Normal,
    LowBattery,
    WeakSignal,
    HighPressure,
    CommunicationLost,
    Offline,
    Error,
    Maintenance,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::LowBattery => "low_battery",
            Self::WeakSignal => "weak_signal",
            Self::HighPressure => "high_pressure",
            Self::CommunicationLost => "communication_lost",
            Self::Offline => "offline",
            Self::Error => "error",
            Self::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meter summary embedded in a valve snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeterLink {
    pub meter_id: MeterId,
    /// Remaining prepaid credit on the meter.
    pub last_credit: f64,
    /// Whether the meter is allowed to drive this valve on low credit.
    pub auto_valve_control: bool,
}

/// Alert classification raised by the backend monitoring rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    LowBattery,
    CommunicationLost,
    PressureHigh,
    PressureLow,
    TemperatureHigh,
    ManualOverride,
    CommandFailed,
    MaintenanceDue,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowBattery => "low_battery",
            Self::CommunicationLost => "communication_lost",
            Self::PressureHigh => "pressure_high",
            Self::PressureLow => "pressure_low",
            Self::TemperatureHigh => "temperature_high",
            Self::ManualOverride => "manual_override",
            Self::CommandFailed => "command_failed",
            Self::MaintenanceDue => "maintenance_due",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
    Emergency,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Emergency => "emergency",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An alert raised against a valve. Read-only on the client apart from
/// acknowledge/resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub valve_id: ValveId,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub title: BoxStr,
    pub message: BoxStr,
    pub alert_data: Option<serde_json::Value>,
    pub is_acknowledged: bool,
    pub acknowledged_by: Option<UserId>,
    pub acknowledged_at: Option<jiff::Timestamp>,
    pub is_resolved: bool,
    pub resolved_by: Option<UserId>,
    pub resolved_at: Option<jiff::Timestamp>,
    pub resolution_notes: Option<BoxStr>,
    pub created_at: jiff::Timestamp,
}

/// Everything the single-valve control view needs in one fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValveSnapshot {
    pub valve: Valve,
    /// Absent when the valve's meter has been deleted or is unknown.
    pub meter: Option<MeterLink>,
    /// The five most recent commands, newest first.
    pub recent_commands: BoxList<CommandRecord>,
    pub active_alerts: BoxList<Alert>,
    pub health_status: HealthStatus,
    pub last_updated: jiff::Timestamp,
}
