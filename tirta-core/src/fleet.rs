use serde::{Deserialize, Serialize};

use crate::{BoxList, BoxStr, HealthStatus, Valve};

/// One row of the fleet overview: the valve plus the joins the dashboard
/// table shows (property, customer-facing meter fields, derived health,
/// queue and alert counts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetValve {
    #[serde(flatten)]
    pub valve: Valve,
    pub property_name: BoxStr,
    pub client_name: BoxStr,
    pub last_credit: f64,
    pub auto_valve_control: bool,
    pub low_credit_threshold: f64,
    pub health_status: HealthStatus,
    pub pending_commands: u32,
    pub active_alerts: u32,
}

/// Fleet-wide valve counts and telemetry averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValveStatistics {
    pub total_valves: u32,
    pub active_valves: u32,
    pub offline_valves: u32,
    pub maintenance_valves: u32,
    pub error_valves: u32,
    pub open_valves: u32,
    pub closed_valves: u32,
    pub partial_valves: u32,
    pub low_battery_valves: u32,
    pub avg_battery_level: Option<f64>,
    pub avg_signal_strength: Option<f64>,
}

/// Command queue counts over the trailing 24 hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandStatistics {
    pub total_commands: u32,
    pub pending_commands: u32,
    pub completed_commands: u32,
    pub failed_commands: u32,
    pub timeout_commands: u32,
    pub emergency_commands: u32,
    pub avg_completion_time_seconds: Option<f64>,
}

/// Coarse fleet condition shown in the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemHealth {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
    NoValves,
}

impl SystemHealth {
    /// Tiers the active/total ratio: ≥95% excellent, ≥85% good, ≥70% fair,
    /// ≥50% poor, anything lower critical.
    pub fn from_counts(active_valves: u32, total_valves: u32) -> Self {
        if total_valves == 0 {
            return Self::NoValves;
        }
        let pct = f64::from(active_valves) / f64::from(total_valves) * 100.0;
        if pct >= 95.0 {
            Self::Excellent
        } else if pct >= 85.0 {
            Self::Good
        } else if pct >= 70.0 {
            Self::Fair
        } else if pct >= 50.0 {
            Self::Poor
        } else {
            Self::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Critical => "critical",
            Self::NoValves => "no_valves",
        }
    }
}

impl std::fmt::Display for SystemHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend-computed statistics block attached to the overview and served
/// standalone from `/valves/statistics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetStatistics {
    pub valve_statistics: ValveStatistics,
    pub command_statistics: CommandStatistics,
    pub system_health: SystemHealth,
    pub last_updated: jiff::Timestamp,
}

/// Payload of `GET /valves/overview`: every valve, pre-joined and
/// pre-aggregated. The dashboard filters rows client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetOverview {
    pub valves: BoxList<FleetValve>,
    pub statistics: FleetStatistics,
}
