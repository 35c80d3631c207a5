use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tirta_core::{
    Alert, AlertId, BulkOutcome, BulkRequest, CommandReceipt, CommandRecord, FleetOverview,
    FleetStatistics, MeterId, Valve, ValveCommand, ValveId, ValveSnapshot, ValveState,
    ValveStatus,
};

use crate::ClientError;

/// Envelope every backend response arrives in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: EnvelopeStatus,
    pub data: Option<T>,
    pub message: Option<Box<str>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// Pagination block list endpoints attach next to their rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u32,
    pub limit: u32,
    pub offset: u32,
    pub has_more: bool,
}

/// One page of rows plus where it sits in the collection.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// limit/offset window for list requests.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

/// Server-side filter for `GET /valves`.
#[derive(Debug, Clone, Default)]
pub struct ValveQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub status: Option<ValveStatus>,
    pub state: Option<ValveState>,
    pub meter_id: Option<MeterId>,
}

impl ValveQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_status(mut self, status: ValveStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_state(mut self, state: ValveState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_meter(mut self, meter_id: MeterId) -> Self {
        self.meter_id = Some(meter_id);
        self
    }
}

/// The device-control surface the dashboard consumes.
///
/// Two implementations exist: [`crate::HttpValveApi`] speaking JSON over
/// HTTP to the platform backend, and [`crate::SimValveApi`] serving an
/// in-process fixture fleet with the same gate rules. Callers stay
/// generic so swapping them is a configuration decision, not a code path.
#[async_trait]
pub trait ValveApi: Send + Sync + 'static {
    /// `GET /valves`
    async fn valves(&self, query: &ValveQuery) -> Result<Paginated<Valve>, ClientError>;

    /// `GET /valves/{id}`, the single-valve control view payload.
    async fn snapshot(&self, valve: &ValveId) -> Result<ValveSnapshot, ClientError>;

    /// `GET /valves/overview`: every valve, pre-joined, plus statistics.
    async fn overview(&self) -> Result<FleetOverview, ClientError>;

    /// Dispatches one command to its endpoint. The command is sent once
    /// and never retried here.
    async fn send_command(
        &self,
        valve: &ValveId,
        command: &ValveCommand,
    ) -> Result<CommandReceipt, ClientError>;

    /// `GET /valves/{id}/commands`: recent commands, newest first.
    async fn commands(&self, valve: &ValveId, limit: u32)
    -> Result<Vec<CommandRecord>, ClientError>;

    /// `GET /valves/{id}/alerts`: unresolved alerts for one valve.
    async fn alerts(&self, valve: &ValveId) -> Result<Vec<Alert>, ClientError>;

    async fn acknowledge_alert(&self, alert: &AlertId) -> Result<(), ClientError>;

    async fn resolve_alert(&self, alert: &AlertId, notes: Option<&str>)
    -> Result<(), ClientError>;

    /// Puts the valve under manual override; from then on the backend
    /// refuses everything but emergency close.
    async fn enable_override(&self, valve: &ValveId, reason: &str) -> Result<(), ClientError>;

    async fn disable_override(&self, valve: &ValveId) -> Result<(), ClientError>;

    /// `GET /valves/statistics`: the overview statistics block alone.
    async fn statistics(&self) -> Result<FleetStatistics, ClientError>;

    /// `GET /valves/failed-commands`: failures within the trailing window.
    async fn failed_commands(&self, hours: u32) -> Result<Vec<CommandRecord>, ClientError>;

    /// `POST /valves/bulk-operation`: per-valve outcomes, refusals do not
    /// abort the batch.
    async fn bulk(&self, request: &BulkRequest) -> Result<BulkOutcome, ClientError>;

    /// `GET /meters/{meter_id}/valves`
    async fn valves_by_meter(&self, meter: &MeterId) -> Result<Vec<Valve>, ClientError>;
}
