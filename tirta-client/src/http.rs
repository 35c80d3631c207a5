use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use tirta_core::{
    Alert, AlertId, BulkOutcome, BulkRequest, CommandReceipt, CommandRecord, FleetOverview,
    FleetStatistics, MeterId, RequestId, Valve, ValveCommand, ValveId, ValveSnapshot,
};

use crate::{
    ClientError,
    api::{ApiEnvelope, EnvelopeStatus, Paginated, Pagination, ValveApi, ValveQuery},
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// JSON-over-HTTP implementation of [`ValveApi`] against the platform
/// backend.
pub struct HttpValveApi {
    http: reqwest::Client,
    base_url: Box<str>,
    token: Option<Box<str>>,
    timeout: Duration,
}

impl HttpValveApi {
    /// `base_url` is the API root, e.g. `https://api.example.com/api`.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.as_ref().trim_end_matches('/').into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Attaches a bearer token to every request.
    pub fn with_token(mut self, token: impl Into<Box<str>>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, format!("{}{path}", self.base_url))
            .timeout(self.timeout);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Runs a request and unwraps the response envelope. Non-success HTTP
    /// statuses and `status: "error"` envelopes both surface as
    /// [`ClientError::Api`] with the backend's message when it sent one.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| format!("HTTP {status}").into());
            return Err(ClientError::Api {
                status: Some(status.as_u16()),
                message,
            });
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;
        if envelope.status == EnvelopeStatus::Error {
            return Err(ClientError::Api {
                status: Some(status.as_u16()),
                message: envelope
                    .message
                    .unwrap_or_else(|| "backend reported an error".into()),
            });
        }
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("response envelope carried no data".into()))
    }

    /// Like [`Self::execute`] for endpoints whose success payload is only
    /// the envelope message.
    async fn execute_unit(&self, request: RequestBuilder) -> Result<(), ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let envelope = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body).ok();
        let failed = !status.is_success()
            || envelope
                .as_ref()
                .is_some_and(|envelope| envelope.status == EnvelopeStatus::Error);
        if failed {
            let message = envelope
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| format!("HTTP {status}").into());
            return Err(ClientError::Api {
                status: Some(status.as_u16()),
                message,
            });
        }
        Ok(())
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        self.execute(self.request(Method::GET, path).query(query)).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ClientError> {
        self.execute(self.request(Method::POST, path).json(body)).await
    }

    pub(crate) async fn post_unit(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<(), ClientError> {
        self.execute_unit(self.request(Method::POST, path).json(body))
            .await
    }

    pub(crate) async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ClientError> {
        self.execute(self.request(Method::PUT, path).json(body)).await
    }

    pub(crate) async fn delete_unit(&self, path: &str) -> Result<(), ClientError> {
        self.execute_unit(self.request(Method::DELETE, path)).await
    }

    /// `GET /settings/{key}`: raw value of one platform setting.
    pub async fn setting(&self, key: &str) -> Result<serde_json::Value, ClientError> {
        self.get_json(&format!("/settings/{key}"), &[]).await
    }

    /// `PUT /settings/{key}`
    pub async fn put_setting(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), ClientError> {
        self.execute_unit(
            self.request(Method::PUT, &format!("/settings/{key}"))
                .json(value),
        )
        .await
    }
}

// Wrappers the backend nests list payloads in.

#[derive(Debug, serde::Deserialize)]
struct ValveList {
    valves: Vec<Valve>,
    pagination: Pagination,
}

#[derive(Debug, serde::Deserialize)]
struct MeterValveList {
    valves: Vec<Valve>,
}

#[derive(Debug, serde::Deserialize)]
struct CommandList {
    commands: Vec<CommandRecord>,
}

#[derive(Debug, serde::Deserialize)]
struct AlertList {
    active_alerts: Vec<Alert>,
}

#[derive(Debug, serde::Deserialize)]
struct FailedCommandList {
    failed_commands: Vec<CommandRecord>,
}

#[async_trait]
impl ValveApi for HttpValveApi {
    async fn valves(&self, query: &ValveQuery) -> Result<Paginated<Valve>, ClientError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(offset) = query.offset {
            params.push(("offset", offset.to_string()));
        }
        if let Some(status) = query.status {
            params.push(("status", status.to_string()));
        }
        if let Some(state) = query.state {
            params.push(("state", state.to_string()));
        }
        if let Some(meter_id) = &query.meter_id {
            params.push(("meter_id", meter_id.to_string()));
        }
        let list: ValveList = self.get_json("/valves", &params).await?;
        Ok(Paginated {
            items: list.valves,
            pagination: list.pagination,
        })
    }

    async fn snapshot(&self, valve: &ValveId) -> Result<ValveSnapshot, ClientError> {
        self.get_json(&format!("/valves/{valve}"), &[]).await
    }

    async fn overview(&self) -> Result<FleetOverview, ClientError> {
        self.get_json("/valves/overview", &[]).await
    }

    async fn send_command(
        &self,
        valve: &ValveId,
        command: &ValveCommand,
    ) -> Result<CommandReceipt, ClientError> {
        let request_id = RequestId::generate();
        tracing::debug!(
            valve = %valve,
            kind = %command.kind(),
            %request_id,
            "dispatching valve command"
        );
        let path = match command {
            ValveCommand::StatusCheck => {
                return self
                    .get_json(&format!("/valves/{valve}/status-check"), &[])
                    .await;
            }
            ValveCommand::Open { .. } => format!("/valves/{valve}/open"),
            ValveCommand::Close { .. } => format!("/valves/{valve}/close"),
            ValveCommand::PartialOpen { .. } => format!("/valves/{valve}/partial-open"),
            ValveCommand::EmergencyClose { .. } => format!("/valves/{valve}/emergency-close"),
        };
        self.post_json(&path, &command.body(request_id)).await
    }

    async fn commands(
        &self,
        valve: &ValveId,
        limit: u32,
    ) -> Result<Vec<CommandRecord>, ClientError> {
        let list: CommandList = self
            .get_json(
                &format!("/valves/{valve}/commands"),
                &[("limit", limit.to_string())],
            )
            .await?;
        Ok(list.commands)
    }

    async fn alerts(&self, valve: &ValveId) -> Result<Vec<Alert>, ClientError> {
        let list: AlertList = self
            .get_json(&format!("/valves/{valve}/alerts"), &[])
            .await?;
        Ok(list.active_alerts)
    }

    async fn acknowledge_alert(&self, alert: &AlertId) -> Result<(), ClientError> {
        self.post_unit(
            &format!("/valves/alerts/{alert}/acknowledge"),
            &serde_json::json!({}),
        )
        .await
    }

    async fn resolve_alert(
        &self,
        alert: &AlertId,
        notes: Option<&str>,
    ) -> Result<(), ClientError> {
        let body = match notes {
            Some(notes) => serde_json::json!({ "resolution_notes": notes }),
            None => serde_json::json!({}),
        };
        self.post_unit(&format!("/valves/alerts/{alert}/resolve"), &body)
            .await
    }

    async fn enable_override(&self, valve: &ValveId, reason: &str) -> Result<(), ClientError> {
        self.post_unit(
            &format!("/valves/{valve}/enable-override"),
            &serde_json::json!({ "reason": reason }),
        )
        .await
    }

    async fn disable_override(&self, valve: &ValveId) -> Result<(), ClientError> {
        self.post_unit(
            &format!("/valves/{valve}/disable-override"),
            &serde_json::json!({}),
        )
        .await
    }

    async fn statistics(&self) -> Result<FleetStatistics, ClientError> {
        self.get_json("/valves/statistics", &[]).await
    }

    async fn failed_commands(&self, hours: u32) -> Result<Vec<CommandRecord>, ClientError> {
        let list: FailedCommandList = self
            .get_json("/valves/failed-commands", &[("hours", hours.to_string())])
            .await?;
        Ok(list.failed_commands)
    }

    async fn bulk(&self, request: &BulkRequest) -> Result<BulkOutcome, ClientError> {
        self.post_json("/valves/bulk-operation", request).await
    }

    async fn valves_by_meter(&self, meter: &MeterId) -> Result<Vec<Valve>, ClientError> {
        let list: MeterValveList = self
            .get_json(&format!("/meters/{meter}/valves"), &[])
            .await?;
        Ok(list.valves)
    }
}
