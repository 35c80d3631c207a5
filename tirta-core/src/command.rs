use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BoxStr, CommandId, Percentage, RequestId, UserId, ValveId};

/// The command vocabulary understood by the device-control service.
///
/// The client dispatches the first five; `reset` shows up in command
/// history when field staff trigger it through other channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Open,
    Close,
    PartialOpen,
    EmergencyClose,
    StatusCheck,
    Reset,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::PartialOpen => "partial_open",
            Self::EmergencyClose => "emergency_close",
            Self::StatusCheck => "status_check",
            Self::Reset => "reset",
        }
    }

    /// Reason recorded when the operator does not supply one.
    pub fn default_reason(&self) -> &'static str {
        match self {
            Self::StatusCheck => "Status check request",
            Self::Open => "open command",
            Self::Close => "close command",
            Self::PartialOpen => "partial_open command",
            Self::EmergencyClose => "emergency_close command",
            Self::Reset => "reset command",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatch priority of a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Emergency,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Emergency => "emergency",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a command inside the backend queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Pending,
    Sent,
    Acknowledged,
    Completed,
    Failed,
    Timeout,
    Cancelled,
}

impl CommandStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Acknowledged => "acknowledged",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command as the operator expresses it, one variant per actuator verb.
///
/// `EmergencyClose` carries no priority because it is always dispatched at
/// emergency priority, and its reason is mandatory. `StatusCheck` is a
/// read: no body goes on the wire for it.
#[derive(Debug, Clone, PartialEq)]
pub enum ValveCommand {
    Open {
        reason: Option<BoxStr>,
        priority: Priority,
    },
    Close {
        reason: Option<BoxStr>,
        priority: Priority,
    },
    PartialOpen {
        percentage: Percentage,
        reason: Option<BoxStr>,
        priority: Priority,
    },
    EmergencyClose {
        reason: BoxStr,
    },
    StatusCheck,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("percentage must be between 0 and 100, got {0}")]
    PercentageOutOfRange(u8),
    #[error("emergency close requires a non-empty reason")]
    MissingEmergencyReason,
}

impl ValveCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Open { .. } => CommandKind::Open,
            Self::Close { .. } => CommandKind::Close,
            Self::PartialOpen { .. } => CommandKind::PartialOpen,
            Self::EmergencyClose { .. } => CommandKind::EmergencyClose,
            Self::StatusCheck => CommandKind::StatusCheck,
        }
    }

    pub fn priority(&self) -> Priority {
        match self {
            Self::Open { priority, .. }
            | Self::Close { priority, .. }
            | Self::PartialOpen { priority, .. } => *priority,
            Self::EmergencyClose { .. } => Priority::Emergency,
            Self::StatusCheck => Priority::Normal,
        }
    }

    /// Checks the constraints the control view enforces before submitting.
    pub fn validate(&self) -> Result<(), CommandError> {
        match self {
            Self::PartialOpen { percentage, .. } if percentage.0 > 100 => {
                Err(CommandError::PercentageOutOfRange(percentage.0))
            }
            Self::EmergencyClose { reason } if reason.trim().is_empty() => {
                Err(CommandError::MissingEmergencyReason)
            }
            _ => Ok(()),
        }
    }

    /// The reason that will be recorded: the operator's text when present
    /// and non-blank, otherwise the per-kind default.
    pub fn effective_reason(&self) -> BoxStr {
        let given = match self {
            Self::Open { reason, .. }
            | Self::Close { reason, .. }
            | Self::PartialOpen { reason, .. } => reason.as_deref(),
            Self::EmergencyClose { reason } => Some(reason.as_ref()),
            Self::StatusCheck => None,
        };
        match given {
            Some(text) if !text.trim().is_empty() => text.into(),
            _ => self.kind().default_reason().into(),
        }
    }

    /// Builds the request body for this command. Status checks travel as a
    /// bodyless GET; their body still exists for record keeping.
    pub fn body(&self, request_id: RequestId) -> CommandRequest {
        let percentage = match self {
            Self::PartialOpen { percentage, .. } => Some(*percentage),
            _ => None,
        };
        CommandRequest {
            reason: self.effective_reason(),
            priority: self.priority(),
            percentage,
            request_id,
        }
    }
}

/// JSON body POSTed to the per-command valve endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub reason: BoxStr,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Percentage>,
    pub request_id: RequestId,
}

/// Backend acknowledgement that a command was accepted into the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandReceipt {
    pub command_id: CommandId,
    pub valve_id: ValveId,
    pub command_type: CommandKind,
    pub status: CommandStatus,
    pub priority: Priority,
    pub created_at: jiff::Timestamp,
}

/// A full command history row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRecord {
    pub id: CommandId,
    pub valve_id: ValveId,
    pub command_type: CommandKind,
    /// Structured argument of the command, e.g. `{"percentage": 50}`.
    pub command_value: Option<serde_json::Value>,
    pub initiated_by: UserId,
    pub initiated_by_name: Option<BoxStr>,
    pub reason: Option<BoxStr>,
    pub priority: Priority,
    pub status: CommandStatus,
    pub sent_at: Option<jiff::Timestamp>,
    pub acknowledged_at: Option<jiff::Timestamp>,
    pub completed_at: Option<jiff::Timestamp>,
    pub response_data: Option<serde_json::Value>,
    pub error_message: Option<BoxStr>,
    pub retry_count: u32,
    pub max_retries: u32,
    pub timeout_seconds: u32,
    pub expires_at: Option<jiff::Timestamp>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

/// Verbs allowed in a bulk fleet operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOperation {
    Open,
    Close,
    EmergencyClose,
    StatusCheck,
}

impl BulkOperation {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Open => CommandKind::Open,
            Self::Close => CommandKind::Close,
            Self::EmergencyClose => CommandKind::EmergencyClose,
            Self::StatusCheck => CommandKind::StatusCheck,
        }
    }
}

impl std::fmt::Display for BulkOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind().as_str())
    }
}

/// Body of `POST /valves/bulk-operation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRequest {
    pub valve_ids: Vec<ValveId>,
    pub operation: BulkOperation,
    pub reason: BoxStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// Per-valve failure inside a bulk operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkError {
    pub valve_id: ValveId,
    pub error: BoxStr,
}

/// Outcome of a bulk operation. Refused valves land in `errors`; the rest
/// of the batch still goes through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub operation: BulkOperation,
    pub successful: Vec<CommandReceipt>,
    pub errors: Vec<BulkError>,
    pub total_processed: u32,
    pub total_errors: u32,
}
