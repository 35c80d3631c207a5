use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tirta_client::{ClientError, ValveApi};
use tirta_core::{
    CommandKind, CommandReceipt, ValveCommand, ValveId, ValveSnapshot, ValveState, ValveStatus,
};
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

/// Things the control surface learns about asynchronously.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The backend accepted a command; a re-poll is scheduled.
    Accepted(CommandReceipt),
    /// A fetch applied a fresh snapshot.
    Refreshed,
    /// Operator-facing failure. Carries the backend's business message
    /// when there was one, a generic fallback otherwise.
    Error(Box<str>),
}

/// Why the session refuses to submit a command without asking the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandRefusal {
    StatusNotLoaded,
    CommandInFlight,
    ValveInactive,
    UnderMaintenance,
    ManualOverride,
    AlreadyOpen,
    AlreadyClosed,
}

impl CommandRefusal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StatusNotLoaded => "valve status not loaded yet",
            Self::CommandInFlight => "another command is still in flight",
            Self::ValveInactive => "valve is inactive",
            Self::UnderMaintenance => "valve is under maintenance",
            Self::ManualOverride => {
                "valve is under manual override and only accepts emergency close"
            }
            Self::AlreadyOpen => "valve is already open",
            Self::AlreadyClosed => "valve is already closed",
        }
    }
}

impl std::fmt::Display for CommandRefusal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Refused(CommandRefusal),
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// First rule that blocks `command` given what the session knows, `None`
/// when submission may proceed.
///
/// Status checks pass the override rule on purpose: the operator may still
/// ask an overridden valve how it is doing, and the backend has the final
/// say. Emergency close passes it too, that is what the override mode is
/// for.
pub fn command_gate(
    snapshot: Option<&ValveSnapshot>,
    in_flight: Option<CommandKind>,
    command: &ValveCommand,
) -> Option<CommandRefusal> {
    let Some(snapshot) = snapshot else {
        return Some(CommandRefusal::StatusNotLoaded);
    };
    if in_flight.is_some() {
        return Some(CommandRefusal::CommandInFlight);
    }
    let valve = &snapshot.valve;
    match valve.status {
        ValveStatus::Inactive => return Some(CommandRefusal::ValveInactive),
        ValveStatus::Maintenance => return Some(CommandRefusal::UnderMaintenance),
        _ => {}
    }
    if valve.is_manual_override
        && matches!(
            command,
            ValveCommand::Open { .. } | ValveCommand::Close { .. } | ValveCommand::PartialOpen { .. }
        )
    {
        return Some(CommandRefusal::ManualOverride);
    }
    match (command, valve.current_state) {
        (ValveCommand::Open { .. }, ValveState::Open) => Some(CommandRefusal::AlreadyOpen),
        (ValveCommand::Close { .. }, ValveState::Closed) => Some(CommandRefusal::AlreadyClosed),
        _ => None,
    }
}

/// Control-surface state for one valve.
///
/// Caches the last snapshot and refuses commands the backend would
/// refuse anyway. At most one command is in flight at a time; an
/// accepted one triggers a re-poll so the operator sees its effect.
pub struct ValveSession<V> {
    api: Arc<V>,
    valve: ValveId,
    repoll_delay: Duration,
    inner: Arc<Mutex<Inner>>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

struct Inner {
    snapshot: Option<ValveSnapshot>,
    in_flight: Option<CommandKind>,
    /// Fetch tickets handed out; a response applies only while no newer
    /// ticket has been applied.
    issued: u64,
    applied: u64,
    last_error: Option<Box<str>>,
}

impl<V: ValveApi> ValveSession<V> {
    pub fn new(
        api: Arc<V>,
        valve: ValveId,
        repoll_delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let session = Self {
            api,
            valve,
            repoll_delay,
            inner: Arc::new(Mutex::new(Inner {
                snapshot: None,
                in_flight: None,
                issued: 0,
                applied: 0,
                last_error: None,
            })),
            events,
        };
        (session, rx)
    }

    pub fn valve(&self) -> &ValveId {
        &self.valve
    }

    /// Last applied snapshot, if any fetch succeeded yet.
    pub async fn snapshot(&self) -> Option<ValveSnapshot> {
        self.inner.lock().await.snapshot.clone()
    }

    /// True until the first fetch attempt finishes either way.
    pub async fn is_loading(&self) -> bool {
        let inner = self.inner.lock().await;
        inner.snapshot.is_none() && inner.last_error.is_none()
    }

    pub async fn last_error(&self) -> Option<Box<str>> {
        self.inner.lock().await.last_error.clone()
    }

    pub async fn in_flight(&self) -> Option<CommandKind> {
        self.inner.lock().await.in_flight
    }

    /// What currently blocks `command`, if anything.
    pub async fn refusal_for(&self, command: &ValveCommand) -> Option<CommandRefusal> {
        let inner = self.inner.lock().await;
        command_gate(inner.snapshot.as_ref(), inner.in_flight, command)
    }

    /// Fetches the valve snapshot now. A failure keeps the previous
    /// snapshot; a response overtaken by a newer one is discarded instead
    /// of rolling the view back.
    pub async fn refresh(&self) {
        let ticket = {
            let mut inner = self.inner.lock().await;
            inner.issued += 1;
            inner.issued
        };
        let result = self.api.snapshot(&self.valve).await;
        let event = {
            let mut inner = self.inner.lock().await;
            if ticket <= inner.applied {
                debug!(ticket, "discarding out-of-order snapshot response");
                return;
            }
            inner.applied = ticket;
            match result {
                Ok(snapshot) => {
                    inner.snapshot = Some(snapshot);
                    inner.last_error = None;
                    SessionEvent::Refreshed
                }
                Err(err) => {
                    let message = operator_message(&err, "Failed to fetch valve status");
                    inner.last_error = Some(message.clone());
                    SessionEvent::Error(message)
                }
            }
        };
        self.emit(event);
    }

    /// Validates and gates `command`, then dispatches it. On acceptance
    /// the receipt comes back and a single re-poll is scheduled after the
    /// configured delay.
    pub async fn dispatch(&self, command: ValveCommand) -> Result<CommandReceipt, SessionError> {
        command.validate().map_err(ClientError::from)?;
        {
            let mut inner = self.inner.lock().await;
            if let Some(refusal) = command_gate(inner.snapshot.as_ref(), inner.in_flight, &command)
            {
                return Err(SessionError::Refused(refusal));
            }
            inner.in_flight = Some(command.kind());
        }

        let result = self.api.send_command(&self.valve, &command).await;
        self.inner.lock().await.in_flight = None;

        match result {
            Ok(receipt) => {
                debug!(valve = %self.valve, kind = %receipt.command_type, "command accepted");
                self.emit(SessionEvent::Accepted(receipt.clone()));
                self.schedule_repoll();
                Ok(receipt)
            }
            Err(err) => {
                self.emit(SessionEvent::Error(operator_message(
                    &err,
                    "Failed to send command",
                )));
                Err(err.into())
            }
        }
    }

    fn schedule_repoll(&self) {
        let session = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(session.repoll_delay).await;
            session.refresh().await;
        });
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("session event receiver dropped");
        }
    }
}

impl<V> Clone for ValveSession<V> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            valve: self.valve.clone(),
            repoll_delay: self.repoll_delay,
            inner: Arc::clone(&self.inner),
            events: self.events.clone(),
        }
    }
}

fn operator_message(err: &ClientError, fallback: &str) -> Box<str> {
    err.api_message().unwrap_or(fallback).into()
}
