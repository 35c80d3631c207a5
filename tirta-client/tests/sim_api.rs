use jiff::Timestamp;
use tirta_client::{ClientError, SimValveApi, ValveApi, ValveQuery};
use tirta_core::{
    Alert, AlertId, AlertType, BulkOperation, BulkRequest, CommandId, CommandKind, CommandRecord,
    CommandStatus, FleetValve, HealthStatus, MeterId, Percentage, Priority, PropertyId, Severity,
    SystemHealth, UserId, Valve, ValveCommand, ValveId, ValveState, ValveStatus, ValveType,
};

fn dummy_valve(code: &str, status: ValveStatus, state: ValveState) -> FleetValve {
    let now = Timestamp::now();
    FleetValve {
        valve: Valve {
            id: ValveId::new(code),
            valve_id: code.into(),
            meter_id: MeterId::new(format!("MTR-{code}")),
            property_id: PropertyId::new("prop-1"),
            valve_type: ValveType::Main,
            valve_model: "AquaGate 200".into(),
            valve_serial: "AG2-000001".into(),
            firmware_version: "2.4.1".into(),
            hardware_version: "1.2".into(),
            location_description: None,
            latitude: None,
            longitude: None,
            installation_date: now,
            status,
            current_state: state,
            last_command: None,
            last_command_at: None,
            last_response_at: Some(now),
            battery_level: Some(80.0),
            signal_strength: Some(-60),
            operating_pressure: Some(5.0),
            max_pressure: 10.0,
            temperature: Some(24.0),
            is_manual_override: false,
            manual_override_reason: None,
            manual_override_at: None,
            auto_close_enabled: true,
            emergency_close_enabled: true,
            created_at: now,
            updated_at: now,
        },
        property_name: "Taman Anggrek Residence".into(),
        client_name: "Tirta Jaya Water Authority".into(),
        last_credit: 125_000.0,
        auto_valve_control: true,
        low_credit_threshold: 10_000.0,
        health_status: HealthStatus::Normal,
        pending_commands: 0,
        active_alerts: 0,
    }
}

fn dummy_command(valve: &ValveId, status: CommandStatus, age_seconds: i64) -> CommandRecord {
    let now = Timestamp::now();
    let created_at = Timestamp::from_second(now.as_second() - age_seconds).unwrap();
    CommandRecord {
        id: CommandId::new(format!("cmd-{status}-{age_seconds}")),
        valve_id: valve.clone(),
        command_type: CommandKind::Close,
        command_value: None,
        initiated_by: UserId::new("operator-1"),
        initiated_by_name: None,
        reason: Some("close command".into()),
        priority: Priority::Normal,
        status,
        sent_at: None,
        acknowledged_at: None,
        completed_at: None,
        response_data: None,
        error_message: None,
        retry_count: 0,
        max_retries: 3,
        timeout_seconds: 300,
        expires_at: None,
        created_at,
        updated_at: created_at,
    }
}

fn dummy_alert(valve: &ValveId, id: &str) -> Alert {
    let now = Timestamp::now();
    Alert {
        id: AlertId::new(id),
        valve_id: valve.clone(),
        alert_type: AlertType::LowBattery,
        severity: Severity::Warning,
        title: "Low Battery Warning".into(),
        message: "Valve battery level is 18%".into(),
        alert_data: None,
        is_acknowledged: false,
        acknowledged_by: None,
        acknowledged_at: None,
        is_resolved: false,
        resolved_by: None,
        resolved_at: None,
        resolution_notes: None,
        created_at: now,
    }
}

fn open() -> ValveCommand {
    ValveCommand::Open {
        reason: None,
        priority: Priority::Normal,
    }
}

#[tokio::test]
async fn unknown_valve_is_refused() -> Result<(), ClientError> {
    let sim = SimValveApi::with_fleet(vec![dummy_valve(
        "VLV-0001",
        ValveStatus::Active,
        ValveState::Closed,
    )]);
    let missing = ValveId::new("VLV-9999");

    let err = sim.send_command(&missing, &open()).await.unwrap_err();
    assert_eq!(err.api_message(), Some("Valve not found"));

    let err = sim.commands(&missing, 10).await.unwrap_err();
    assert_eq!(err.api_message(), Some("Valve not found"));
    Ok(())
}

#[tokio::test]
async fn out_of_service_valves_refuse_commands() -> Result<(), ClientError> {
    let sim = SimValveApi::with_fleet(vec![
        dummy_valve("VLV-0001", ValveStatus::Inactive, ValveState::Closed),
        dummy_valve("VLV-0002", ValveStatus::Maintenance, ValveState::Open),
    ]);

    let err = sim
        .send_command(&ValveId::new("VLV-0001"), &open())
        .await
        .unwrap_err();
    assert_eq!(
        err.api_message(),
        Some("Cannot send commands to inactive valve")
    );

    let err = sim
        .send_command(&ValveId::new("VLV-0002"), &open())
        .await
        .unwrap_err();
    assert_eq!(err.api_message(), Some("Valve is under maintenance"));
    Ok(())
}

#[tokio::test]
async fn override_allows_only_emergency_close() -> Result<(), ClientError> {
    let mut row = dummy_valve("VLV-0001", ValveStatus::Active, ValveState::Open);
    row.valve.is_manual_override = true;
    let sim = SimValveApi::with_fleet(vec![row]);
    let valve = ValveId::new("VLV-0001");
    let refusal = "Valve is in manual override mode. Only emergency commands are allowed.";

    let err = sim.send_command(&valve, &open()).await.unwrap_err();
    assert_eq!(err.api_message(), Some(refusal));

    // The backend is stricter than the operator UI here: even a status
    // check is refused while a human holds the valve.
    let err = sim
        .send_command(&valve, &ValveCommand::StatusCheck)
        .await
        .unwrap_err();
    assert_eq!(err.api_message(), Some(refusal));

    let receipt = sim
        .send_command(
            &valve,
            &ValveCommand::EmergencyClose {
                reason: "Burst main on the street side".into(),
            },
        )
        .await?;
    assert_eq!(receipt.command_type, CommandKind::EmergencyClose);
    assert_eq!(receipt.priority, Priority::Emergency);

    let snapshot = sim.snapshot(&valve).await?;
    assert_eq!(snapshot.valve.current_state, ValveState::Closed);
    Ok(())
}

#[tokio::test]
async fn emergency_command_cancels_pending_queue() -> Result<(), ClientError> {
    let sim = SimValveApi::with_fleet(vec![dummy_valve(
        "VLV-0001",
        ValveStatus::Active,
        ValveState::Open,
    )]);
    let valve = ValveId::new("VLV-0001");
    sim.push_command(dummy_command(&valve, CommandStatus::Pending, 60))
        .await;

    sim.send_command(
        &valve,
        &ValveCommand::EmergencyClose {
            reason: "Contamination report".into(),
        },
    )
    .await?;

    let log = sim.command_log().await;
    let cancelled = log
        .iter()
        .find(|c| c.status == CommandStatus::Cancelled)
        .expect("pending command should have been cancelled");
    assert_eq!(
        cancelled.error_message.as_deref(),
        Some("Cancelled due to emergency command")
    );
    Ok(())
}

#[tokio::test]
async fn request_validation_precedes_device_gates() -> Result<(), ClientError> {
    let sim = SimValveApi::with_fleet(vec![dummy_valve(
        "VLV-0001",
        ValveStatus::Inactive,
        ValveState::Closed,
    )]);
    let valve = ValveId::new("VLV-0001");

    let err = sim
        .send_command(
            &valve,
            &ValveCommand::PartialOpen {
                percentage: Percentage(150),
                reason: None,
                priority: Priority::Normal,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.api_message(), Some("Percentage must be between 0 and 100"));

    let err = sim
        .send_command(&valve, &ValveCommand::EmergencyClose { reason: "  ".into() })
        .await
        .unwrap_err();
    assert_eq!(
        err.api_message(),
        Some("Reason is required for emergency close")
    );
    Ok(())
}

#[tokio::test]
async fn accepted_command_acts_and_reports_pending() -> Result<(), ClientError> {
    let sim = SimValveApi::with_fleet(vec![dummy_valve(
        "VLV-0001",
        ValveStatus::Active,
        ValveState::Closed,
    )]);
    let valve = ValveId::new("VLV-0001");

    let receipt = sim.send_command(&valve, &open()).await?;
    assert_eq!(receipt.status, CommandStatus::Pending);
    assert_eq!(receipt.command_type, CommandKind::Open);

    let snapshot = sim.snapshot(&valve).await?;
    assert_eq!(snapshot.valve.current_state, ValveState::Open);
    assert_eq!(snapshot.valve.last_command, Some(CommandKind::Open));
    assert_eq!(snapshot.recent_commands.len(), 1);
    assert_eq!(snapshot.recent_commands[0].status, CommandStatus::Completed);
    Ok(())
}

#[tokio::test]
async fn status_check_never_becomes_last_command() -> Result<(), ClientError> {
    let sim = SimValveApi::with_fleet(vec![dummy_valve(
        "VLV-0001",
        ValveStatus::Active,
        ValveState::Open,
    )]);
    let valve = ValveId::new("VLV-0001");

    sim.send_command(&valve, &ValveCommand::StatusCheck).await?;

    let snapshot = sim.snapshot(&valve).await?;
    assert_eq!(snapshot.valve.last_command, None);
    assert_eq!(snapshot.valve.current_state, ValveState::Open);
    let record = &snapshot.recent_commands[0];
    assert_eq!(record.command_type, CommandKind::StatusCheck);
    assert_eq!(record.reason.as_deref(), Some("Status check request"));
    Ok(())
}

#[tokio::test]
async fn bulk_continues_past_refused_valves() -> Result<(), ClientError> {
    let sim = SimValveApi::with_fleet(vec![
        dummy_valve("VLV-0001", ValveStatus::Active, ValveState::Open),
        dummy_valve("VLV-0002", ValveStatus::Inactive, ValveState::Closed),
        dummy_valve("VLV-0003", ValveStatus::Maintenance, ValveState::Open),
    ]);

    let outcome = sim
        .bulk(&BulkRequest {
            valve_ids: vec![
                ValveId::new("VLV-0001"),
                ValveId::new("VLV-0002"),
                ValveId::new("VLV-0003"),
            ],
            operation: BulkOperation::Close,
            reason: "Night shutoff".into(),
            priority: None,
        })
        .await?;

    assert_eq!(outcome.total_processed, 1);
    assert_eq!(outcome.total_errors, 2);
    assert_eq!(outcome.successful[0].valve_id, ValveId::new("VLV-0001"));
    assert_eq!(
        &*outcome.errors[0].error,
        "Cannot send commands to inactive valve"
    );
    assert_eq!(&*outcome.errors[1].error, "Valve is under maintenance");
    Ok(())
}

#[tokio::test]
async fn bulk_requires_reason() {
    let sim = SimValveApi::with_fleet(vec![dummy_valve(
        "VLV-0001",
        ValveStatus::Active,
        ValveState::Open,
    )]);

    let err = sim
        .bulk(&BulkRequest {
            valve_ids: vec![ValveId::new("VLV-0001")],
            operation: BulkOperation::Open,
            reason: "   ".into(),
            priority: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.api_message(), Some("Reason is required"));
}

#[tokio::test]
async fn overview_derives_counts_and_system_health() -> Result<(), ClientError> {
    let sim = SimValveApi::with_fleet(vec![
        dummy_valve("VLV-0002", ValveStatus::Active, ValveState::Open),
        dummy_valve("VLV-0001", ValveStatus::Active, ValveState::Closed),
        dummy_valve("VLV-0003", ValveStatus::Active, ValveState::Open),
        dummy_valve("VLV-0004", ValveStatus::Offline, ValveState::Unknown),
    ]);
    let first = ValveId::new("VLV-0001");
    sim.push_command(dummy_command(&first, CommandStatus::Pending, 60))
        .await;
    sim.push_alert(dummy_alert(&first, "alert-1")).await;

    let overview = sim.overview().await?;

    let codes: Vec<&str> = overview
        .valves
        .iter()
        .map(|row| &*row.valve.valve_id)
        .collect();
    assert_eq!(codes, ["VLV-0001", "VLV-0002", "VLV-0003", "VLV-0004"]);

    let row = &overview.valves[0];
    assert_eq!(row.pending_commands, 1);
    assert_eq!(row.active_alerts, 1);
    assert_eq!(overview.valves[3].health_status, HealthStatus::Offline);

    let stats = &overview.statistics.valve_statistics;
    assert_eq!(stats.total_valves, 4);
    assert_eq!(stats.active_valves, 3);
    assert_eq!(stats.offline_valves, 1);
    assert_eq!(stats.open_valves, 2);
    assert_eq!(stats.closed_valves, 1);
    // 3 of 4 active is 75%.
    assert_eq!(overview.statistics.system_health, SystemHealth::Fair);
    Ok(())
}

#[tokio::test]
async fn command_statistics_cover_trailing_day_only() -> Result<(), ClientError> {
    let sim = SimValveApi::with_fleet(vec![dummy_valve(
        "VLV-0001",
        ValveStatus::Active,
        ValveState::Open,
    )]);
    let valve = ValveId::new("VLV-0001");
    sim.push_command(dummy_command(&valve, CommandStatus::Failed, 3600))
        .await;
    sim.push_command(dummy_command(&valve, CommandStatus::Failed, 25 * 3600))
        .await;

    let stats = sim.statistics().await?;
    assert_eq!(stats.command_statistics.total_commands, 1);
    assert_eq!(stats.command_statistics.failed_commands, 1);

    let recent = sim.failed_commands(24).await?;
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].status, CommandStatus::Failed);
    Ok(())
}

#[tokio::test]
async fn alerts_survive_acknowledge_until_resolved() -> Result<(), ClientError> {
    let sim = SimValveApi::with_fleet(vec![dummy_valve(
        "VLV-0001",
        ValveStatus::Active,
        ValveState::Open,
    )]);
    let valve = ValveId::new("VLV-0001");
    sim.push_alert(dummy_alert(&valve, "alert-1")).await;
    let alert = AlertId::new("alert-1");

    sim.acknowledge_alert(&alert).await?;
    let alerts = sim.alerts(&valve).await?;
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].is_acknowledged);
    assert!(!alerts[0].is_resolved);

    sim.resolve_alert(&alert, Some("Battery swapped")).await?;
    assert!(sim.alerts(&valve).await?.is_empty());

    let err = sim
        .acknowledge_alert(&AlertId::new("alert-404"))
        .await
        .unwrap_err();
    assert_eq!(err.api_message(), Some("Alert not found"));
    Ok(())
}

#[tokio::test]
async fn override_lifecycle_raises_and_resolves_alert() -> Result<(), ClientError> {
    let sim = SimValveApi::with_fleet(vec![dummy_valve(
        "VLV-0001",
        ValveStatus::Active,
        ValveState::Open,
    )]);
    let valve = ValveId::new("VLV-0001");

    let err = sim.enable_override(&valve, "   ").await.unwrap_err();
    assert_eq!(err.api_message(), Some("Reason is required"));

    sim.enable_override(&valve, "Crew on site").await?;
    let alerts = sim.alerts(&valve).await?;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::ManualOverride);
    assert_eq!(alerts[0].severity, Severity::Info);

    sim.disable_override(&valve).await?;
    assert!(sim.alerts(&valve).await?.is_empty());
    let snapshot = sim.snapshot(&valve).await?;
    assert!(!snapshot.valve.is_manual_override);
    assert_eq!(snapshot.valve.manual_override_reason, None);
    Ok(())
}

#[tokio::test]
async fn valve_listing_filters_and_paginates() -> Result<(), ClientError> {
    let sim = SimValveApi::with_fleet(vec![
        dummy_valve("VLV-0001", ValveStatus::Active, ValveState::Open),
        dummy_valve("VLV-0002", ValveStatus::Active, ValveState::Open),
        dummy_valve("VLV-0003", ValveStatus::Active, ValveState::Closed),
        dummy_valve("VLV-0004", ValveStatus::Offline, ValveState::Unknown),
        dummy_valve("VLV-0005", ValveStatus::Active, ValveState::Open),
    ]);

    let page = sim
        .valves(&ValveQuery::new().with_limit(2).with_offset(2))
        .await?;
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.pagination.total, 5);
    assert!(page.pagination.has_more);

    let open_only = sim
        .valves(&ValveQuery::new().with_state(ValveState::Open))
        .await?;
    assert_eq!(open_only.items.len(), 3);
    assert!(!open_only.pagination.has_more);

    let by_meter = sim
        .valves_by_meter(&MeterId::new("MTR-VLV-0003"))
        .await?;
    assert_eq!(by_meter.len(), 1);
    assert_eq!(&*by_meter[0].valve_id, "VLV-0003");
    Ok(())
}

#[tokio::test]
async fn unreachable_backend_fails_but_counts_attempts() {
    let sim = SimValveApi::with_fleet(vec![dummy_valve(
        "VLV-0001",
        ValveStatus::Active,
        ValveState::Open,
    )]);
    sim.set_unreachable(true).await;

    assert!(sim.overview().await.is_err());
    assert!(sim.snapshot(&ValveId::new("VLV-0001")).await.is_err());
    assert_eq!(sim.overview_fetches().await, 1);
    assert_eq!(sim.snapshot_fetches().await, 1);

    sim.set_unreachable(false).await;
    assert!(sim.overview().await.is_ok());
    assert_eq!(sim.overview_fetches().await, 2);
}

#[tokio::test]
async fn seeded_fleet_is_dashboard_ready() -> Result<(), ClientError> {
    let sim = SimValveApi::seeded(12);
    let overview = sim.overview().await?;
    assert_eq!(overview.valves.len(), 12);
    assert_eq!(overview.statistics.valve_statistics.total_valves, 12);

    let under_override: Vec<_> = overview
        .valves
        .iter()
        .filter(|row| row.valve.is_manual_override)
        .collect();
    assert_eq!(under_override.len(), 1);
    // The override unit always carries its override alert.
    assert!(under_override[0].active_alerts >= 1);

    // Seeded rows answer to the device code the overview prints, not
    // only to their generated row id.
    let by_code = sim.snapshot(&ValveId::new("VLV-0001")).await?;
    assert_eq!(&*by_code.valve.valve_id, "VLV-0001");
    let by_id = sim.snapshot(&by_code.valve.id).await?;
    assert_eq!(by_id.valve.id, by_code.valve.id);
    Ok(())
}
