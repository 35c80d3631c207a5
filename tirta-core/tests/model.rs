use jiff::Timestamp;
use serde_json::json;
use tirta_core::{
    CommandError, HealthStatus, MeterId, Percentage, Priority, PropertyId, RequestId,
    SystemHealth, Valve, ValveCommand, ValveId, ValveState, ValveStatus, ValveType,
};

fn ts(second: i64) -> Timestamp {
    Timestamp::from_second(second).unwrap()
}

fn dummy_valve() -> Valve {
    Valve {
        id: ValveId::new("v-1"),
        valve_id: "VLV-0001".into(),
        meter_id: MeterId::new("m-1"),
        property_id: PropertyId::new("p-1"),
        valve_type: ValveType::Main,
        valve_model: "WV-200".into(),
        valve_serial: "SN-0001".into(),
        firmware_version: "2.4.1".into(),
        hardware_version: "1.0".into(),
        location_description: None,
        latitude: None,
        longitude: None,
        installation_date: ts(0),
        status: ValveStatus::Active,
        current_state: ValveState::Open,
        last_command: None,
        last_command_at: None,
        last_response_at: Some(ts(100_000)),
        battery_level: Some(80.0),
        signal_strength: Some(-60),
        operating_pressure: Some(3.0),
        max_pressure: 10.0,
        temperature: Some(24.0),
        is_manual_override: false,
        manual_override_reason: None,
        manual_override_at: None,
        auto_close_enabled: true,
        emergency_close_enabled: true,
        created_at: ts(0),
        updated_at: ts(100_000),
    }
}

#[test]
fn healthy_valve_reports_normal() {
    let valve = dummy_valve();
    assert_eq!(valve.health(ts(100_060)), HealthStatus::Normal);
}

#[test]
fn device_status_outranks_telemetry() {
    let mut valve = dummy_valve();
    valve.status = ValveStatus::Offline;
    valve.battery_level = Some(5.0);
    assert_eq!(valve.health(ts(100_060)), HealthStatus::Offline);

    valve.status = ValveStatus::Error;
    assert_eq!(valve.health(ts(100_060)), HealthStatus::Error);

    valve.status = ValveStatus::Maintenance;
    assert_eq!(valve.health(ts(100_060)), HealthStatus::Maintenance);
}

#[test]
fn telemetry_rules_apply_in_order() {
    let mut valve = dummy_valve();
    valve.battery_level = Some(19.9);
    valve.signal_strength = Some(-90);
    assert_eq!(valve.health(ts(100_060)), HealthStatus::LowBattery);

    valve.battery_level = Some(50.0);
    assert_eq!(valve.health(ts(100_060)), HealthStatus::WeakSignal);

    valve.signal_strength = Some(-60);
    valve.operating_pressure = Some(9.5);
    assert_eq!(valve.health(ts(100_060)), HealthStatus::HighPressure);
}

#[test]
fn silence_past_thirty_minutes_is_communication_lost() {
    let mut valve = dummy_valve();
    valve.last_response_at = Some(ts(100_000));
    // 30 minutes exactly is still fine; one second past is not.
    assert_eq!(valve.health(ts(100_000 + 1800)), HealthStatus::Normal);
    assert_eq!(
        valve.health(ts(100_000 + 1801)),
        HealthStatus::CommunicationLost
    );
}

#[test]
fn never_heard_device_is_not_communication_lost() {
    let mut valve = dummy_valve();
    valve.last_response_at = None;
    assert_eq!(valve.health(ts(100_060)), HealthStatus::Normal);
}

#[test]
fn system_health_tiers() {
    assert_eq!(SystemHealth::from_counts(0, 0), SystemHealth::NoValves);
    assert_eq!(SystemHealth::from_counts(19, 20), SystemHealth::Excellent);
    assert_eq!(SystemHealth::from_counts(17, 20), SystemHealth::Good);
    assert_eq!(SystemHealth::from_counts(14, 20), SystemHealth::Fair);
    assert_eq!(SystemHealth::from_counts(10, 20), SystemHealth::Poor);
    assert_eq!(SystemHealth::from_counts(9, 20), SystemHealth::Critical);
}

#[test]
fn emergency_close_requires_reason() {
    let blank = ValveCommand::EmergencyClose { reason: "  ".into() };
    assert_eq!(blank.validate(), Err(CommandError::MissingEmergencyReason));

    let given = ValveCommand::EmergencyClose {
        reason: "burst main on Jl. Sudirman".into(),
    };
    assert_eq!(given.validate(), Ok(()));
}

#[test]
fn partial_open_percentage_is_bounded() {
    let over = ValveCommand::PartialOpen {
        percentage: Percentage(101),
        reason: None,
        priority: Priority::Normal,
    };
    assert_eq!(over.validate(), Err(CommandError::PercentageOutOfRange(101)));

    let full = ValveCommand::PartialOpen {
        percentage: Percentage(100),
        reason: None,
        priority: Priority::Normal,
    };
    assert_eq!(full.validate(), Ok(()));
    assert_eq!(Percentage::new(101), None);
    assert_eq!(Percentage::new(100), Some(Percentage(100)));
}

#[test]
fn partial_open_sends_exact_percentage() {
    for value in [0u8, 50, 100] {
        let command = ValveCommand::PartialOpen {
            percentage: Percentage(value),
            reason: None,
            priority: Priority::Normal,
        };
        let body = command.body(RequestId::generate());
        let wire = serde_json::to_value(&body).unwrap();
        assert_eq!(wire["percentage"], json!(value));
    }
}

#[test]
fn open_body_has_no_percentage_field() {
    let command = ValveCommand::Open {
        reason: None,
        priority: Priority::Normal,
    };
    let body = command.body(RequestId::generate());
    let wire = serde_json::to_value(&body).unwrap();
    assert!(wire.get("percentage").is_none());
    assert_eq!(wire["reason"], json!("open command"));
    assert_eq!(wire["priority"], json!("normal"));
}

#[test]
fn status_check_body_uses_service_defaults() {
    let body = ValveCommand::StatusCheck.body(RequestId::generate());
    assert_eq!(&*body.reason, "Status check request");
    assert_eq!(body.priority, Priority::Normal);
    assert_eq!(body.percentage, None);
}

#[test]
fn reasons_fall_back_to_defaults() {
    let open = ValveCommand::Open {
        reason: Some("".into()),
        priority: Priority::High,
    };
    assert_eq!(&*open.effective_reason(), "open command");

    let close = ValveCommand::Close {
        reason: Some("planned maintenance".into()),
        priority: Priority::Normal,
    };
    assert_eq!(&*close.effective_reason(), "planned maintenance");

    assert_eq!(
        &*ValveCommand::StatusCheck.effective_reason(),
        "Status check request"
    );
}

#[test]
fn emergency_close_is_always_emergency_priority() {
    let command = ValveCommand::EmergencyClose {
        reason: "pipe rupture".into(),
    };
    assert_eq!(command.priority(), Priority::Emergency);

    let wire = serde_json::to_value(command.body(RequestId::generate())).unwrap();
    assert_eq!(wire["priority"], json!("emergency"));
}

#[test]
fn enums_use_snake_case_wire_names() {
    use tirta_core::CommandKind;

    assert_eq!(
        serde_json::to_value(CommandKind::PartialOpen).unwrap(),
        json!("partial_open")
    );
    assert_eq!(
        serde_json::to_value(CommandKind::EmergencyClose).unwrap(),
        json!("emergency_close")
    );
    assert_eq!(
        serde_json::to_value(HealthStatus::CommunicationLost).unwrap(),
        json!("communication_lost")
    );
    assert_eq!(
        serde_json::to_value(SystemHealth::NoValves).unwrap(),
        json!("no_valves")
    );
    assert_eq!(
        serde_json::from_value::<ValveState>(json!("partial")).unwrap(),
        ValveState::Partial
    );
}
