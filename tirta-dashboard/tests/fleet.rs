use jiff::Timestamp;
use tirta_core::{
    FleetValve, HealthStatus, MeterId, PropertyId, Valve, ValveId, ValveState, ValveStatus,
    ValveType,
};
use tirta_dashboard::FleetFilter;

fn dummy_row(code: &str, property: &str, status: ValveStatus, state: ValveState) -> FleetValve {
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
        property_name: property.into(),
        client_name: "Tirta Jaya Water Authority".into(),
        last_credit: 125_000.0,
        auto_valve_control: true,
        low_credit_threshold: 10_000.0,
        health_status: HealthStatus::Normal,
        pending_commands: 0,
        active_alerts: 0,
    }
}

fn sample_rows() -> Vec<FleetValve> {
    vec![
        dummy_row(
            "VLV-0001",
            "Taman Anggrek Residence",
            ValveStatus::Active,
            ValveState::Open,
        ),
        dummy_row(
            "VLV-0002",
            "Green Lake Apartments",
            ValveStatus::Active,
            ValveState::Closed,
        ),
        dummy_row(
            "VLV-0003",
            "Menteng Park Tower",
            ValveStatus::Maintenance,
            ValveState::Closed,
        ),
    ]
}

#[test]
fn search_covers_code_meter_and_property() {
    let rows = sample_rows();

    let by_code = FleetFilter::new().with_search("vlv-0002");
    let hits = by_code.apply(&rows);
    assert_eq!(hits.len(), 1);
    assert_eq!(&*hits[0].valve.valve_id, "VLV-0002");

    let by_meter = FleetFilter::new().with_search("MTR-VLV-0003");
    assert_eq!(by_meter.apply(&rows).len(), 1);

    let by_property = FleetFilter::new().with_search("green lake");
    let hits = by_property.apply(&rows);
    assert_eq!(hits.len(), 1);
    assert_eq!(&*hits[0].property_name, "Green Lake Apartments");

    let no_hit = FleetFilter::new().with_search("pondok indah");
    assert!(no_hit.apply(&rows).is_empty());
}

#[test]
fn filters_combine_as_and() {
    let rows = sample_rows();

    let closed = FleetFilter::new().with_state(ValveState::Closed);
    assert_eq!(closed.apply(&rows).len(), 2);

    let closed_and_active = FleetFilter::new()
        .with_state(ValveState::Closed)
        .with_status(ValveStatus::Active);
    let hits = closed_and_active.apply(&rows);
    assert_eq!(hits.len(), 1);
    assert_eq!(&*hits[0].valve.valve_id, "VLV-0002");

    let contradictory = FleetFilter::new()
        .with_status(ValveStatus::Maintenance)
        .with_search("taman anggrek");
    assert!(contradictory.apply(&rows).is_empty());
}

#[test]
fn blank_search_matches_everything() {
    let rows = sample_rows();
    let blank = FleetFilter::new().with_search("   ");
    assert_eq!(blank.apply(&rows).len(), rows.len());
    assert_eq!(FleetFilter::new().apply(&rows).len(), rows.len());
}
