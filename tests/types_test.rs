use serde_json::json;
use sonnenbatterie_exporter::error::ExporterError;
use sonnenbatterie_exporter::sonnen::types::*;

#[test]
fn test_deserialize_status() {
    let json = json!({
        "Apparent_output": 225,
        "BackupBuffer": "0",
        "BatteryCharging": false,
        "BatteryDischarging": true,
        "Consumption_W": 403,
        "Fac": 49.997,
        "GridFeedIn_W": -13,
        "Pac_total_W": 390,
        "Production_W": 0,
        "RSOC": 52,
        "RemainingCapacity_Wh": 5303,
        "SystemStatus": "OnGrid",
        "Timestamp": "2024-01-05 20:41:43",
        "USOC": 47,
        "Uac": 236
    });

    let status: Status = serde_json::from_value(json).expect("Failed to parse Status");
    assert_eq!(status.uac, 236.0);
    assert_eq!(status.fac, 49.997);
    assert_eq!(status.rsoc, 52.0);
    assert_eq!(status.usoc, 47.0);
    assert_eq!(status.consumption_w, 403.0);
    assert_eq!(status.remaining_capacity_wh, 5303.0);
    assert_eq!(status.grid_feed_in_w, Some(-13.0));
    assert_eq!(status.battery_discharging, Some(true));
}

#[test]
fn test_status_missing_required_field_fails() {
    let json = json!({ "Uac": 230, "Fac": 50 });
    assert!(serde_json::from_value::<Status>(json).is_err());
}

fn meter(direction: &str, channel: u32) -> serde_json::Value {
    json!({
        "a_l1": 0.5, "a_l2": 0.4, "a_l3": 0.3,
        "channel": channel,
        "deviceid": 4,
        "direction": direction,
        "error": 0,
        "kwh_exported": 0,
        "kwh_imported": 1234.5,
        "v_l1_l2": 402.1, "v_l1_n": 232.4,
        "v_l2_l3": 403.9, "v_l2_n": 233.0,
        "v_l3_l1": 401.0, "v_l3_n": 231.8,
        "va_total": 700.0, "var_total": -200.0,
        "w_l1": 100.0, "w_l2": 200.0, "w_l3": 300.0,
        "w_total": 600.0
    })
}

#[test]
fn test_power_meter_array_payload() {
    let json = json!([meter("production", 1), meter("consumption", 2)]);

    let payload: PowerMeterPayload = serde_json::from_value(json).expect("Failed to parse");
    let (production, consumption) = payload.split().expect("Failed to split");

    assert_eq!(production.direction, "production");
    assert_eq!(consumption.direction, "consumption");
    assert_eq!(consumption.v_l1_n, 232.4);
    assert_eq!(consumption.kwh_imported, 1234.5);
    assert_eq!(production.channel, Some(1));
}

#[test]
fn test_power_meter_keyed_payload() {
    let json = json!({ "4": meter("consumption", 2), "5": meter("production", 1) });

    let payload: PowerMeterPayload = serde_json::from_value(json).expect("Failed to parse");
    let (production, consumption) = payload.split().expect("Failed to split");

    assert_eq!(production.channel, Some(1));
    assert_eq!(consumption.channel, Some(2));
}

#[test]
fn test_power_meter_missing_direction_is_an_error() {
    let json = json!([meter("production", 1)]);

    let payload: PowerMeterPayload = serde_json::from_value(json).unwrap();
    let err = payload.split().unwrap_err();

    assert!(matches!(err, ExporterError::InvalidPayload { .. }));
    assert!(err.to_string().contains("consumption"));
}

#[test]
fn test_power_meter_unknown_direction_is_ignored() {
    let json = json!([
        meter("battery", 3),
        meter("production", 1),
        meter("consumption", 2)
    ]);

    let payload: PowerMeterPayload = serde_json::from_value(json).unwrap();
    assert!(payload.split().is_ok());
}

#[test]
fn test_deserialize_latest_data() {
    let json = json!({
        "Consumption_W": 403,
        "FullChargeCapacity": 10150,
        "Production_W": 0,
        "Timestamp": "2024-01-05 20:41:43",
        "USOC": 47,
        "ic_status": {
            "nrbatterymodules": 4,
            "secondssincefullcharge": 86400,
            "statebms": "ready",
            "stateinverter": "running"
        }
    });

    let latest: LatestData = serde_json::from_value(json).expect("Failed to parse LatestData");
    assert_eq!(latest.full_charge_capacity, 10150.0);
    assert_eq!(latest.ic_status.secondssincefullcharge, 86400);
    assert_eq!(latest.ic_status.nr_battery_modules, Some(4));
}
