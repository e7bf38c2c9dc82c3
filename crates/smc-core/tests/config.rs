use smc_core::protocol::{
    Controller, ControllerConfig, ControllerState, ProtocolError, DEFAULT_BAUD_RATE,
};
use std::io::Write;

#[test]
fn test_load_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"port_name": "/dev/ttyACM1", "baud_rate": 9600, "read_timeout_ms": 500}}"#
    )
    .unwrap();

    let config = ControllerConfig::load(file.path()).unwrap();
    assert_eq!(config.port_name, "/dev/ttyACM1");
    assert_eq!(config.baud_rate, 9600);
    assert_eq!(config.device_number, 0x0D);
    assert_eq!(config.read_timeout_ms, 500);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = ControllerConfig::load(dir.path().join("absent.json"));
    assert!(matches!(result, Err(ProtocolError::IoError(_))));
}

#[test]
fn test_config_round_trip_through_json() {
    let config = ControllerConfig::new("COM7");
    let json = serde_json::to_string(&config).unwrap();
    let parsed = ControllerConfig::from_json(&json).unwrap();
    assert_eq!(parsed, config);
    assert_eq!(parsed.baud_rate, DEFAULT_BAUD_RATE);
}

#[test]
fn test_zero_read_timeout_is_rejected() {
    let result = ControllerConfig::from_json(r#"{"port_name": "COM7", "read_timeout_ms": 0}"#);
    match result {
        Err(ProtocolError::Config(reason)) => assert!(reason.contains("read_timeout_ms")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_connect_with_zero_timeout_fails_before_opening() {
    let config = ControllerConfig {
        port_name: "/dev/ttyACM0".to_string(),
        read_timeout_ms: 0,
        ..Default::default()
    };
    let mut controller = Controller::new(config);

    match controller.connect() {
        Err(ProtocolError::ConnectionFailed(reason)) => {
            assert!(reason.contains("read_timeout_ms"), "{}", reason)
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(controller.state(), ControllerState::Disconnected);
}
