// DFP Harness - Decimal Floating-Point Smoke Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use dfp_config::{HarnessConfig, RunLimits, SerialConfig};
use dfp_decimal::RoundingMode;
use std::time::Duration;

#[test]
fn test_serialized_config_loads_back() {
    let config = HarnessConfig {
        serial: SerialConfig {
            port: Some("/dev/ttyACM0".to_string()),
            baud_rate: 57_600,
            write_timeout_ms: 20,
        },
        rounding: RoundingMode::Upward,
        limits: RunLimits {
            max_iterations: Some(10),
            max_output: Some("1KiB".to_string()),
        },
        expect: Some("202.356".to_string()),
        banner: false,
        ..HarnessConfig::default()
    };
    let yaml = serde_yaml::to_string(&config).unwrap();
    let loaded = HarnessConfig::from_yaml(&yaml).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.max_output_bytes().unwrap(), Some(1024));
}

#[test]
fn test_write_timeout() {
    let serial = SerialConfig::default();
    assert_eq!(serial.write_timeout(), Duration::from_millis(100));
}

#[test]
fn test_partial_section_keeps_other_defaults() {
    let config = HarnessConfig::from_yaml("operands:\n  rhs: \"1\"\n").unwrap();
    assert_eq!(config.operands.lhs, "123.456");
    assert_eq!(config.operands.rhs, "1");
}

#[test]
fn test_malformed_expect_rejected() {
    let err = HarnessConfig::from_yaml("expect: \"about 202\"\n").unwrap_err();
    assert!(err.to_string().contains("expect"));
}

#[test]
fn test_rounding_modes_by_name() {
    for (name, mode) in [
        ("nearest_even", RoundingMode::NearestEven),
        ("nearest_away", RoundingMode::NearestAway),
        ("toward_zero", RoundingMode::TowardZero),
        ("upward", RoundingMode::Upward),
        ("downward", RoundingMode::Downward),
    ] {
        let config = HarnessConfig::from_yaml(&format!("rounding: {}\n", name)).unwrap();
        assert_eq!(config.rounding, mode);
    }
}

#[test]
fn test_validate_catches_programmatic_edits() {
    let mut config = HarnessConfig::default();
    assert!(config.validate().is_ok());
    config.operands.lhs = String::new();
    assert!(config.validate().is_err());
}
