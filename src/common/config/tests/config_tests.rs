//! Unit tests for common-config crate

use common_config::{OptimizerConfig, SiftConfig};
use common_error::SiftError;

#[test]
fn test_sift_config_default() {
    let config = SiftConfig::default();

    assert_eq!(config.optimizer.max_iterations, 100);
    assert_eq!(config.optimizer.max_node_rewrites, 1000);
    assert!(!config.optimizer.enable_trace);
    assert!(config.optimizer.validate_plans);
    assert!(config.validate().is_ok());
}

#[test]
fn test_optimizer_config_builders() {
    let config = OptimizerConfig::default()
        .with_max_iterations(7)
        .with_max_node_rewrites(3)
        .with_trace(true)
        .with_validation(false);

    assert_eq!(config.max_iterations, 7);
    assert_eq!(config.max_node_rewrites, 3);
    assert!(config.enable_trace);
    assert!(!config.validate_plans);
}

#[test]
fn test_sift_config_serialization() {
    let mut config = SiftConfig::default();
    config.optimizer.max_iterations = 12;
    config.optimizer.enable_trace = true;

    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("max_iterations"));
    assert!(json.contains("12"));

    let deserialized: SiftConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized, config);
}

#[test]
fn test_config_partial_json() {
    // Missing fields fall back to defaults
    let config = SiftConfig::from_json_str(r#"{"optimizer": {"enable_trace": true}}"#).unwrap();
    assert!(config.optimizer.enable_trace);
    assert_eq!(config.optimizer.max_iterations, 100);

    let config = SiftConfig::from_json_str("{}").unwrap();
    assert_eq!(config, SiftConfig::default());
}

#[test]
fn test_config_rejects_zero_caps() {
    let err = SiftConfig::from_json_str(r#"{"optimizer": {"max_iterations": 0}}"#).unwrap_err();
    assert!(matches!(err, SiftError::InvalidParameter(_)));

    let err = OptimizerConfig::default()
        .with_max_node_rewrites(0)
        .validate()
        .unwrap_err();
    assert!(matches!(err, SiftError::InvalidParameter(_)));
}

#[test]
fn test_config_malformed_json() {
    let err = SiftConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, SiftError::SerdeJsonError(_)));
}

#[test]
fn test_config_from_missing_file() {
    let err = SiftConfig::from_json_file("/nonexistent/sift/config.json").unwrap_err();
    assert!(matches!(err, SiftError::IoError(_)));
}
