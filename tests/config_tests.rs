use chordmux::config::{ConfigManager, GestureConfig};
use chordmux::ConfigError;
use std::fs;

#[test]
fn test_defaults() {
    let config = GestureConfig::default();
    assert_eq!(config.gesture_timeout_ms, 1000);
    assert_eq!(config.stroke.start_threshold, 10.0);
    assert_eq!(config.stroke.direction_change_threshold, 20.0);
    assert_eq!(config.stroke.extension_threshold, 10.0);
    assert_eq!(config.stroke.watch_interval_ms, 10);
}

#[test]
fn test_save_and_load_ron() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.ron");

    let mut config = GestureConfig::default();
    config.gesture_timeout_ms = 750;
    config.stroke.start_threshold = 15.0;
    config.save(&path).unwrap();

    assert_eq!(GestureConfig::load(&path).unwrap(), config);
}

#[test]
fn test_partial_ron_uses_defaults() {
    let config = GestureConfig::from_ron_str("(gesture_timeout_ms: 250)").unwrap();
    assert_eq!(config.gesture_timeout_ms, 250);
    assert_eq!(config.stroke, GestureConfig::default().stroke);
}

#[test]
fn test_load_toml_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "gesture_timeout_ms = 300\n\n[stroke]\nwatch_interval_ms = 5\n",
    )
    .unwrap();

    let config = GestureConfig::load(&path).unwrap();
    assert_eq!(config.gesture_timeout_ms, 300);
    assert_eq!(config.stroke.watch_interval_ms, 5);
    assert_eq!(config.stroke.start_threshold, 10.0);
}

#[test]
fn test_invalid_values_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.ron");
    fs::write(&path, "(gesture_timeout_ms: 0)").unwrap();

    match GestureConfig::load(&path) {
        Err(ConfigError::Invalid(errors)) => assert_eq!(errors.len(), 1),
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn test_parse_and_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ron");
    fs::write(&path, "(gesture_timeout_ms: \"soon\")").unwrap();
    assert!(matches!(GestureConfig::load(&path), Err(ConfigError::Ron(_))));

    let missing = dir.path().join("missing.ron");
    assert!(matches!(
        GestureConfig::load(&missing),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn test_default_path() {
    if let Ok(path) = GestureConfig::default_path() {
        assert!(path.ends_with("chordmux/config.ron"));
    }
}

#[test]
fn test_config_manager_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.ron");
    GestureConfig::default().save(&path).unwrap();

    let manager = ConfigManager::new(path.clone()).unwrap();
    assert_eq!(manager.get_config(), GestureConfig::default());
    assert_eq!(manager.get_config_path(), path);
    assert!(!manager.reload().unwrap());

    fs::write(&path, "(gesture_timeout_ms: 400)").unwrap();
    assert!(manager.reload().unwrap());
    assert_eq!(manager.get_config().gesture_timeout_ms, 400);

    fs::write(&path, "(gesture_timeout_ms: 0)").unwrap();
    assert!(manager.reload().is_err());
    assert_eq!(manager.get_config().gesture_timeout_ms, 400);
}
