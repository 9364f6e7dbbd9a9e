#![forbid(unsafe_code)]

//! Loading [`RosterConfig`] from disk.
//!
//! Run:
//!   cargo test -p roster-runtime --features config --test config_loading

use std::io::Write;

use roster_runtime::{ConfigError, Coordinator, RosterConfig};

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn toml_file_round_trips_through_coordinator() {
    let file = write_temp(
        ".toml",
        r#"
[coordinator]
max_undo_entries = 3
warn_on_pending = false

[log]
filter = "roster=debug"
ansi = false
"#,
    );

    let config = RosterConfig::from_toml_file(file.path()).unwrap();
    assert!(config.validate().is_empty());
    assert_eq!(config.coordinator.max_undo_entries, 3);
    assert!(!config.coordinator.warn_on_pending);
    assert_eq!(config.log.filter, "roster=debug");
    assert!(!config.log.ansi);

    let coordinator = Coordinator::new(config.coordinator.clone());
    assert_eq!(coordinator.config().max_undo_entries, 3);
}

#[test]
fn json_file_with_missing_sections_uses_defaults() {
    let file = write_temp(".json", r#"{ "log": { "filter": "warn" } }"#);

    let config = RosterConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.log.filter, "warn");
    assert!(config.log.ansi);
    assert_eq!(config.coordinator.max_undo_entries, usize::MAX);
}

#[test]
fn empty_toml_is_default() {
    let config = RosterConfig::from_toml_str("").unwrap();
    assert_eq!(config, RosterConfig::default());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = RosterConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
    assert!(err.to_string().starts_with("I/O error"));
}

#[test]
fn wrong_type_is_parse_error() {
    let err = RosterConfig::from_toml_str("[coordinator]\nmax_undo_entries = \"lots\"\n")
        .unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn loaded_config_can_fail_validation() {
    let config = RosterConfig::from_toml_str("[coordinator]\nmax_undo_entries = 0\n").unwrap();
    let err = config.validated().unwrap_err();
    match err {
        ConfigError::Validation(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("coordinator.max_undo_entries"));
        }
        other => panic!("expected validation error, got {other}"),
    }
}
