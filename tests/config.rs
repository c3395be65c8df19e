use auditsweep_core::{cli::commands::LoggingConfig, config::{LoggingSettings, Settings}};
use std::io::Write;

#[test]
fn test_logging_config() {
    // Test default values
    let default_config = LoggingConfig::default();
    assert_eq!(default_config.verbose, 0);
    assert_eq!(default_config.get_effective_level(), "info");
    assert!(default_config.log_level.is_none());
    assert!(default_config.log_filter.is_none());

    // Test -v flag (debug level)
    let debug_config = LoggingConfig {
        verbose: 1,
        log_level: None,
        log_filter: None,
    };
    assert_eq!(debug_config.get_effective_level(), "debug");

    // Test -vvv still means trace
    let trace_config = LoggingConfig {
        verbose: 3,
        log_level: None,
        log_filter: None,
    };
    assert_eq!(trace_config.get_effective_level(), "trace");

    // Test explicit log level
    let explicit_config = LoggingConfig {
        verbose: 0,
        log_level: Some("warn".to_string()),
        log_filter: None,
    };
    assert_eq!(explicit_config.get_effective_level(), "warn");

    // Test that -v overrides explicit level
    let override_config = LoggingConfig {
        verbose: 1,
        log_level: Some("warn".to_string()),
        log_filter: None,
    };
    assert_eq!(override_config.get_effective_level(), "debug");
}

#[test]
fn test_logging_falls_back_to_settings() {
    let settings = LoggingSettings {
        level: Some("error".to_string()),
        filter: Some("auditsweep_core=trace".to_string()),
    };

    let merged = LoggingConfig::default().with_settings(&settings);
    assert_eq!(merged.get_effective_level(), "error");
    assert_eq!(merged.log_filter.as_deref(), Some("auditsweep_core=trace"));

    let explicit = LoggingConfig {
        verbose: 0,
        log_level: Some("warn".to_string()),
        log_filter: None,
    }
    .with_settings(&settings);
    assert_eq!(explicit.get_effective_level(), "warn");
    assert!(explicit.log_filter.is_none());
}

#[test]
fn test_user_config_overrides_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "[retrieval]\ninterval_minutes = 10\nresult_size = 5000\n\n[logging]\nlevel = \"debug\""
    )
    .unwrap();

    let settings = Settings::load(Some(file.path())).unwrap();
    assert_eq!(settings.retrieval.interval_minutes, 10);
    assert_eq!(settings.retrieval.result_size, 5000);
    assert_eq!(settings.retrieval.session_size, 50_000);
    assert_eq!(settings.retrieval.retry_limit, 3);
    assert_eq!(settings.logging.level.as_deref(), Some("debug"));
    assert_eq!(settings.logging.filter.as_deref(), Some("auditsweep_core=info,auditsweep=info"));
}

#[test]
fn test_missing_user_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(Settings::load(Some(missing.as_path())).is_err());
}

#[test]
fn test_verbose_flags_override_file_filter() {
    let file = Settings::embedded().unwrap().logging;

    let quiet = LoggingConfig::default().with_settings(&file);
    assert_eq!(
        quiet.filter_directives(),
        "auditsweep_core=info,auditsweep=info"
    );

    let debug = LoggingConfig {
        verbose: 1,
        ..Default::default()
    }
    .with_settings(&file);
    assert_eq!(debug.get_effective_level(), "debug");
    assert_eq!(
        debug.filter_directives(),
        "auditsweep_core=debug,auditsweep=debug"
    );

    let trace = LoggingConfig {
        verbose: 2,
        ..Default::default()
    }
    .with_settings(&file);
    assert_eq!(
        trace.filter_directives(),
        "auditsweep_core=trace,auditsweep=trace"
    );

    let warn = LoggingConfig {
        log_level: Some("warn".to_string()),
        ..Default::default()
    }
    .with_settings(&file);
    assert_eq!(warn.filter_directives(), "auditsweep_core=warn,auditsweep=warn");

    // an explicit filter still wins over the level
    let explicit = LoggingConfig {
        verbose: 1,
        log_level: None,
        log_filter: Some("auditsweep_core=error".to_string()),
    }
    .with_settings(&file);
    assert_eq!(explicit.filter_directives(), "auditsweep_core=error");
}
