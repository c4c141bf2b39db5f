use std::path::PathBuf;
use std::time::Duration;

use tempfile::tempdir;

use super::types::{ConfigFile, DurationValue};
use super::loader::load_config_file;
use super::{parse_duration_value, resolve_master, resolve_slave};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

fn write_config(name: &str, content: &str) -> AppResult<(tempfile::TempDir, PathBuf)> {
    let dir = tempdir()?;
    let path = dir.path().join(name);
    std::fs::write(&path, content)?;
    Ok((dir, path))
}

fn config_error(err: AppError) -> AppResult<ConfigError> {
    match err {
        AppError::Config(value) => Ok(value),
        other => Err(AppError::config(format!(
            "Expected config error, got: {}",
            other
        ))),
    }
}

#[test]
fn parse_toml_master_config() -> AppResult<()> {
    let (_dir, path) = write_config(
        "webswarm.toml",
        r#"
[master]
listen = "127.0.0.1:9000"
slaves = ["10.0.0.2:9001", " 10.0.0.3:9001 "]
report_path = "out/results.log"
control_timeout = "2s"

[master.dispatch]
rate_per_second = 50
total_attempts = 1000
max_concurrency = 8
timeout_seconds = 3
"#,
    )?;

    let master = resolve_master(&load_config_file(&path)?)?;
    if master.listen != "127.0.0.1:9000" {
        return Err(AppError::config(format!("Unexpected listen: {}", master.listen)));
    }
    if master.slaves != vec!["10.0.0.2:9001", "10.0.0.3:9001"] {
        return Err(AppError::config(format!("Unexpected slaves: {:?}", master.slaves)));
    }
    if master.report_path != PathBuf::from("out/results.log") {
        return Err(AppError::config("Unexpected report path"));
    }
    if master.control_timeout != Duration::from_secs(2) {
        return Err(AppError::config("Unexpected control timeout"));
    }
    let dispatch = master.dispatch;
    if dispatch.rate_per_second.get() != 50
        || dispatch.total_attempts != 1000
        || dispatch.max_concurrency.get() != 8
        || dispatch.per_request_timeout != Duration::from_secs(3)
    {
        return Err(AppError::config(format!(
            "Unexpected dispatch: {:?}",
            dispatch
        )));
    }
    if master.summary_path.is_some() || master.targets_path.is_some() {
        return Err(AppError::config("Optional paths should default to None"));
    }
    Ok(())
}

#[test]
fn parse_json_config_with_legacy_names() -> AppResult<()> {
    let (_dir, path) = write_config(
        "webswarm.json",
        r#"{
  "master": {
    "host": "0.0.0.0:9000",
    "slaves": [],
    "urlsFile": "urls.txt",
    "param": { "nPerSecond": 10, "total": 20, "parallel": 4 }
  },
  "slave": {
    "host": "0.0.0.0:9001",
    "masterHost": "10.0.0.1:9000",
    "urlsFile": "urls.txt"
  }
}"#,
    )?;

    let config = load_config_file(&path)?;
    let master = resolve_master(&config)?;
    if !master.slaves.is_empty() {
        return Err(AppError::config("Expected empty slave list"));
    }
    if master.targets_path != Some(PathBuf::from("urls.txt")) {
        return Err(AppError::config("Unexpected master targets path"));
    }
    if master.dispatch.per_request_timeout != Duration::from_secs(10) {
        return Err(AppError::config("Expected default attempt timeout"));
    }
    if master.report_path != PathBuf::from("results.log") {
        return Err(AppError::config("Expected default report path"));
    }

    let slave = resolve_slave(&config)?;
    if slave.master != "10.0.0.1:9000" || slave.listen != "0.0.0.0:9001" {
        return Err(AppError::config(format!("Unexpected slave: {:?}", slave)));
    }
    if slave.error_log_path != PathBuf::from("err.log") {
        return Err(AppError::config("Expected default error log path"));
    }
    if slave.control_timeout != Duration::from_secs(10) {
        return Err(AppError::config("Expected default control timeout"));
    }
    Ok(())
}

#[test]
fn resolve_master_requires_section() -> AppResult<()> {
    let err = match resolve_master(&ConfigFile::default()) {
        Ok(_) => return Err(AppError::config("Expected missing section error")),
        Err(err) => config_error(err)?,
    };
    match err {
        ConfigError::MissingSection { section: "master" } => Ok(()),
        other => Err(AppError::config(format!("Unexpected error: {}", other))),
    }
}

#[test]
fn resolve_slave_requires_master_address() -> AppResult<()> {
    let config: ConfigFile = toml::from_str("[slave]\nlisten = \"127.0.0.1:9001\"\n")
        .map_err(|err| AppError::config(format!("toml parse failed: {}", err)))?;
    let err = match resolve_slave(&config) {
        Ok(_) => return Err(AppError::config("Expected missing field error")),
        Err(err) => config_error(err)?,
    };
    match err {
        ConfigError::MissingField {
            section: "slave",
            field: "master",
        } => Ok(()),
        other => Err(AppError::config(format!("Unexpected error: {}", other))),
    }
}

#[test]
fn resolve_master_rejects_zero_rate() -> AppResult<()> {
    let config: ConfigFile = toml::from_str(
        "[master]\nlisten = \"127.0.0.1:9000\"\nslaves = []\n[master.dispatch]\nrate_per_second = 0\ntotal_attempts = 1\nmax_concurrency = 1\n",
    )
    .map_err(|err| AppError::config(format!("toml parse failed: {}", err)))?;
    let err = match resolve_master(&config) {
        Ok(_) => return Err(AppError::config("Expected invalid rate")),
        Err(err) => config_error(err)?,
    };
    match err {
        ConfigError::InvalidField {
            field,
            source: ValidationError::DispatchFieldTooSmall {
                field: "ratePerSecond",
            },
        } if field == "master.dispatch" => Ok(()),
        other => Err(AppError::config(format!("Unexpected error: {}", other))),
    }
}

#[test]
fn resolve_master_rejects_blank_slave_address() -> AppResult<()> {
    let config: ConfigFile = toml::from_str(
        "[master]\nlisten = \"127.0.0.1:9000\"\nslaves = [\"  \"]\n[master.dispatch]\nrate_per_second = 1\ntotal_attempts = 1\nmax_concurrency = 1\n",
    )
    .map_err(|err| AppError::config(format!("toml parse failed: {}", err)))?;
    let err = match resolve_master(&config) {
        Ok(_) => return Err(AppError::config("Expected blank slave error")),
        Err(err) => config_error(err)?,
    };
    match err {
        ConfigError::InvalidField {
            source: ValidationError::EmptyAddress,
            ..
        } => Ok(()),
        other => Err(AppError::config(format!("Unexpected error: {}", other))),
    }
}

#[test]
fn load_config_file_rejects_unknown_extension() -> AppResult<()> {
    let (_dir, path) = write_config("webswarm.yaml", "master: {}\n")?;
    let err = match load_config_file(&path) {
        Ok(_) => return Err(AppError::config("Expected extension error")),
        Err(err) => config_error(err)?,
    };
    match err {
        ConfigError::UnsupportedExtension { ext } if ext == "yaml" => Ok(()),
        other => Err(AppError::config(format!("Unexpected error: {}", other))),
    }
}

#[test]
fn load_config_file_reports_malformed_json() -> AppResult<()> {
    let (_dir, path) = write_config("webswarm.json", "{ \"master\": ")?;
    let err = match load_config_file(&path) {
        Ok(_) => return Err(AppError::config("Expected parse error")),
        Err(err) => config_error(err)?,
    };
    match err {
        ConfigError::ParseJson { .. } => Ok(()),
        other => Err(AppError::config(format!("Unexpected error: {}", other))),
    }
}

#[test]
fn parse_duration_accepts_units() -> AppResult<()> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("5", Duration::from_secs(5)),
        (" 3s ", Duration::from_secs(3)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration_value(input)?;
        if parsed != expected {
            return Err(AppError::config(format!(
                "'{}' parsed to {:?}, expected {:?}",
                input, parsed, expected
            )));
        }
    }
    Ok(())
}

#[test]
fn parse_duration_rejects_bad_values() -> AppResult<()> {
    for input in ["", "0s", "ms", "10d", "1.5s"] {
        if parse_duration_value(input).is_ok() {
            return Err(AppError::config(format!("'{}' should be rejected", input)));
        }
    }
    if DurationValue::Seconds(0).to_duration().is_ok() {
        return Err(AppError::config("Zero seconds should be rejected"));
    }
    Ok(())
}
