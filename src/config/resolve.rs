use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult, ConfigError, ValidationError};
use crate::http::DispatchParameters;

use super::types::{ConfigFile, DispatchSection, DurationValue};

const DEFAULT_REPORT_PATH: &str = "results.log";
const DEFAULT_ERROR_LOG_PATH: &str = "err.log";
const DEFAULT_CONTROL_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 10;

/// Validated coordinator settings for one run.
#[derive(Debug, Clone)]
pub struct MasterConfig {
    pub listen: String,
    pub slaves: Vec<String>,
    pub dispatch: DispatchParameters,
    pub report_path: PathBuf,
    pub summary_path: Option<PathBuf>,
    pub targets_path: Option<PathBuf>,
    pub control_timeout: Duration,
}

/// Validated worker settings.
#[derive(Debug, Clone)]
pub struct SlaveConfig {
    pub listen: String,
    pub master: String,
    pub targets_path: Option<PathBuf>,
    pub error_log_path: PathBuf,
    pub host_name: Option<String>,
    pub control_timeout: Duration,
}

/// Builds the master settings from the `[master]` section.
///
/// # Errors
///
/// Returns an error when the section or a required field is missing, or a
/// value fails validation.
pub fn resolve_master(config: &ConfigFile) -> AppResult<MasterConfig> {
    let section = config
        .master
        .as_ref()
        .ok_or(ConfigError::MissingSection { section: "master" })?;

    let listen = required_address(section.listen.as_deref(), "master", "listen")?;
    let slaves = section
        .slaves
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|addr| addr.trim().to_owned())
        .collect::<Vec<_>>();
    if slaves.iter().any(String::is_empty) {
        return Err(invalid_field("master.slaves", ValidationError::EmptyAddress));
    }

    let dispatch_section = section.dispatch.as_ref().ok_or(ConfigError::MissingField {
        section: "master",
        field: "dispatch",
    })?;
    let dispatch = resolve_dispatch(dispatch_section)?;

    Ok(MasterConfig {
        listen,
        slaves,
        dispatch,
        report_path: section
            .report_path
            .as_deref()
            .map_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH), PathBuf::from),
        summary_path: section.summary_path.as_deref().map(PathBuf::from),
        targets_path: section.targets_path.as_deref().map(PathBuf::from),
        control_timeout: resolve_timeout(section.control_timeout.as_ref(), "master.control_timeout")?,
    })
}

/// Builds the slave settings from the `[slave]` section.
///
/// # Errors
///
/// Returns an error when the section or a required field is missing, or a
/// value fails validation.
pub fn resolve_slave(config: &ConfigFile) -> AppResult<SlaveConfig> {
    let section = config
        .slave
        .as_ref()
        .ok_or(ConfigError::MissingSection { section: "slave" })?;

    let listen = required_address(section.listen.as_deref(), "slave", "listen")?;
    let master = required_address(section.master.as_deref(), "slave", "master")?;
    let host_name = section
        .host_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned);

    Ok(SlaveConfig {
        listen,
        master,
        targets_path: section.targets_path.as_deref().map(PathBuf::from),
        error_log_path: section
            .error_log_path
            .as_deref()
            .map_or_else(|| PathBuf::from(DEFAULT_ERROR_LOG_PATH), PathBuf::from),
        host_name,
        control_timeout: resolve_timeout(section.control_timeout.as_ref(), "slave.control_timeout")?,
    })
}

fn resolve_dispatch(section: &DispatchSection) -> AppResult<DispatchParameters> {
    let rate = section.rate_per_second.ok_or(ConfigError::MissingField {
        section: "master.dispatch",
        field: "rate_per_second",
    })?;
    let total = section.total_attempts.ok_or(ConfigError::MissingField {
        section: "master.dispatch",
        field: "total_attempts",
    })?;
    let concurrency = section.max_concurrency.ok_or(ConfigError::MissingField {
        section: "master.dispatch",
        field: "max_concurrency",
    })?;
    let timeout_secs = section
        .timeout_seconds
        .unwrap_or(DEFAULT_ATTEMPT_TIMEOUT_SECS);

    DispatchParameters::from_raw(rate, total, concurrency, timeout_secs)
        .map_err(|err| invalid_field("master.dispatch", err))
}

fn required_address(
    value: Option<&str>,
    section: &'static str,
    field: &'static str,
) -> AppResult<String> {
    let value = value.ok_or(ConfigError::MissingField { section, field })?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid_field(
            &format!("{}.{}", section, field),
            ValidationError::EmptyAddress,
        ));
    }
    Ok(trimmed.to_owned())
}

fn resolve_timeout(value: Option<&DurationValue>, field: &str) -> AppResult<Duration> {
    value.map_or(Ok(DEFAULT_CONTROL_TIMEOUT), |value| {
        value
            .to_duration()
            .map_err(|err| invalid_field(field, err))
    })
}

fn invalid_field(field: &str, source: ValidationError) -> AppError {
    AppError::config(ConfigError::InvalidField {
        field: field.to_owned(),
        source,
    })
}
