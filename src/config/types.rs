use std::time::Duration;

use serde::Deserialize;

use crate::error::ValidationError;

/// Raw config file as written by the operator. Every field is optional here;
/// `resolve_master` / `resolve_slave` turn it into validated settings.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub master: Option<MasterSection>,
    pub slave: Option<SlaveSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MasterSection {
    #[serde(alias = "host")]
    pub listen: Option<String>,
    pub slaves: Option<Vec<String>>,
    #[serde(alias = "param")]
    pub dispatch: Option<DispatchSection>,
    pub report_path: Option<String>,
    pub summary_path: Option<String>,
    #[serde(alias = "urlsFile")]
    pub targets_path: Option<String>,
    pub control_timeout: Option<DurationValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SlaveSection {
    #[serde(alias = "host")]
    pub listen: Option<String>,
    #[serde(alias = "masterHost")]
    pub master: Option<String>,
    #[serde(alias = "urlsFile")]
    pub targets_path: Option<String>,
    pub error_log_path: Option<String>,
    pub host_name: Option<String>,
    pub control_timeout: Option<DurationValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DispatchSection {
    #[serde(alias = "nPerSecond", alias = "rate")]
    pub rate_per_second: Option<u64>,
    #[serde(alias = "total")]
    pub total_attempts: Option<u64>,
    #[serde(alias = "parallel", alias = "concurrency")]
    pub max_concurrency: Option<u64>,
    #[serde(alias = "timeout")]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}
