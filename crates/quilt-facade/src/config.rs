//! TOML-based configuration for the provisioning facade.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use quilt_provision::{ConfirmationMode, ProvisionConfig, ProvisionedCheck};

use crate::error::FacadeError;

/// Top-level facade configuration loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct FacadeConfig {
    #[serde(default)]
    pub provision: ProvisionSection,
    #[serde(default)]
    pub record: RecordSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl FacadeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, FacadeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FacadeError::Config(format!("failed to read config file: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, FacadeError> {
        toml::from_str(s).map_err(|e| FacadeError::Config(format!("failed to parse config: {e}")))
    }
}

/// The `[provision]` section.
#[derive(Debug, Deserialize)]
pub struct ProvisionSection {
    /// Gateway challenge/grant budget in seconds.
    #[serde(default = "default_response_timeout_secs")]
    pub response_timeout_secs: u64,
    /// Residual-notification drain window in seconds.
    #[serde(default = "default_drain_window_secs")]
    pub drain_window_secs: u64,
    /// Access re-read cadence for the polling strategy, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Per-device confirmation budget in seconds.
    #[serde(default = "default_device_timeout_secs")]
    pub device_timeout_secs: u64,
    /// Confirmation strategy: "observe" or "poll".
    #[serde(default = "default_confirmation")]
    pub confirmation: String,
    /// Already-provisioned check: "instance" or "resources".
    #[serde(default = "default_provisioned_check")]
    pub provisioned_check: String,
}

fn default_response_timeout_secs() -> u64 {
    30
}

fn default_drain_window_secs() -> u64 {
    2
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_device_timeout_secs() -> u64 {
    30
}

fn default_confirmation() -> String {
    "observe".to_string()
}

fn default_provisioned_check() -> String {
    "resources".to_string()
}

impl Default for ProvisionSection {
    fn default() -> Self {
        Self {
            response_timeout_secs: default_response_timeout_secs(),
            drain_window_secs: default_drain_window_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            device_timeout_secs: default_device_timeout_secs(),
            confirmation: default_confirmation(),
            provisioned_check: default_provisioned_check(),
        }
    }
}

impl ProvisionSection {
    /// Resolve the section into the core provisioning configuration.
    pub fn to_config(&self) -> Result<ProvisionConfig, FacadeError> {
        Ok(ProvisionConfig {
            response_timeout: Duration::from_secs(self.response_timeout_secs),
            drain_window: Duration::from_secs(self.drain_window_secs),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            confirmation: parse_confirmation(&self.confirmation)?,
            provisioned_check: parse_provisioned_check(&self.provisioned_check)?,
        })
    }

    /// The per-device confirmation budget.
    pub fn device_timeout(&self) -> Duration {
        Duration::from_secs(self.device_timeout_secs)
    }
}

/// The `[record]` section.
#[derive(Debug, Deserialize)]
pub struct RecordSection {
    /// Destination of the persisted access record.
    #[serde(default = "default_record_path")]
    pub path: String,
}

fn default_record_path() -> String {
    "/etc/quilt/access_record.cfg".to_string()
}

impl Default for RecordSection {
    fn default() -> Self {
        Self {
            path: default_record_path(),
        }
    }
}

/// The `[logging]` section.
#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Parse a confirmation-strategy name.
pub fn parse_confirmation(s: &str) -> Result<ConfirmationMode, FacadeError> {
    match s.to_lowercase().as_str() {
        "observe" => Ok(ConfirmationMode::Observe),
        "poll" => Ok(ConfirmationMode::Poll),
        other => Err(FacadeError::Config(format!(
            "unknown confirmation strategy: {other}"
        ))),
    }
}

/// Parse an already-provisioned check name.
pub fn parse_provisioned_check(s: &str) -> Result<ProvisionedCheck, FacadeError> {
    match s.to_lowercase().as_str() {
        "instance" => Ok(ProvisionedCheck::InstanceExists),
        "resources" => Ok(ProvisionedCheck::ResourcesComplete),
        other => Err(FacadeError::Config(format!(
            "unknown provisioned check: {other}"
        ))),
    }
}
