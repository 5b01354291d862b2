//! Per-process provisioning context.
//!
//! The context bundles the derived path set with the tunable timing and
//! strategy configuration. It is constructed once by the caller and
//! passed into every provisioner; nothing provisioning-related lives in
//! process-global state.

use std::time::Duration;

use quilt_core::PathSet;

use crate::confirm::ConfirmationMode;
use crate::status::ProvisionedCheck;

/// How long a gateway attempt waits for the cloud's responses.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// How long residual notifications are drained after an attempt.
pub const DEFAULT_DRAIN_WINDOW: Duration = Duration::from_secs(2);

/// Interval between access re-reads in the polling strategy.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default deadline for a constrained-device attempt.
pub const DEFAULT_PROVISION_TIMEOUT: Duration = Duration::from_secs(30);

/// Timing and strategy configuration for provisioning attempts.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Deadline for the gateway's challenge/grant event loop.
    pub response_timeout: Duration,
    /// Residual-notification drain window after a gateway attempt.
    /// A workaround for unordered delivery on the IPC transport; a
    /// late notification absorbed here cannot be misread by the next
    /// attempt.
    pub drain_window: Duration,
    /// Re-read interval for [`ConfirmationMode::Poll`].
    pub poll_interval: Duration,
    /// How constrained-device confirmation is awaited.
    pub confirmation: ConfirmationMode,
    /// How "already provisioned" is decided for constrained devices.
    pub provisioned_check: ProvisionedCheck,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            drain_window: DEFAULT_DRAIN_WINDOW,
            poll_interval: DEFAULT_POLL_INTERVAL,
            confirmation: ConfirmationMode::Observe,
            provisioned_check: ProvisionedCheck::ResourcesComplete,
        }
    }
}

/// Everything a provisioner needs beyond the store session itself.
#[derive(Debug, Clone)]
pub struct ProvisionContext {
    pub paths: PathSet,
    pub config: ProvisionConfig,
}

impl ProvisionContext {
    pub fn new(config: ProvisionConfig) -> Self {
        Self {
            paths: PathSet::new(),
            config,
        }
    }
}

impl Default for ProvisionContext {
    fn default() -> Self {
        Self::new(ProvisionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_cadence() {
        let config = ProvisionConfig::default();
        assert_eq!(config.response_timeout, Duration::from_secs(30));
        assert_eq!(config.drain_window, Duration::from_secs(2));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.confirmation, ConfirmationMode::Observe);
        assert_eq!(config.provisioned_check, ProvisionedCheck::ResourcesComplete);
    }
}
