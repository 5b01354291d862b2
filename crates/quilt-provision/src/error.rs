//! Error types for provisioning attempts.

use std::time::Duration;

use quilt_core::DeviceIdError;
use quilt_crypto::CryptoError;
use quilt_store::StoreError;

/// Errors that abort a provisioning attempt.
///
/// Public entry points map every variant to `ProvisionStatus::Fail`
/// after logging it; a timeout and a store failure are distinguishable
/// in the logs only, not by the returned status.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("invalid argument: {0}")]
    Validation(&'static str),
    #[error("invalid parent id: {0}")]
    ParentId(#[from] DeviceIdError),
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    #[error("licensee proof failed: {0}")]
    Crypto(#[from] CryptoError),
    #[error("no confirmation within {waited:?}")]
    Timeout { waited: Duration },
}
