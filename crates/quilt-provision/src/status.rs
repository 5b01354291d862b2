//! Constrained-device status snapshots.

/// Point-in-time view of a constrained device, recomputed fresh on
/// every check and never cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[must_use]
pub struct DeviceStatus {
    /// The device is registered with the fabric server.
    pub present: bool,
    /// The identity object instance exists on the device.
    pub identity_registered: bool,
    /// The device counts as provisioned per the configured check.
    pub access_registered: bool,
}

/// How "already provisioned" is decided.
///
/// Deployments historically disagreed on this: one lineage keyed off
/// the access instance existing at all, the other demanded the full
/// credential set. Both survive as named strategies; which one applies
/// is configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionedCheck {
    /// The access object instance exists.
    InstanceExists,
    /// All five access resources are populated with a nonzero expiry.
    ResourcesComplete,
}
