//! Constrained-device confirmation strategies.
//!
//! After the identity and parent-linkage writes, the provisioner waits
//! for the cloud to grant the device its access credentials. Two
//! interchangeable strategies implement the wait behind one interface;
//! which one runs is configuration, and the provisioner control flow is
//! written once against the trait.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use quilt_core::PathSet;
use quilt_store::{StoreError, StoreServer};

use crate::error::ProvisionError;
use crate::verification::access_grant_complete;

/// Which confirmation strategy a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationMode {
    /// Subscribe to access-object changes and await events.
    Observe,
    /// Re-read the access resources on a fixed cadence.
    Poll,
}

/// A strategy for awaiting the access credential grant.
pub trait Confirmation {
    /// Wait until `client` holds a complete credential grant, or the
    /// deadline passes.
    fn wait_for_access<S: StoreServer>(
        &self,
        store: &S,
        client: &str,
        paths: &PathSet,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), ProvisionError>> + Send;
}

/// Whether the client currently holds a complete credential grant,
/// decided by reading the five access resources. Read failures count
/// as "not yet", not as errors: an unpopulated resource reads as
/// missing until the cloud writes it.
pub async fn read_access_complete<S: StoreServer>(
    store: &S,
    client: &str,
    paths: &PathSet,
) -> bool {
    for path in paths.access_resources() {
        match store.read(client, &path).await {
            Ok(value) => {
                if path == paths.token_expiry && value.as_integer().unwrap_or(0) == 0 {
                    return false;
                }
            }
            Err(_) => return false,
        }
    }
    true
}

/// Timed re-read strategy.
#[derive(Debug, Clone, Copy)]
pub struct PollConfirmation {
    pub interval: Duration,
}

impl Confirmation for PollConfirmation {
    async fn wait_for_access<S: StoreServer>(
        &self,
        store: &S,
        client: &str,
        paths: &PathSet,
        timeout: Duration,
    ) -> Result<(), ProvisionError> {
        let started = Instant::now();
        let deadline = started + timeout;
        loop {
            if read_access_complete(store, client, paths).await {
                info!(client, "access grant confirmed by poll");
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(ProvisionError::Timeout {
                    waited: started.elapsed(),
                });
            }
            debug!(client, "access grant not yet complete");
            tokio::time::sleep_until(deadline.min(now + self.interval)).await;
        }
    }
}

/// Change-subscription strategy.
#[derive(Debug, Clone, Copy)]
pub struct ObserveConfirmation;

impl Confirmation for ObserveConfirmation {
    async fn wait_for_access<S: StoreServer>(
        &self,
        store: &S,
        client: &str,
        paths: &PathSet,
        timeout: Duration,
    ) -> Result<(), ProvisionError> {
        let started = Instant::now();
        let deadline = started + timeout;

        let mut events = store.observe(client, &paths.access_object).await?;

        // A grant that landed before the observation was in place would
        // otherwise never produce an event.
        if read_access_complete(store, client, paths).await {
            info!(client, "access grant already complete");
            return Ok(());
        }

        loop {
            match tokio::time::timeout_at(deadline, events.recv()).await {
                Err(_) => {
                    return Err(ProvisionError::Timeout {
                        waited: started.elapsed(),
                    });
                }
                Ok(None) => return Err(ProvisionError::Store(StoreError::SubscriptionClosed)),
                Ok(Some(change)) => {
                    if access_grant_complete(&change, paths) {
                        info!(client, "access grant confirmed by observation");
                        return Ok(());
                    }
                    debug!(client, "access change without full grant; still waiting");
                }
            }
        }
    }
}
