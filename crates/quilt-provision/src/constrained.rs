//! Constrained-device provisioning.
//!
//! The gateway provisions a third-party device through the fabric
//! server: validate the parent linkage, check the device is present and
//! not already provisioned, push its identity data, then wait for the
//! cloud to grant access credentials via the configured confirmation
//! strategy.

use tracing::{debug, error, info, warn};

use quilt_core::schema::{ACCESS_OBJECT, IDENTITY_OBJECT};
use quilt_core::{DeviceId, ProvisionStatus, Value};
use quilt_store::StoreServer;

use crate::confirm::{
    Confirmation, ConfirmationMode, ObserveConfirmation, PollConfirmation, read_access_complete,
};
use crate::context::ProvisionContext;
use crate::error::ProvisionError;
use crate::status::{DeviceStatus, ProvisionedCheck};

/// Arguments for a constrained-device provisioning attempt.
#[derive(Debug, Clone)]
pub struct ConstrainedRequest {
    pub client_id: String,
    pub fcap: String,
    pub device_type: String,
    pub licensee_id: i64,
    /// Parent gateway's device id in its 48-character wire form.
    pub parent_id: String,
    pub timeout: std::time::Duration,
}

impl ConstrainedRequest {
    /// Validate the arguments and decode the parent linkage. Runs
    /// before any store contact.
    fn validate(&self) -> Result<DeviceId, ProvisionError> {
        if self.client_id.is_empty() {
            return Err(ProvisionError::Validation("client id must not be empty"));
        }
        if self.fcap.is_empty() {
            return Err(ProvisionError::Validation("fcap code must not be empty"));
        }
        if self.device_type.is_empty() {
            return Err(ProvisionError::Validation("device type must not be empty"));
        }
        Ok(DeviceId::parse_wire(&self.parent_id)?)
    }
}

/// One entry of the fabric's client listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEntry {
    pub client_id: String,
    pub provisioned: bool,
}

/// Drives constrained-device provisioning against a server store session.
pub struct ConstrainedProvisioner<S> {
    store: S,
    ctx: ProvisionContext,
}

impl<S: StoreServer> ConstrainedProvisioner<S> {
    pub fn new(store: S, ctx: ProvisionContext) -> Self {
        Self { store, ctx }
    }

    /// Provision a constrained device. Terminal by construction;
    /// errors are logged here and reported as `Fail`.
    pub async fn provision(&self, request: &ConstrainedRequest) -> ProvisionStatus {
        match self.try_provision(request).await {
            Ok(status) => {
                info!(client = %request.client_id, %status, "constrained provisioning finished");
                status
            }
            Err(error) => {
                error!(client = %request.client_id, %error, "constrained provisioning failed");
                ProvisionStatus::Fail
            }
        }
    }

    async fn try_provision(
        &self,
        request: &ConstrainedRequest,
    ) -> Result<ProvisionStatus, ProvisionError> {
        let parent = request.validate()?;
        let paths = &self.ctx.paths;
        let config = &self.ctx.config;

        info!(
            client = %request.client_id,
            device_type = %request.device_type,
            licensee_id = request.licensee_id,
            parent = %parent,
            "provisioning constrained device"
        );

        self.store.define_object(&IDENTITY_OBJECT).await?;
        self.store.define_object(&ACCESS_OBJECT).await?;

        let status = self.device_status(&request.client_id).await?;
        if !status.present {
            warn!(client = %request.client_id, "device not present");
            return Ok(ProvisionStatus::Fail);
        }
        if status.access_registered {
            info!(client = %request.client_id, "device already provisioned");
            return Ok(ProvisionStatus::AlreadyProvisioned);
        }

        let writes = [
            (paths.fcap, Value::from(request.fcap.as_str())),
            (paths.device_type, Value::from(request.device_type.as_str())),
            (paths.licensee_id, Value::from(request.licensee_id)),
            (paths.parent_id, Value::from(parent.to_bytes().to_vec())),
        ];
        let create = if status.identity_registered {
            None
        } else {
            Some(&paths.identity_instance)
        };
        self.store
            .write_batch(&request.client_id, &writes, create)
            .await?;

        match config.confirmation {
            ConfirmationMode::Observe => {
                ObserveConfirmation
                    .wait_for_access(&self.store, &request.client_id, paths, request.timeout)
                    .await?
            }
            ConfirmationMode::Poll => {
                PollConfirmation {
                    interval: config.poll_interval,
                }
                .wait_for_access(&self.store, &request.client_id, paths, request.timeout)
                .await?
            }
        }

        Ok(ProvisionStatus::Ok)
    }

    /// Fresh status snapshot for a device; nothing is cached.
    pub async fn device_status(&self, client: &str) -> Result<DeviceStatus, ProvisionError> {
        let paths = &self.ctx.paths;

        let present = self
            .store
            .list_clients()
            .await?
            .iter()
            .any(|id| id == client);
        if !present {
            return Ok(DeviceStatus::default());
        }

        let identity_registered = self
            .store
            .client_has_path(client, &paths.identity_instance)
            .await?;
        let access_registered = match self.ctx.config.provisioned_check {
            ProvisionedCheck::InstanceExists => {
                self.store
                    .client_has_path(client, &paths.access_instance)
                    .await?
            }
            ProvisionedCheck::ResourcesComplete => {
                read_access_complete(&self.store, client, paths).await
            }
        };

        Ok(DeviceStatus {
            present: true,
            identity_registered,
            access_registered,
        })
    }

    /// Whether the device is present and provisioned. Read-only, safe
    /// to call at any time, including alongside an in-flight attempt.
    pub async fn is_provisioned(&self, client: &str) -> bool {
        match self.device_status(client).await {
            Ok(status) => status.present && status.access_registered,
            Err(error) => {
                debug!(client, %error, "provisioned check failed");
                false
            }
        }
    }

    /// Every registered client with its provisioned flag.
    pub async fn client_list(&self) -> Result<Vec<ClientEntry>, ProvisionError> {
        let mut entries = Vec::new();
        for client_id in self.store.list_clients().await? {
            let provisioned = self.is_provisioned(&client_id).await;
            entries.push(ClientEntry {
                client_id,
                provisioned,
            });
        }
        Ok(entries)
    }
}
