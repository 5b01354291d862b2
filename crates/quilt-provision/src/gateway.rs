//! Gateway self-provisioning.
//!
//! The gateway populates its identity object, then waits for the cloud
//! to push a licensee challenge and iteration count, answers with the
//! iterated HMAC proof, and finally waits for the access credential
//! grant. The whole exchange is bounded by one deadline; a residual
//! drain window afterwards absorbs any notification still in flight so
//! a late message cannot be misread by a subsequent attempt.

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use quilt_core::schema::{ACCESS_OBJECT, IDENTITY_OBJECT};
use quilt_core::{ProvisionStatus, Value};
use quilt_crypto::licensee_proof;
use quilt_store::{ChangeSet, ChangeStream, StoreClient, StoreError};

use crate::context::ProvisionContext;
use crate::error::ProvisionError;
use crate::record::{self, RecordSink};
use crate::verification::{AttemptPhase, VerificationState};

/// Arguments for a gateway provisioning attempt.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub device_name: String,
    pub device_type: String,
    pub licensee_id: i64,
    pub fcap: String,
    pub licensee_secret: String,
}

impl GatewayRequest {
    fn validate(&self) -> Result<(), ProvisionError> {
        if self.device_name.is_empty() {
            return Err(ProvisionError::Validation("device name must not be empty"));
        }
        if self.device_type.is_empty() {
            return Err(ProvisionError::Validation("device type must not be empty"));
        }
        if self.fcap.is_empty() {
            return Err(ProvisionError::Validation("fcap code must not be empty"));
        }
        if self.licensee_secret.is_empty() {
            return Err(ProvisionError::Validation(
                "licensee secret must not be empty",
            ));
        }
        Ok(())
    }
}

/// Drives gateway self-provisioning against a client store session.
pub struct GatewayProvisioner<C> {
    store: C,
    ctx: ProvisionContext,
}

impl<C: StoreClient> GatewayProvisioner<C> {
    pub fn new(store: C, ctx: ProvisionContext) -> Self {
        Self { store, ctx }
    }

    /// Provision this gateway onto the fabric.
    ///
    /// Terminal by construction: every outcome maps onto
    /// [`ProvisionStatus`]; errors are logged here and reported as
    /// `Fail`. A timeout and a store failure yield the same status and
    /// differ only in the log.
    pub async fn provision(
        &self,
        request: &GatewayRequest,
        sink: &(impl RecordSink + ?Sized),
    ) -> ProvisionStatus {
        match self.try_provision(request, sink).await {
            Ok(status) => {
                info!(%status, "gateway provisioning finished");
                status
            }
            Err(error) => {
                error!(%error, "gateway provisioning failed");
                ProvisionStatus::Fail
            }
        }
    }

    /// Whether this gateway already holds an access object instance.
    pub async fn is_provisioned(&self) -> bool {
        match self
            .store
            .instance_exists(&self.ctx.paths.access_instance)
            .await
        {
            Ok(exists) => exists,
            Err(error) => {
                debug!(%error, "provisioned check failed");
                false
            }
        }
    }

    async fn try_provision(
        &self,
        request: &GatewayRequest,
        sink: &(impl RecordSink + ?Sized),
    ) -> Result<ProvisionStatus, ProvisionError> {
        request.validate()?;
        let paths = &self.ctx.paths;
        let config = &self.ctx.config;

        info!(
            device_name = %request.device_name,
            device_type = %request.device_type,
            licensee_id = request.licensee_id,
            "provisioning gateway device"
        );

        self.store.define_object(&IDENTITY_OBJECT).await?;
        self.store.define_object(&ACCESS_OBJECT).await?;

        if self.store.instance_exists(&paths.access_instance).await? {
            info!("gateway already provisioned");
            return Ok(ProvisionStatus::AlreadyProvisioned);
        }

        debug!(
            phase = AttemptPhase::PopulatingIdentity.name(),
            "populating identity object"
        );
        let create = if self.store.instance_exists(&paths.identity_instance).await? {
            None
        } else {
            Some(&paths.identity_instance)
        };
        let identity_writes = [
            (paths.device_name, Value::from(request.device_name.as_str())),
            (paths.device_type, Value::from(request.device_type.as_str())),
            (paths.licensee_id, Value::from(request.licensee_id)),
            (paths.fcap, Value::from(request.fcap.as_str())),
        ];
        self.store.write_batch(&identity_writes, create).await?;

        let mut state = VerificationState::new();
        let mut identity_events = self.store.subscribe(&paths.identity_instance).await?;
        let mut access_events = self.store.subscribe(&paths.access_object).await?;

        info!("waiting for responses from the cloud");
        let deadline = Instant::now() + config.response_timeout;
        let exchange = self
            .run_exchange(
                request,
                &mut state,
                &mut identity_events,
                &mut access_events,
                deadline,
            )
            .await;

        // Runs whether the exchange succeeded, timed out, or aborted.
        let drained = drain_residual(
            &mut identity_events,
            &mut access_events,
            config.drain_window,
        )
        .await;
        if drained > 0 {
            debug!(drained, "absorbed residual notifications");
        }
        drop(identity_events);
        drop(access_events);

        let phase = exchange?;

        if !state.succeeded() {
            warn!(phase = phase.name(), "gateway provisioning did not complete");
            return Ok(ProvisionStatus::Fail);
        }

        info!(
            phase = AttemptPhase::Provisioned.name(),
            "gateway device provisioned"
        );

        match record::collect_access_record(&self.store).await {
            Ok(record) => {
                if let Err(error) = sink.persist(&record) {
                    warn!(%error, "failed to persist access record");
                }
            }
            Err(error) => warn!(%error, "failed to collect access record"),
        }

        Ok(ProvisionStatus::Ok)
    }

    /// Deadline-bounded event loop: absorb challenge material, answer
    /// with the licensee proof at most once, and wait for the access
    /// grant. Returns the phase the attempt ended in.
    async fn run_exchange(
        &self,
        request: &GatewayRequest,
        state: &mut VerificationState,
        identity_events: &mut ChangeStream,
        access_events: &mut ChangeStream,
        deadline: Instant,
    ) -> Result<AttemptPhase, ProvisionError> {
        let mut phase = AttemptPhase::AwaitingChallenge;

        while state.waiting() {
            enum Event {
                Identity(Option<ChangeSet>),
                Access(Option<ChangeSet>),
                Deadline,
            }

            let event = tokio::select! {
                _ = tokio::time::sleep_until(deadline) => Event::Deadline,
                change = identity_events.recv() => Event::Identity(change),
                change = access_events.recv() => Event::Access(change),
            };

            match event {
                Event::Deadline => {
                    phase = AttemptPhase::TimedOut;
                    info!("no response within timeout");
                    break;
                }
                Event::Identity(None) | Event::Access(None) => {
                    return Err(ProvisionError::Store(StoreError::SubscriptionClosed));
                }
                Event::Identity(Some(change)) => {
                    debug!(fields = change.len(), "identity object updated");
                    state.absorb_identity(&change, &self.ctx.paths);

                    let inputs = state
                        .verification_inputs()
                        .map(|(challenge, iterations)| (challenge.to_vec(), iterations));
                    if let Some((challenge, iterations)) = inputs {
                        phase = AttemptPhase::VerifyingLicensee;
                        info!(phase = phase.name(), iterations, "performing licensee verification");
                        let iterations = u32::try_from(iterations).map_err(|_| {
                            ProvisionError::Validation("iteration count out of range")
                        })?;
                        let proof =
                            licensee_proof(&challenge, iterations, &request.licensee_secret)?;
                        self.store
                            .write_batch(
                                &[(self.ctx.paths.licensee_hash, Value::from(proof.to_vec()))],
                                None,
                            )
                            .await?;
                        state.mark_verified();
                        phase = AttemptPhase::AwaitingAccessGrant;
                    }
                }
                Event::Access(Some(change)) => {
                    debug!(fields = change.len(), "access object updated");
                    state.absorb_access(&change, &self.ctx.paths);
                }
            }
        }

        Ok(phase)
    }
}

/// Absorb notifications still in flight after an attempt, for at most
/// `window`. A workaround for unordered delivery on the IPC transport:
/// without it a late message could be misread by the next attempt.
async fn drain_residual(
    identity_events: &mut ChangeStream,
    access_events: &mut ChangeStream,
    window: std::time::Duration,
) -> usize {
    let deadline = Instant::now() + window;
    let mut drained = 0;
    let mut identity_open = true;
    let mut access_open = true;
    while identity_open || access_open {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => break,
            change = identity_events.recv(), if identity_open => match change {
                Some(_) => drained += 1,
                None => identity_open = false,
            },
            change = access_events.recv(), if access_open => match change {
                Some(_) => drained += 1,
                None => access_open = false,
            },
        }
    }
    drained
}
