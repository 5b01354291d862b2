//! Provisioning orchestration for the quilt device-management fabric.
//!
//! Two flows are implemented on top of the store capability surface:
//!
//! - [`GatewayProvisioner`] drives a gateway's self-provisioning:
//!   populate the identity object, answer the cloud's iterated-HMAC
//!   licensee challenge, and wait for the access credential grant.
//! - [`ConstrainedProvisioner`] provisions a third-party device on the
//!   fabric's behalf: presence and idempotency checks, identity and
//!   parent-linkage writes, then confirmation by observation or polling.
//!
//! Both flows are deadline-bound; the deadline is the only cancellation
//! path. All state is scoped to a single attempt and carried in an
//! explicit [`ProvisionContext`].

pub mod confirm;
pub mod constrained;
pub mod context;
pub mod error;
pub mod gateway;
pub mod record;
pub mod status;
pub mod verification;

pub use confirm::{Confirmation, ConfirmationMode, ObserveConfirmation, PollConfirmation};
pub use constrained::{ClientEntry, ConstrainedProvisioner, ConstrainedRequest};
pub use context::{ProvisionConfig, ProvisionContext};
pub use error::ProvisionError;
pub use gateway::{GatewayProvisioner, GatewayRequest};
pub use record::{AccessRecord, DiscardSink, RecordSink};
pub use status::{DeviceStatus, ProvisionedCheck};
