//! Capability surface of the remote object store.
//!
//! Provisioning never talks to the store's wire protocol directly; it
//! consumes the narrow trait surface defined here. [`StoreClient`] is
//! the gateway-side session (the device's own objects), [`StoreServer`]
//! the fabric-side session (every registered client's objects). Change
//! notifications arrive as [`ChangeSet`] values over a bounded channel
//! wrapped in [`ChangeStream`].
//!
//! [`MemoryStore`] is an in-process implementation of both traits used
//! to exercise the provisioning logic without a store daemon.

pub mod error;
pub mod events;
pub mod memory;
pub mod traits;

pub use error::StoreError;
pub use events::{ChangeSet, ChangeStream};
pub use memory::MemoryStore;
pub use traits::{StoreClient, StoreServer};
