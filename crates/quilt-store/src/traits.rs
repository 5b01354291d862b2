//! The store session traits consumed by provisioning.
//!
//! Provisioning logic is written against these traits; concrete
//! implementations bridge them to the store's IPC transport. Every
//! operation may block up to an implementation-chosen timeout and
//! surface [`StoreError::Timeout`].

use quilt_core::{ObjectDef, ResourcePath, Value};

use crate::error::StoreError;
use crate::events::ChangeStream;

/// Session with the local store daemon: the device's own objects.
pub trait StoreClient: Send + Sync {
    /// Register an object schema. Idempotent per object id: an already
    /// defined object is skipped, not an error.
    fn define_object(
        &self,
        object: &ObjectDef,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Whether the given instance path currently exists.
    fn instance_exists(
        &self,
        path: &ResourcePath,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Read a single resource value.
    fn read(&self, path: &ResourcePath)
    -> impl Future<Output = Result<Value, StoreError>> + Send;

    /// Write a batch of resource values atomically. When `create` names
    /// an instance path, that instance is created as part of the batch.
    fn write_batch(
        &self,
        writes: &[(ResourcePath, Value)],
        create: Option<&ResourcePath>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Subscribe to change notifications for everything under `path`.
    /// Dropping the returned stream cancels the subscription.
    fn subscribe(
        &self,
        path: &ResourcePath,
    ) -> impl Future<Output = Result<ChangeStream, StoreError>> + Send;
}

/// Session with the fabric server: objects of every registered client.
pub trait StoreServer: Send + Sync {
    /// Register an object schema with the server. Idempotent per object id.
    fn define_object(
        &self,
        object: &ObjectDef,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// The ids of every client currently registered with the fabric.
    fn list_clients(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Whether `client` currently exposes anything at or under `path`.
    fn client_has_path(
        &self,
        client: &str,
        path: &ResourcePath,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Read a single resource value from a client.
    fn read(
        &self,
        client: &str,
        path: &ResourcePath,
    ) -> impl Future<Output = Result<Value, StoreError>> + Send;

    /// Write a batch of resource values to a client. When `create`
    /// names an instance path, that instance is created first.
    fn write_batch(
        &self,
        client: &str,
        writes: &[(ResourcePath, Value)],
        create: Option<&ResourcePath>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Observe change notifications for everything under `path` on a
    /// client. Dropping the returned stream cancels the observation.
    fn observe(
        &self,
        client: &str,
        path: &ResourcePath,
    ) -> impl Future<Output = Result<ChangeStream, StoreError>> + Send;
}
