//! In-process reference store.
//!
//! Implements both session traits against shared in-memory state so the
//! provisioning logic can be exercised without a store daemon. Tests
//! drive the "cloud side" by pushing values directly with [`MemoryStore::push`],
//! which fires change notifications exactly like a remote write would.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use quilt_core::{ObjectDef, ObjectId, ResourcePath, Value};

use crate::error::StoreError;
use crate::events::{ChangeSet, ChangeStream, EVENT_CHANNEL_CAPACITY};
use crate::traits::{StoreClient, StoreServer};

/// Client id the [`StoreClient`] side of the store operates on.
pub const LOCAL_CLIENT: &str = "self";

#[derive(Default)]
struct ClientState {
    present: bool,
    instances: HashSet<ResourcePath>,
    values: HashMap<ResourcePath, Value>,
}

impl ClientState {
    fn has_path(&self, path: &ResourcePath) -> bool {
        self.instances.contains(path)
            || self.instances.iter().any(|p| path.covers(p))
            || self.values.keys().any(|p| path.covers(p))
    }
}

struct Watcher {
    client: String,
    watch: ResourcePath,
    tx: mpsc::Sender<ChangeSet>,
}

#[derive(Default)]
struct Inner {
    defined: HashSet<ObjectId>,
    clients: HashMap<String, ClientState>,
    watchers: Vec<Watcher>,
    write_ops: usize,
    fail_writes: bool,
    fail_reads: bool,
}

/// Shared in-memory object store implementing both session traits.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let store = Self {
            inner: Arc::new(Mutex::new(Inner::default())),
        };
        store.add_client(LOCAL_CLIENT);
        store
    }

    /// Register a client as present in the fabric.
    pub fn add_client(&self, id: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.clients.entry(id.to_string()).or_default().present = true;
    }

    /// Toggle a client's presence without discarding its state.
    pub fn set_present(&self, id: &str, present: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.clients.entry(id.to_string()).or_default().present = present;
    }

    /// Push values onto a client as the cloud would, firing change
    /// notifications. Bypasses fault injection and the write counter.
    pub fn push(&self, client: &str, writes: &[(ResourcePath, Value)]) {
        let mut inner = self.inner.lock().unwrap();
        apply_writes(&mut inner, client, writes, None);
        notify(&mut inner, client, writes);
    }

    /// Create an object instance on a client without firing notifications.
    pub fn seed_instance(&self, client: &str, path: ResourcePath) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .clients
            .entry(client.to_string())
            .or_default()
            .instances
            .insert(path);
    }

    /// The value currently stored at a client path, for assertions.
    pub fn value(&self, client: &str, path: &ResourcePath) -> Option<Value> {
        let inner = self.inner.lock().unwrap();
        inner.clients.get(client)?.values.get(path).cloned()
    }

    /// Number of write batches performed through the session traits.
    pub fn write_ops(&self) -> usize {
        self.inner.lock().unwrap().write_ops
    }

    /// Whether an object schema has been defined.
    pub fn is_defined(&self, id: ObjectId) -> bool {
        self.inner.lock().unwrap().defined.contains(&id)
    }

    /// Make subsequent trait writes fail with a transport error.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_writes = fail;
    }

    /// Make subsequent trait reads fail with a transport error.
    pub fn fail_reads(&self, fail: bool) {
        self.inner.lock().unwrap().fail_reads = fail;
    }

    fn write_internal(
        &self,
        client: &str,
        writes: &[(ResourcePath, Value)],
        create: Option<&ResourcePath>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(StoreError::Transport("injected write failure".into()));
        }
        if !inner.clients.contains_key(client) {
            return Err(StoreError::UnknownClient(client.to_string()));
        }
        inner.write_ops += 1;
        apply_writes(&mut inner, client, writes, create);
        notify(&mut inner, client, writes);
        Ok(())
    }

    fn read_internal(&self, client: &str, path: &ResourcePath) -> Result<Value, StoreError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_reads {
            return Err(StoreError::Transport("injected read failure".into()));
        }
        let state = inner
            .clients
            .get(client)
            .ok_or_else(|| StoreError::UnknownClient(client.to_string()))?;
        state
            .values
            .get(path)
            .cloned()
            .ok_or(StoreError::PathNotFound(*path))
    }

    fn watch_internal(&self, client: &str, path: &ResourcePath) -> Result<ChangeStream, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.clients.contains_key(client) {
            return Err(StoreError::UnknownClient(client.to_string()));
        }
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        inner.watchers.push(Watcher {
            client: client.to_string(),
            watch: *path,
            tx,
        });
        Ok(ChangeStream::new(*path, rx))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_writes(
    inner: &mut Inner,
    client: &str,
    writes: &[(ResourcePath, Value)],
    create: Option<&ResourcePath>,
) {
    let state = inner.clients.entry(client.to_string()).or_default();
    if let Some(instance) = create {
        state.instances.insert(*instance);
    }
    for (path, value) in writes {
        if let (Some(instance), Some(_)) = (path.instance, path.resource) {
            state
                .instances
                .insert(ResourcePath::instance(path.object, instance));
        }
        state.values.insert(*path, value.clone());
    }
}

/// Deliver one change set per watcher covering any of the written paths.
fn notify(inner: &mut Inner, client: &str, writes: &[(ResourcePath, Value)]) {
    inner.watchers.retain(|watcher| {
        if watcher.client != client {
            return true;
        }
        let covered: ChangeSet = writes
            .iter()
            .filter(|(path, _)| watcher.watch.covers(path))
            .map(|(path, value)| (*path, value.clone()))
            .collect();
        if covered.is_empty() {
            return true;
        }
        match watcher.tx.try_send(covered) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(watch = %watcher.watch, "change event dropped: channel full");
                true
            }
            // Stream dropped: the subscription is cancelled.
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    });
}

impl StoreClient for MemoryStore {
    async fn define_object(&self, object: &ObjectDef) -> Result<(), StoreError> {
        self.inner.lock().unwrap().defined.insert(object.id);
        Ok(())
    }

    async fn instance_exists(&self, path: &ResourcePath) -> Result<bool, StoreError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_reads {
            return Err(StoreError::Transport("injected read failure".into()));
        }
        Ok(inner
            .clients
            .get(LOCAL_CLIENT)
            .is_some_and(|state| state.has_path(path)))
    }

    async fn read(&self, path: &ResourcePath) -> Result<Value, StoreError> {
        self.read_internal(LOCAL_CLIENT, path)
    }

    async fn write_batch(
        &self,
        writes: &[(ResourcePath, Value)],
        create: Option<&ResourcePath>,
    ) -> Result<(), StoreError> {
        self.write_internal(LOCAL_CLIENT, writes, create)
    }

    async fn subscribe(&self, path: &ResourcePath) -> Result<ChangeStream, StoreError> {
        self.watch_internal(LOCAL_CLIENT, path)
    }
}

impl StoreServer for MemoryStore {
    async fn define_object(&self, object: &ObjectDef) -> Result<(), StoreError> {
        self.inner.lock().unwrap().defined.insert(object.id);
        Ok(())
    }

    async fn list_clients(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut clients: Vec<String> = inner
            .clients
            .iter()
            .filter(|(id, state)| state.present && id.as_str() != LOCAL_CLIENT)
            .map(|(id, _)| id.clone())
            .collect();
        clients.sort();
        Ok(clients)
    }

    async fn client_has_path(&self, client: &str, path: &ResourcePath) -> Result<bool, StoreError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_reads {
            return Err(StoreError::Transport("injected read failure".into()));
        }
        Ok(inner
            .clients
            .get(client)
            .is_some_and(|state| state.present && state.has_path(path)))
    }

    async fn read(&self, client: &str, path: &ResourcePath) -> Result<Value, StoreError> {
        self.read_internal(client, path)
    }

    async fn write_batch(
        &self,
        client: &str,
        writes: &[(ResourcePath, Value)],
        create: Option<&ResourcePath>,
    ) -> Result<(), StoreError> {
        self.write_internal(client, writes, create)
    }

    async fn observe(&self, client: &str, path: &ResourcePath) -> Result<ChangeStream, StoreError> {
        self.watch_internal(client, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quilt_core::schema::{ACCESS_OBJECT, ACCESS_OBJECT_ID, IDENTITY_OBJECT_ID, access, identity};

    fn url_path() -> ResourcePath {
        ResourcePath::resource(ACCESS_OBJECT_ID, 0, access::URL)
    }

    fn fcap_path() -> ResourcePath {
        ResourcePath::resource(IDENTITY_OBJECT_ID, 0, identity::FCAP)
    }

    #[tokio::test]
    async fn define_is_idempotent() {
        let store = MemoryStore::new();
        StoreClient::define_object(&store, &ACCESS_OBJECT).await.unwrap();
        StoreClient::define_object(&store, &ACCESS_OBJECT).await.unwrap();
        assert!(store.is_defined(ACCESS_OBJECT_ID));
    }

    #[tokio::test]
    async fn write_creates_instance_and_read_returns_value() {
        let store = MemoryStore::new();
        StoreClient::write_batch(
            &store,
            &[(fcap_path(), Value::from("FCAP-123"))],
            Some(&ResourcePath::instance(IDENTITY_OBJECT_ID, 0)),
        )
        .await
        .unwrap();

        assert!(
            store
                .instance_exists(&ResourcePath::instance(IDENTITY_OBJECT_ID, 0))
                .await
                .unwrap()
        );
        let value = StoreClient::read(&store, &fcap_path()).await.unwrap();
        assert_eq!(value.as_text(), Some("FCAP-123"));
        assert_eq!(store.write_ops(), 1);
    }

    #[tokio::test]
    async fn missing_path_errors() {
        let store = MemoryStore::new();
        let err = StoreClient::read(&store, &fcap_path()).await.unwrap_err();
        assert!(matches!(err, StoreError::PathNotFound(_)));
    }

    #[tokio::test]
    async fn object_watch_sees_resource_writes() {
        let store = MemoryStore::new();
        let mut stream = store
            .subscribe(&ResourcePath::object(ACCESS_OBJECT_ID))
            .await
            .unwrap();

        store.push(LOCAL_CLIENT, &[(url_path(), Value::from("https://cloud"))]);

        let change = stream.recv().await.unwrap();
        assert_eq!(
            change.get(&url_path()).and_then(|v| v.as_text()),
            Some("https://cloud")
        );
    }

    #[tokio::test]
    async fn watch_ignores_unrelated_writes() {
        let store = MemoryStore::new();
        let mut stream = store
            .subscribe(&ResourcePath::object(ACCESS_OBJECT_ID))
            .await
            .unwrap();

        // Identity write must not reach an access watcher.
        store.push(LOCAL_CLIENT, &[(fcap_path(), Value::from("FCAP"))]);
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn dropped_stream_cancels_subscription() {
        let store = MemoryStore::new();
        let stream = store
            .subscribe(&ResourcePath::object(ACCESS_OBJECT_ID))
            .await
            .unwrap();
        drop(stream);

        // The next matching push prunes the dead watcher.
        store.push(LOCAL_CLIENT, &[(url_path(), Value::from("x"))]);
        assert!(store.inner.lock().unwrap().watchers.is_empty());
    }

    #[tokio::test]
    async fn server_side_presence_and_listing() {
        let store = MemoryStore::new();
        store.add_client("dev-1");
        store.add_client("dev-2");
        store.set_present("dev-2", false);

        assert_eq!(store.list_clients().await.unwrap(), vec!["dev-1"]);
        assert!(
            !store
                .client_has_path("dev-2", &ResourcePath::instance(IDENTITY_OBJECT_ID, 0))
                .await
                .unwrap()
        );

        let err = StoreServer::read(&store, "ghost", &url_path())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownClient(_)));
    }

    #[tokio::test]
    async fn fault_injection_fails_trait_writes_only() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let err = StoreClient::write_batch(&store, &[(fcap_path(), Value::from("x"))], None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
        assert_eq!(store.write_ops(), 0);

        // Pushes bypass injection.
        store.push(LOCAL_CLIENT, &[(fcap_path(), Value::from("y"))]);
        assert_eq!(
            store.value(LOCAL_CLIENT, &fcap_path()).unwrap().as_text(),
            Some("y")
        );
    }
}
