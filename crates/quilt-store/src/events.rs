//! Change-notification events.
//!
//! A subscription yields a [`ChangeStream`]: a bounded channel of
//! [`ChangeSet`] values, one per notification, awaited with a deadline
//! by the consumer. Dropping the stream cancels the subscription.

use std::collections::HashMap;

use tokio::sync::mpsc;

use quilt_core::{ResourcePath, Value};

/// Capacity of a subscription's event channel. Notifications beyond
/// this while the consumer is not draining are dropped.
pub const EVENT_CHANNEL_CAPACITY: usize = 32;

/// The set of resource values a single change notification carried.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct ChangeSet {
    values: HashMap<ResourcePath, Value>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: ResourcePath, value: Value) {
        self.values.insert(path, value);
    }

    /// The value carried for `path`, if the notification included one.
    pub fn get(&self, path: &ResourcePath) -> Option<&Value> {
        self.values.get(path)
    }

    /// Whether the notification carried a value for `path`.
    pub fn has_value(&self, path: &ResourcePath) -> bool {
        self.values.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourcePath, &Value)> {
        self.values.iter()
    }
}

impl FromIterator<(ResourcePath, Value)> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = (ResourcePath, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// The receiving end of a change subscription.
#[derive(Debug)]
#[must_use]
pub struct ChangeStream {
    path: ResourcePath,
    rx: mpsc::Receiver<ChangeSet>,
}

impl ChangeStream {
    pub fn new(path: ResourcePath, rx: mpsc::Receiver<ChangeSet>) -> Self {
        Self { path, rx }
    }

    /// Create a stream together with its sending half.
    pub fn channel(path: ResourcePath) -> (mpsc::Sender<ChangeSet>, Self) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        (tx, Self::new(path, rx))
    }

    /// The path this subscription watches.
    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    /// Await the next notification. `None` means the subscription was
    /// torn down on the store side.
    pub async fn recv(&mut self) -> Option<ChangeSet> {
        self.rx.recv().await
    }

    /// Take whatever notification is already buffered, without waiting.
    pub fn try_recv(&mut self) -> Option<ChangeSet> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quilt_core::schema::{IDENTITY_OBJECT_ID, identity};

    fn challenge_path() -> ResourcePath {
        ResourcePath::resource(IDENTITY_OBJECT_ID, 0, identity::LICENSEE_CHALLENGE)
    }

    #[test]
    fn change_set_lookup() {
        let mut cs = ChangeSet::new();
        assert!(cs.is_empty());
        cs.insert(challenge_path(), Value::from(vec![1u8, 2, 3]));
        assert_eq!(cs.len(), 1);
        assert!(cs.has_value(&challenge_path()));
        assert_eq!(
            cs.get(&challenge_path()).and_then(|v| v.as_bytes()),
            Some(&[1u8, 2, 3][..])
        );
    }

    #[tokio::test]
    async fn stream_delivers_in_order_and_closes() {
        let (tx, mut stream) = ChangeStream::channel(challenge_path());

        let mut first = ChangeSet::new();
        first.insert(challenge_path(), Value::from(1i64));
        let mut second = ChangeSet::new();
        second.insert(challenge_path(), Value::from(2i64));

        tx.send(first.clone()).await.unwrap();
        tx.send(second.clone()).await.unwrap();
        drop(tx);

        assert_eq!(stream.recv().await, Some(first));
        assert_eq!(stream.recv().await, Some(second));
        assert_eq!(stream.recv().await, None);
    }

    #[tokio::test]
    async fn try_recv_does_not_block() {
        let (tx, mut stream) = ChangeStream::channel(challenge_path());
        assert!(stream.try_recv().is_none());
        tx.send(ChangeSet::new()).await.unwrap();
        assert!(stream.try_recv().is_some());
    }
}
