// Latest published snapshot, shared between the collector and HTTP handlers

use crate::models::Snapshot;
use arc_swap::ArcSwap;
use std::sync::Arc;
use tokio::sync::watch;

/// Holds one immutable [`Snapshot`] at a time. Publishing swaps the whole
/// `Arc`, so readers get either the previous or the new snapshot, never a mix.
/// Reads take no lock.
#[derive(Clone)]
pub struct SnapshotStore {
    current: Arc<ArcSwap<Snapshot>>,
    /// Publish count, for callers that wait on the next snapshot.
    published: Arc<watch::Sender<u64>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Starts out with an empty snapshot so early reads return no data.
    pub fn new() -> Self {
        let (published, _) = watch::channel(0);
        Self {
            current: Arc::new(ArcSwap::from_pointee(Snapshot::new())),
            published: Arc::new(published),
        }
    }

    pub fn publish(&self, snapshot: Arc<Snapshot>) {
        self.current.store(snapshot);
        self.published.send_modify(|count| *count += 1);
    }

    /// The most recently published snapshot. Never waits on collection.
    pub fn read(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Receiver notified after every publish; the value is the publish count.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.published.subscribe()
    }
}
