// ── Snapshot store ──
//
// Holds the latest published snapshot behind a `watch` channel. Readers
// clone an `Arc` and never observe a half-built snapshot.

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::Snapshot;
use crate::stream::SnapshotStream;

pub struct SnapshotStore {
    latest: watch::Sender<Option<Arc<Snapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (latest, _) = watch::channel(None);
        Self { latest }
    }

    /// The last published snapshot, `None` before the first publish.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.latest.borrow().clone()
    }

    /// Sequence number the next publish will carry.
    pub fn next_sequence(&self) -> u64 {
        self.latest.borrow().as_ref().map_or(1, |s| s.sequence + 1)
    }

    /// Replace the current snapshot and wake subscribers.
    ///
    /// Snapshots with a sequence not greater than the current one are
    /// dropped, so publication order always matches sequence order.
    pub fn publish(&self, snapshot: Snapshot) -> Option<Arc<Snapshot>> {
        let snapshot = Arc::new(snapshot);
        let accepted = self.latest.send_if_modified(|current| {
            if current
                .as_ref()
                .is_some_and(|c| c.sequence >= snapshot.sequence)
            {
                return false;
            }
            *current = Some(Arc::clone(&snapshot));
            true
        });
        accepted.then_some(snapshot)
    }

    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.latest.subscribe())
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;

    use super::*;
    use crate::model::ConnectionStatus;

    fn snapshot(sequence: u64) -> Snapshot {
        Snapshot {
            sequence,
            timestamp: Utc::now(),
            status: ConnectionStatus::Connected,
            payloads: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }

    #[test]
    fn starts_empty() {
        let store = SnapshotStore::new();
        assert!(store.latest().is_none());
        assert_eq!(store.next_sequence(), 1);
    }

    #[test]
    fn stale_sequence_is_rejected() {
        let store = SnapshotStore::new();
        assert!(store.publish(snapshot(2)).is_some());
        assert!(store.publish(snapshot(2)).is_none());
        assert!(store.publish(snapshot(1)).is_none());
        assert_eq!(store.next_sequence(), 3);
    }
}
