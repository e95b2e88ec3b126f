// ── Aggregating poller ──
//
// One cycle reads every configured resource concurrently, waits for all of
// them, merges the results over the previous snapshot and publishes the
// merge as a single new snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use karotz_api::{DeviceClient, Resource};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{ConnectionStatus, PollUpdate, Snapshot};
use crate::store::SnapshotStore;

pub struct Poller {
    client: Arc<DeviceClient>,
    resources: Vec<Resource>,
    store: Arc<SnapshotStore>,
    updates: broadcast::Sender<PollUpdate>,
}

impl Poller {
    pub fn new(
        client: Arc<DeviceClient>,
        resources: Vec<Resource>,
        store: Arc<SnapshotStore>,
        updates: broadcast::Sender<PollUpdate>,
    ) -> Self {
        Self {
            client,
            resources,
            store,
            updates,
        }
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Run one poll cycle.
    ///
    /// Per-resource failures are recorded in the snapshot and never fail
    /// the cycle. Only when every read fails is nothing published and
    /// [`CoreError::UpdateFailed`] returned.
    pub async fn run_cycle(&self) -> Result<Arc<Snapshot>, CoreError> {
        let reads = self.resources.iter().map(|&resource| {
            let client = &self.client;
            async move { (resource, client.read(resource).await) }
        });
        let results = join_all(reads).await;

        let previous = self.store.latest();
        let mut payloads = previous
            .as_ref()
            .map(|s| s.payloads.clone())
            .unwrap_or_default();
        let mut errors = BTreeMap::new();

        for (resource, result) in results {
            match result {
                Ok(payload) => {
                    payloads.insert(resource, payload);
                }
                Err(e) => {
                    warn!(%resource, error = %e, "resource read failed");
                    errors.insert(resource, e.to_string());
                }
            }
        }

        if !self.resources.is_empty() && errors.len() == self.resources.len() {
            warn!(failed = errors.len(), "every resource read failed, keeping previous snapshot");
            let _ = self.updates.send(PollUpdate::Failed {
                at: Utc::now(),
                errors: errors.clone(),
            });
            return Err(CoreError::UpdateFailed { errors });
        }

        let status = if errors.is_empty() {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Degraded
        };

        let snapshot = Snapshot {
            sequence: self.store.next_sequence(),
            timestamp: Utc::now(),
            status,
            payloads,
            errors,
        };

        let published = self.store.publish(snapshot).ok_or_else(|| {
            CoreError::Internal("snapshot superseded during publish".into())
        })?;

        debug!(
            sequence = published.sequence,
            %status,
            failed = published.errors.len(),
            "snapshot published"
        );
        let _ = self.updates.send(PollUpdate::Snapshot(Arc::clone(&published)));
        Ok(published)
    }
}
