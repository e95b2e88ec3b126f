use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use karotz_api::{DeviceInfo, Resource};
use serde::Serialize;
use serde_json::Value;
use strum::Display;

use super::DeviceDescriptor;

/// Health of the last poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionStatus {
    /// Every read succeeded.
    Connected,
    /// Some reads failed; their last-known payloads are still served.
    Degraded,
    /// Every read failed.
    Unavailable,
}

/// One immutable, aggregated view of the polled resources.
///
/// A resource that failed in the cycle keeps the payload from the last
/// cycle where it succeeded (if any) and has an entry in `errors`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Strictly increasing across publishes.
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub status: ConnectionStatus,
    pub payloads: BTreeMap<Resource, Value>,
    pub errors: BTreeMap<Resource, String>,
}

impl Snapshot {
    /// `false` exactly when this cycle's read of `resource` failed.
    pub fn is_fresh(&self, resource: Resource) -> bool {
        !self.errors.contains_key(&resource)
    }

    pub fn get(&self, resource: Resource) -> Option<&Value> {
        self.payloads.get(&resource)
    }

    /// The info payload, decoded. `None` until an info read has succeeded.
    pub fn info(&self) -> Option<DeviceInfo> {
        self.get(Resource::Info)
            .and_then(|raw| serde_json::from_value(raw.clone()).ok())
    }

    pub fn descriptor(&self) -> Option<DeviceDescriptor> {
        self.info().map(DeviceDescriptor::from)
    }
}

/// Announced after every poll cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PollUpdate {
    /// A new snapshot was published.
    Snapshot(Arc<Snapshot>),
    /// Every read failed; the previous snapshot stays current.
    Failed {
        at: DateTime<Utc>,
        errors: BTreeMap<Resource, String>,
    },
}

impl PollUpdate {
    pub fn status(&self) -> ConnectionStatus {
        match self {
            Self::Snapshot(snapshot) => snapshot.status,
            Self::Failed { .. } => ConnectionStatus::Unavailable,
        }
    }
}
