// ── Runtime device configuration ──
//
// Describes how to reach and poll one device. Built by the host (the CLI
// reads it from a profile) and handed to `Device`; core never reads files.

use std::time::Duration;

use karotz_api::transport::{DEFAULT_PORT, DEFAULT_TIMEOUT};
use karotz_api::{EndpointMap, ReconnectPolicy, Resource, TransportConfig};
use strum::IntoEnumIterator;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    /// Time between poll cycles. `Duration::ZERO` disables the poll loop.
    pub poll_interval: Duration,
    /// Push channel reconnect budget.
    pub reconnect: ReconnectPolicy,
    /// Open the push event channel on connect.
    pub events_enabled: bool,
    pub endpoints: EndpointMap,
    /// Resources read on every cycle.
    pub resources: Vec<Resource>,
}

impl DeviceConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            reconnect: ReconnectPolicy::default(),
            events_enabled: false,
            endpoints: EndpointMap::default(),
            resources: Resource::iter().collect(),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            host: self.host.clone(),
            port: self.port,
            timeout: self.timeout,
        }
    }
}
