// Device client
//
// Typed operations over `Transport`. Each operation is one request to one
// path from the endpoint map; nothing is retried here and errors reach the
// caller unchanged. Operations are grouped by device facet in sibling files
// as inherent methods.

mod ears;
mod info;
mod leds;
mod media;
mod rfid;
mod system;
mod tts;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::endpoints::EndpointMap;
use crate::error::Error;
use crate::models::Resource;
use crate::transport::{Query, Transport, TransportConfig};

/// Client for one OpenKarotz device.
pub struct DeviceClient {
    transport: Transport,
    endpoints: EndpointMap,
}

impl DeviceClient {
    /// Create a disconnected client. Call [`connect`](Self::connect) before
    /// issuing anything other than the probe operations.
    pub fn new(config: TransportConfig, endpoints: EndpointMap) -> Result<Self, Error> {
        let transport = Transport::new(config, endpoints.info.clone())?;
        Ok(Self {
            transport,
            endpoints,
        })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn endpoints(&self) -> &EndpointMap {
        &self.endpoints
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub async fn connect(&self) -> Result<(), Error> {
        self.transport.connect().await
    }

    pub fn disconnect(&self) {
        self.transport.disconnect();
    }

    /// Read one polled resource. Every read, info included, needs a
    /// session; the probe variants are for explicit calls only.
    pub async fn read(&self, resource: Resource) -> Result<Value, Error> {
        match resource {
            Resource::Info => self.get(&self.endpoints.info).await,
            Resource::State => self.get_state().await,
            Resource::Leds => self.get_leds().await,
            Resource::Ears => self.get_ears().await,
            Resource::Rfid => self.get_rfid().await,
            Resource::Tts => self.get_tts().await,
            Resource::Pictures => self.get_pictures().await,
            Resource::Sounds => self.get_sounds().await,
            Resource::Apps => self.get_apps().await,
        }
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get(&self, path: &str) -> Result<Value, Error> {
        self.transport.request(Method::GET, path, None, None).await
    }

    pub(crate) async fn get_with(&self, path: &str, query: Query<'_>) -> Result<Value, Error> {
        self.transport
            .request(Method::GET, path, None, Some(query))
            .await
    }

    pub(crate) async fn post(&self, path: &str, body: &impl Serialize) -> Result<Value, Error> {
        let body = serde_json::to_value(body).map_err(|e| Error::Encode(e.to_string()))?;
        self.transport
            .request(Method::POST, path, Some(&body), None)
            .await
    }
}
