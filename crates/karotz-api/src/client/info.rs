// Identity and firmware
//
// Both are probes: they may be issued before `connect()` so a caller can
// check that a host really is an OpenKarotz.

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::client::DeviceClient;
use crate::error::Error;
use crate::models::DeviceInfo;

impl DeviceClient {
    /// Device identity.
    ///
    /// `GET {info}`
    pub async fn get_info(&self) -> Result<DeviceInfo, Error> {
        let raw = self.get_info_raw().await?;
        serde_json::from_value(raw.clone()).map_err(|e| Error::Decode {
            message: e.to_string(),
            body: raw.to_string(),
        })
    }

    /// Device identity as the device sent it.
    pub async fn get_info_raw(&self) -> Result<Value, Error> {
        debug!("fetching device info");
        self.transport()
            .probe(Method::GET, &self.endpoints().info, None)
            .await
    }

    /// Firmware version.
    ///
    /// `GET {version}`
    pub async fn get_version(&self) -> Result<Value, Error> {
        debug!("fetching firmware version");
        self.transport()
            .probe(Method::GET, &self.endpoints().version, None)
            .await
    }

    /// Overall device state.
    ///
    /// `GET {state}`
    pub async fn get_state(&self) -> Result<Value, Error> {
        self.get(&self.endpoints().state).await
    }

    /// Installed applications.
    ///
    /// `GET {apps}`
    pub async fn get_apps(&self) -> Result<Value, Error> {
        self.get(&self.endpoints().apps).await
    }
}
