// System endpoints
//
// Wake and sleep are probes: a sleeping rabbit still answers them, and the
// host needs them to bring the device up before connecting.

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::client::DeviceClient;
use crate::error::Error;

fn flag(on: bool) -> String {
    let value = if on { "1" } else { "0" };
    value.to_owned()
}

impl DeviceClient {
    /// `GET {wakeup}?silent=1|0`
    pub async fn wakeup(&self, silent: bool) -> Result<Value, Error> {
        debug!(silent, "waking device");
        self.transport()
            .probe(
                Method::GET,
                &self.endpoints().wakeup,
                Some(&[("silent", flag(silent))][..]),
            )
            .await
    }

    /// `GET {sleep}`
    pub async fn sleep(&self) -> Result<Value, Error> {
        debug!("putting device to sleep");
        self.transport()
            .probe(Method::GET, &self.endpoints().sleep, None)
            .await
    }

    /// Take a picture with the webcam.
    ///
    /// `GET {take_snapshot}[?silent=1|0]`
    pub async fn take_snapshot(&self, silent: Option<bool>) -> Result<Value, Error> {
        debug!(?silent, "taking snapshot");
        let path = &self.endpoints().take_snapshot;
        match silent {
            Some(silent) => self.get_with(path, &[("silent", flag(silent))]).await,
            None => self.get(path).await,
        }
    }

    pub async fn clear_snapshots(&self) -> Result<Value, Error> {
        debug!("clearing snapshots");
        self.get(&self.endpoints().clear_snapshots).await
    }

    /// Drop cached TTS audio.
    pub async fn clear_cache(&self) -> Result<Value, Error> {
        debug!("clearing cache");
        self.get(&self.endpoints().clear_cache).await
    }
}
