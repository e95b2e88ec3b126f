// LED endpoints

use serde_json::Value;
use tracing::debug;

use crate::client::DeviceClient;
use crate::error::Error;
use crate::models::LedCommand;

impl DeviceClient {
    /// Current LED state.
    ///
    /// `GET {leds}`
    pub async fn get_leds(&self) -> Result<Value, Error> {
        self.get(&self.endpoints().leds).await
    }

    /// Change the LED. Only the fields set on `command` are sent.
    ///
    /// `POST {leds}`
    pub async fn set_led(&self, command: &LedCommand) -> Result<Value, Error> {
        debug!(?command, "setting led");
        self.post(&self.endpoints().leds, command).await
    }
}
