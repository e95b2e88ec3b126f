// Text-to-speech endpoints

use serde_json::Value;
use tracing::debug;

use crate::client::DeviceClient;
use crate::error::Error;
use crate::models::TtsCommand;

impl DeviceClient {
    /// `GET {tts}`
    pub async fn get_tts(&self) -> Result<Value, Error> {
        self.get(&self.endpoints().tts).await
    }

    /// Speak `command.text`, with voice and category only if given.
    ///
    /// `POST {tts}`
    pub async fn play_tts(&self, command: &TtsCommand) -> Result<Value, Error> {
        debug!(chars = command.text.chars().count(), "speaking");
        self.post(&self.endpoints().tts, command).await
    }
}
