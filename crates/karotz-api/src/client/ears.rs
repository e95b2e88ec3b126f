// Ears and audio player
//
// The firmware multiplexes ear movement and the audio player on one
// endpoint; the body shape selects the action.

use serde_json::Value;
use tracing::debug;

use crate::client::DeviceClient;
use crate::error::Error;
use crate::models::{
    AudioCommand, EarsCommand, EarsModeBody, EarsResetBody, StopAudioBody, VolumeBody,
};

impl DeviceClient {
    /// Ear positions and audio player state.
    ///
    /// `GET {ears}`
    pub async fn get_ears(&self) -> Result<Value, Error> {
        self.get(&self.endpoints().ears).await
    }

    /// `POST {ears}` with `{"volume": n}`
    pub async fn set_volume(&self, volume: u8) -> Result<Value, Error> {
        debug!(volume, "setting volume");
        self.post(&self.endpoints().ears, &VolumeBody { volume }).await
    }

    /// `POST {ears}` with `{"source", "category"?, "volume"?}`
    pub async fn play_audio(&self, command: &AudioCommand) -> Result<Value, Error> {
        debug!(source = %command.source, "playing audio");
        self.post(&self.endpoints().ears, command).await
    }

    /// Stop playback, of one source or of whatever is playing.
    ///
    /// `POST {ears}` with `{"source"?}`
    pub async fn stop_audio(&self, source: Option<&str>) -> Result<Value, Error> {
        debug!(?source, "stopping audio");
        self.post(&self.endpoints().ears, &StopAudioBody { source }).await
    }

    /// `POST {ears}` with `{"left"?, "right"?}`
    pub async fn move_ears(&self, command: EarsCommand) -> Result<Value, Error> {
        debug!(?command, "moving ears");
        self.post(&self.endpoints().ears, &command).await
    }

    /// `POST {ears}` with `{"mode": ...}`
    pub async fn ears_mode(&self, mode: &str) -> Result<Value, Error> {
        debug!(mode, "setting ears mode");
        self.post(&self.endpoints().ears, &EarsModeBody { mode }).await
    }

    /// Return both ears to their rest position.
    ///
    /// `POST {ears}` with `{"reset": true}`
    pub async fn ears_reset(&self) -> Result<Value, Error> {
        debug!("resetting ears");
        self.post(&self.endpoints().ears, &EarsResetBody { reset: true }).await
    }
}
