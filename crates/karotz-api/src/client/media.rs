// Pictures, sounds and streaming

use serde_json::Value;
use tracing::debug;

use crate::client::DeviceClient;
use crate::error::Error;
use crate::models::{PictureBody, SoundBody};

impl DeviceClient {
    /// `GET {pictures}`
    pub async fn get_pictures(&self) -> Result<Value, Error> {
        self.get(&self.endpoints().pictures).await
    }

    /// Show a picture, for `duration` seconds if given.
    ///
    /// `POST {pictures}`
    pub async fn display_picture(
        &self,
        picture: &str,
        duration: Option<u32>,
    ) -> Result<Value, Error> {
        debug!(picture, ?duration, "displaying picture");
        self.post(&self.endpoints().pictures, &PictureBody { picture, duration }).await
    }

    /// `GET {sounds}`
    pub async fn get_sounds(&self) -> Result<Value, Error> {
        self.get(&self.endpoints().sounds).await
    }

    /// `POST {sounds}`
    pub async fn play_sound(&self, sound: &str, volume: Option<u8>) -> Result<Value, Error> {
        debug!(sound, ?volume, "playing sound");
        self.post(&self.endpoints().sounds, &SoundBody { sound, volume }).await
    }

    /// Play an internet radio or other stream URL.
    ///
    /// `GET {play_stream}?url=...`
    pub async fn play_stream(&self, url: &str) -> Result<Value, Error> {
        debug!(url, "playing stream");
        self.get_with(&self.endpoints().play_stream, &[("url", url.to_owned())]).await
    }

    /// Pause or resume the current stream.
    ///
    /// `GET {pause}`
    pub async fn pause(&self) -> Result<Value, Error> {
        self.get(&self.endpoints().pause).await
    }

    /// `GET {squeezebox_start}`
    pub async fn squeezebox_start(&self) -> Result<Value, Error> {
        debug!("starting squeezebox client");
        self.get(&self.endpoints().squeezebox_start).await
    }

    /// `GET {squeezebox_stop}`
    pub async fn squeezebox_stop(&self) -> Result<Value, Error> {
        debug!("stopping squeezebox client");
        self.get(&self.endpoints().squeezebox_stop).await
    }
}
