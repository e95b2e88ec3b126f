// ── Command API ──
//
// Every write to the device flows through `Command`. The device routes each
// variant to one client call; optional fields are forwarded only when set.

use karotz_api::{AudioCommand, DeviceClient, EarsCommand, LedCommand, TtsCommand};
use serde_json::Value;

use crate::error::CoreError;

const MAX_LEVEL: u8 = 100;

/// A command plus the channel its result goes back on.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<Value, CoreError>>,
}

/// All write operations against an OpenKarotz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ── LEDs / speech ────────────────────────────────────────────────
    SetLed(LedCommand),
    PlayTts(TtsCommand),

    // ── Ears / audio ─────────────────────────────────────────────────
    PlayAudio(AudioCommand),
    StopAudio { source: Option<String> },
    SetVolume { volume: u8 },
    MoveEars(EarsCommand),
    EarsMode { mode: String },
    EarsReset,

    // ── Pictures / sounds ────────────────────────────────────────────
    DisplayPicture { picture: String, duration: Option<u32> },
    PlaySound { sound: String, volume: Option<u8> },

    // ── RFID ─────────────────────────────────────────────────────────
    TriggerRfid { rfid_id: String, action: Option<String> },
    RfidStartRecord,
    RfidStopRecord,
    RfidDelete { tag: String },
    RfidUnassign { tag: String },
    RfidAssignUrl { tag: String, url: String, name: Option<String> },

    // ── System ───────────────────────────────────────────────────────
    Wakeup { silent: bool },
    Sleep,
    TakeSnapshot { silent: Option<bool> },
    ClearSnapshots,
    ClearCache,

    // ── Streaming ────────────────────────────────────────────────────
    PlayStream { url: String },
    Pause,
    SqueezeboxStart,
    SqueezeboxStop,
}

impl Command {
    /// Reject levels the device would clamp or misread.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::SetLed(led) => check_level("brightness", led.brightness),
            Self::PlayAudio(audio) => check_level("volume", audio.volume),
            Self::SetVolume { volume } => check_level("volume", Some(*volume)),
            Self::PlaySound { volume, .. } => check_level("volume", *volume),
            _ => Ok(()),
        }
    }

    /// Commands the device accepts before a session is open.
    pub fn is_probe(&self) -> bool {
        matches!(self, Self::Wakeup { .. } | Self::Sleep)
    }
}

fn check_level(field: &str, value: Option<u8>) -> Result<(), CoreError> {
    match value {
        Some(v) if v > MAX_LEVEL => Err(CoreError::ValidationFailed {
            message: format!("{field} must be between 0 and {MAX_LEVEL}, got {v}"),
        }),
        _ => Ok(()),
    }
}

/// Issue `command` on `client`.
pub(crate) async fn route(client: &DeviceClient, command: Command) -> Result<Value, CoreError> {
    let response = match command {
        Command::SetLed(led) => client.set_led(&led).await?,
        Command::PlayTts(tts) => client.play_tts(&tts).await?,

        Command::PlayAudio(audio) => client.play_audio(&audio).await?,
        Command::StopAudio { source } => client.stop_audio(source.as_deref()).await?,
        Command::SetVolume { volume } => client.set_volume(volume).await?,
        Command::MoveEars(ears) => client.move_ears(ears).await?,
        Command::EarsMode { mode } => client.ears_mode(&mode).await?,
        Command::EarsReset => client.ears_reset().await?,

        Command::DisplayPicture { picture, duration } => {
            client.display_picture(&picture, duration).await?
        }
        Command::PlaySound { sound, volume } => client.play_sound(&sound, volume).await?,

        Command::TriggerRfid { rfid_id, action } => {
            client.trigger_rfid(&rfid_id, action.as_deref()).await?
        }
        Command::RfidStartRecord => client.rfid_start_record().await?,
        Command::RfidStopRecord => client.rfid_stop_record().await?,
        Command::RfidDelete { tag } => client.rfid_delete(&tag).await?,
        Command::RfidUnassign { tag } => client.rfid_unassign(&tag).await?,
        Command::RfidAssignUrl { tag, url, name } => {
            client.rfid_assign_url(&tag, &url, name.as_deref()).await?
        }

        Command::Wakeup { silent } => client.wakeup(silent).await?,
        Command::Sleep => client.sleep().await?,
        Command::TakeSnapshot { silent } => client.take_snapshot(silent).await?,
        Command::ClearSnapshots => client.clear_snapshots().await?,
        Command::ClearCache => client.clear_cache().await?,

        Command::PlayStream { url } => client.play_stream(&url).await?,
        Command::Pause => client.pause().await?,
        Command::SqueezeboxStart => client.squeezebox_start().await?,
        Command::SqueezeboxStop => client.squeezebox_stop().await?,
    };
    Ok(response)
}
