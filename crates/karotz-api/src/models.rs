// Request and response types
//
// Request bodies only carry what the caller set: every optional field is
// skipped when `None`, so the device applies its own defaults. Responses are
// kept as `serde_json::Value` except for the info payload, which feeds the
// device descriptor.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

// ── Resources ────────────────────────────────────────────────────────

/// An independently pollable facet of device state.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Resource {
    Info,
    State,
    Leds,
    Ears,
    Rfid,
    Tts,
    Pictures,
    Sounds,
    Apps,
}

impl Resource {
    /// Stable key used in snapshot maps and configuration.
    pub fn key(self) -> &'static str {
        self.into()
    }
}

// ── Info ─────────────────────────────────────────────────────────────

/// Identity block returned by the info endpoint.
///
/// Firmware builds disagree on which fields they send and on their types,
/// so all of them are optional, numbers and booleans are read as text, and
/// anything unrecognised is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub serial: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wlan_mac: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Scalars become their text form; `null`, arrays and objects become `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

// ── LEDs ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// 0–100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    /// Kelvin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_temperature: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    /// Hex, e.g. `FF0000`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rgb_value: Option<String>,
}

// ── Speech ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TtsCommand {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl TtsCommand {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
            category: None,
        }
    }
}

// ── Ears / audio player ──────────────────────────────────────────────

/// Start playback on the audio player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioCommand {
    pub source: String,
    /// e.g. `alarm`, `notification`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u8>,
}

/// Ear positions. Either side may be left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EarsCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<u8>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StopAudioBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct VolumeBody {
    pub volume: u8,
}

#[derive(Debug, Serialize)]
pub(crate) struct EarsModeBody<'a> {
    pub mode: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct EarsResetBody {
    pub reset: bool,
}

// ── Pictures / sounds ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct PictureBody<'a> {
    pub picture: &'a str,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SoundBody<'a> {
    pub sound: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u8>,
}

// ── RFID ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct RfidTriggerBody<'a> {
    pub rfid_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'a str>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use strum::IntoEnumIterator;

    #[test]
    fn resource_keys_are_lowercase() {
        let keys: Vec<_> = Resource::iter().map(Resource::key).collect();
        assert_eq!(
            keys,
            ["info", "state", "leds", "ears", "rfid", "tts", "pictures", "sounds", "apps"]
        );
        assert_eq!("leds".parse::<Resource>().unwrap(), Resource::Leds);
    }

    #[test]
    fn led_command_omits_unset_fields() {
        let cmd = LedCommand {
            color: Some("red".into()),
            brightness: Some(50),
            ..LedCommand::default()
        };
        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({ "color": "red", "brightness": 50 })
        );
    }

    #[test]
    fn device_info_keeps_unknown_fields() {
        let info: DeviceInfo = serde_json::from_value(json!({
            "name": "Nabaztag",
            "uptime": 1234,
        }))
        .unwrap();
        assert_eq!(info.name.as_deref(), Some("Nabaztag"));
        assert_eq!(info.model, None);
        assert_eq!(info.extra.get("uptime"), Some(&json!(1234)));
    }

    #[test]
    fn device_info_reads_scalar_identity_fields_as_text() {
        let info: DeviceInfo = serde_json::from_value(json!({
            "name": "X",
            "serial": 12345,
            "version": 200,
            "id": true,
            "model": null,
            "wlan_mac": ["00", "11"],
        }))
        .unwrap();
        assert_eq!(info.name.as_deref(), Some("X"));
        assert_eq!(info.serial.as_deref(), Some("12345"));
        assert_eq!(info.version.as_deref(), Some("200"));
        assert_eq!(info.id.as_deref(), Some("true"));
        assert_eq!(info.model, None);
        assert_eq!(info.wlan_mac, None);
    }
}
