// Endpoint map
//
// Every path the client talks to lives here, so firmware builds with a
// different CGI layout can be targeted from configuration alone.

use serde::{Deserialize, Serialize};

/// Request paths, relative to the device base URL.
///
/// Deserializes from a partial table: fields that are not given keep their
/// `cgi-bin` default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointMap {
    // ── Polled resources ─────────────────────────────────────────────
    pub info: String,
    pub state: String,
    pub leds: String,
    pub ears: String,
    pub rfid: String,
    pub tts: String,
    pub pictures: String,
    pub sounds: String,
    pub apps: String,

    // ── Push channel ─────────────────────────────────────────────────
    pub events: String,

    // ── System ───────────────────────────────────────────────────────
    pub version: String,
    pub wakeup: String,
    pub sleep: String,
    pub clear_cache: String,
    pub clear_snapshots: String,
    pub take_snapshot: String,

    // ── RFID management ──────────────────────────────────────────────
    pub rfid_start_record: String,
    pub rfid_stop_record: String,
    pub rfid_delete: String,
    pub rfid_unassign: String,
    pub rfid_assign: String,

    // ── Streaming ────────────────────────────────────────────────────
    pub play_stream: String,
    pub pause: String,
    pub squeezebox_start: String,
    pub squeezebox_stop: String,
}

fn cgi(name: &str) -> String {
    format!("/cgi-bin/{name}")
}

impl Default for EndpointMap {
    fn default() -> Self {
        Self {
            info: cgi("status"),
            state: cgi("status"),
            leds: cgi("leds"),
            ears: cgi("ears"),
            rfid: cgi("rfid"),
            tts: cgi("tts"),
            pictures: cgi("pictures"),
            sounds: cgi("sounds"),
            apps: cgi("moods"),
            events: "/ws".into(),
            version: cgi("get_version"),
            wakeup: cgi("wakeup"),
            sleep: cgi("sleep"),
            clear_cache: cgi("clear_cache"),
            clear_snapshots: cgi("clear_snapshots"),
            take_snapshot: cgi("take_snapshot"),
            rfid_start_record: cgi("rfid_start_record"),
            rfid_stop_record: cgi("rfid_stop_record"),
            rfid_delete: cgi("rfid_delete"),
            rfid_unassign: cgi("rfid_unassign"),
            rfid_assign: cgi("rfid_assign_url"),
            play_stream: cgi("play_stream"),
            pause: cgi("pause"),
            squeezebox_start: cgi("squeezebox_start"),
            squeezebox_stop: cgi("squeezebox_stop"),
        }
    }
}
