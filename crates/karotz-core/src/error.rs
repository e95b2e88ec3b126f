// ── Core error types ──
//
// Errors surfaced by karotz-core. Transport-level detail (raw bodies,
// reqwest internals) stays in karotz-api; `From<karotz_api::Error>` folds
// those into the variants below.

use std::collections::BTreeMap;

use karotz_api::Resource;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to device: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Device disconnected")]
    Disconnected,

    #[error("Device did not answer within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Poll errors ──────────────────────────────────────────────────
    /// Every configured read failed in one cycle; nothing was published.
    #[error("Poll cycle failed: all {} reads failed", .errors.len())]
    UpdateFailed { errors: BTreeMap<Resource, String> },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors ───────────────────────────────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<karotz_api::Error> for CoreError {
    fn from(err: karotz_api::Error) -> Self {
        use karotz_api::Error as Api;

        match err {
            Api::Connection { message } => CoreError::ConnectionFailed { reason: message },
            Api::WebSocket(reason) => CoreError::ConnectionFailed {
                reason: format!("event channel: {reason}"),
            },
            Api::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            Api::NotConnected => CoreError::Disconnected,
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid device address: {e}"),
            },
            Api::ClientBuild(message) | Api::Encode(message) => CoreError::Internal(message),
            Api::Authentication { message } => CoreError::AuthenticationFailed { message },
            Api::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            Api::Decode { message, body: _ } => CoreError::Api {
                message: format!("Invalid response: {message}"),
                status: None,
            },
        }
    }
}
