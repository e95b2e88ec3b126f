//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help
//! text and a stable process exit code.

use miette::Diagnostic;
use thiserror::Error;

use karotz_config::ConfigError;
use karotz_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the rabbit: {reason}")]
    #[diagnostic(
        code(karotz::connection_failed),
        help(
            "Check that the rabbit is powered on and reachable.\n\
             Try: karotz info --host <address>"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Event channel gave up after {attempts} connection attempts")]
    #[diagnostic(
        code(karotz::events_gave_up),
        help("The firmware may not expose push events. Check the `events` endpoint of the profile.")
    )]
    EventsGaveUp { attempts: u32 },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(karotz::timeout),
        help("Increase the timeout with --timeout or check the rabbit's Wi-Fi signal.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("The rabbit refused the request: {message}")]
    #[diagnostic(code(karotz::auth_failed))]
    AuthFailed { message: String },

    // ── Device ───────────────────────────────────────────────────────
    #[error(
        "Device error{}: {message}",
        .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
    )]
    #[diagnostic(code(karotz::api_error))]
    Api { message: String, status: Option<u16> },

    #[error("{0}")]
    #[diagnostic(
        code(karotz::update_failed),
        help("Every resource read failed. Run with -v to see each error.")
    )]
    UpdateFailed(String),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(karotz::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(karotz::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: karotz config init --device <address> --name {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No device configured")]
    #[diagnostic(
        code(karotz::no_config),
        help(
            "Pass --host <address>, set KAROTZ_HOST, or create a profile with:\n  \
             karotz config init --device <address>\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(karotz::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(karotz::render))]
    Render(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::EventsGaveUp { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => Self::ConnectionFailed { reason },
            CoreError::Disconnected => Self::ConnectionFailed {
                reason: "the session was closed".into(),
            },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Api { message, status } => Self::Api { message, status },
            err @ CoreError::UpdateFailed { .. } => Self::UpdateFailed(err.to_string()),
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Config { message } => Self::Validation {
                field: "device".into(),
                reason: message,
            },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name, available } => {
                Self::ProfileNotFound { name, available }
            }
            other => Self::Config(other),
        }
    }
}
