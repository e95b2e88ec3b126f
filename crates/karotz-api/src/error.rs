use thiserror::Error;

/// Top-level error type for the `karotz-api` crate.
///
/// Every variant folds into one of three failure classes via [`Error::kind`]:
/// the device could not be reached, the device rejected our credentials, or
/// the device answered with something we could not use.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Network failure (connection refused, DNS failure, reset, etc.)
    #[error("Cannot reach device: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// A request was attempted without an open session.
    #[error("Not connected to device")]
    NotConnected,

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Authentication ──────────────────────────────────────────────
    /// The device answered 401.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response other than 401.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body was not valid JSON, with the raw body for debugging.
    #[error("Invalid response format: {message}")]
    Decode { message: String, body: String },

    /// Request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(String),

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket connection failed or dropped with an error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),
}

/// Coarse failure class, used by callers that only care whether the link,
/// the credentials, or the payload was at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Authentication,
    Api,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. }
            | Self::Timeout { .. }
            | Self::NotConnected
            | Self::InvalidUrl(_)
            | Self::ClientBuild(_)
            | Self::WebSocket(_) => ErrorKind::Connection,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Api { .. } | Self::Decode { .. } | Self::Encode(_) => ErrorKind::Api,
        }
    }

    /// Returns `true` if a later attempt might succeed without any change
    /// on our side.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Timeout { .. } | Self::WebSocket(_)
        ) || matches!(self, Self::Api { status, .. } if *status >= 500)
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Authentication { .. } => Some(401),
            _ => None,
        }
    }

    /// Classify a `reqwest` failure that happened before a status was seen.
    pub(crate) fn from_reqwest(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_secs }
        } else {
            Self::Connection {
                message: err.to_string(),
            }
        }
    }
}
