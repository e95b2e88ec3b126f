// Single point of HTTP execution against the device.
//
// One `reqwest::Client` acts as the session. It is swapped in on connect and
// out on disconnect; concurrent requests share it read-only.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::Error;

pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Query string pairs appended to a request.
pub type Query<'a> = &'a [(&'a str, String)];

/// Where the device lives and how long we are willing to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub host: String,
    pub port: u16,
    /// Applied to the whole request, connect through body read.
    pub timeout: Duration,
}

impl TransportConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// `http://{host}:{port}/`
    pub fn base_url(&self) -> Result<Url, Error> {
        Ok(Url::parse(&format!("http://{}:{}/", self.host, self.port))?)
    }

    /// `ws://{host}:{port}{path}`
    pub fn ws_url(&self, path: &str) -> Result<Url, Error> {
        let base = Url::parse(&format!("ws://{}:{}/", self.host, self.port))?;
        Ok(base.join(path)?)
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("karotz/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}

/// Owns the device session.
pub struct Transport {
    config: TransportConfig,
    base_url: Url,
    probe_path: String,
    session: ArcSwapOption<reqwest::Client>,
}

impl Transport {
    /// Create a disconnected transport. `probe_path` is the lightweight
    /// endpoint fetched by [`connect`](Self::connect) to prove reachability.
    pub fn new(config: TransportConfig, probe_path: impl Into<String>) -> Result<Self, Error> {
        let base_url = config.base_url()?;
        Ok(Self {
            config,
            base_url,
            probe_path: probe_path.into(),
            session: ArcSwapOption::empty(),
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn is_connected(&self) -> bool {
        self.session.load().is_some()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Open a session and probe the device. The transport is only marked
    /// connected once the probe succeeded; on failure the fresh session is
    /// discarded and the error returned as-is.
    pub async fn connect(&self) -> Result<(), Error> {
        let http = self.config.build_client()?;

        if let Err(e) = self
            .execute(&http, Method::GET, &self.probe_path, None, None)
            .await
        {
            warn!(url = %self.base_url, error = %e, "device probe failed");
            return Err(e);
        }

        self.session.store(Some(Arc::new(http)));
        info!(url = %self.base_url, "connected to device");
        Ok(())
    }

    /// Release the session. Safe to call any number of times.
    pub fn disconnect(&self) {
        if self.session.swap(None).is_some() {
            info!(url = %self.base_url, "disconnected from device");
        }
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Issue a request over the open session.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: Option<Query<'_>>,
    ) -> Result<Value, Error> {
        let http = self.session.load_full().ok_or(Error::NotConnected)?;
        self.execute(&http, method, path, body, query).await
    }

    /// Issue a request that is allowed before the session is open.
    ///
    /// Uses the live session when there is one, otherwise a throwaway client
    /// with the same timeout.
    pub async fn probe(
        &self,
        method: Method,
        path: &str,
        query: Option<Query<'_>>,
    ) -> Result<Value, Error> {
        let http = match self.session.load_full() {
            Some(http) => http,
            None => Arc::new(self.config.build_client()?),
        };
        self.execute(&http, method, path, None, query).await
    }

    async fn execute(
        &self,
        http: &reqwest::Client,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: Option<Query<'_>>,
    ) -> Result<Value, Error> {
        let url = self.base_url.join(path)?;
        debug!("{} {}", method, url);

        let mut builder = http.request(method, url);
        if let Some(query) = query {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let timeout_secs = self.config.timeout.as_secs();
        let resp = builder
            .send()
            .await
            .map_err(|e| Error::from_reqwest(&e, timeout_secs))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::from_reqwest(&e, timeout_secs))?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "device rejected the request".into(),
            });
        }

        if !status.is_success() {
            let message = if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("unexpected status").to_owned()
            } else {
                text.trim().to_owned()
            };
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| Error::Decode {
            message: e.to_string(),
            body: text,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_includes_port() {
        let mut config = TransportConfig::new("192.168.1.201");
        config.port = 8080;
        assert_eq!(config.base_url().unwrap().as_str(), "http://192.168.1.201:8080/");
    }

    #[test]
    fn ws_url_joins_path() {
        let mut config = TransportConfig::new("karotz.local");
        assert_eq!(config.ws_url("/ws").unwrap().as_str(), "ws://karotz.local/ws");

        config.port = 8080;
        assert_eq!(config.ws_url("/ws").unwrap().as_str(), "ws://karotz.local:8080/ws");
    }

    #[test]
    fn defaults_match_device_firmware() {
        let config = TransportConfig::new("h");
        assert_eq!(config.port, 80);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn request_without_session_is_rejected() {
        let transport =
            Transport::new(TransportConfig::new("127.0.0.1"), "/cgi-bin/status").unwrap();
        let err = transport
            .request(Method::GET, "/cgi-bin/leds", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotConnected));
    }

    #[test]
    fn disconnect_is_idempotent() {
        let transport =
            Transport::new(TransportConfig::new("127.0.0.1"), "/cgi-bin/status").unwrap();
        transport.disconnect();
        transport.disconnect();
        assert!(!transport.is_connected());
    }
}
