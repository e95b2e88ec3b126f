//! Shared configuration library for OpenKarotz tools.
//!
//! Profiles live in a TOML file under the platform config directory and are
//! layered with `KAROTZ_`-prefixed environment variables through figment.
//! A resolved [`Profile`] becomes a [`karotz_core::DeviceConfig`] through
//! [`profile_to_device_config`]; core never reads this file itself.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use karotz_core::{DeviceConfig, EndpointMap, ReconnectPolicy, Resource};

// ── Error types ─────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found (available: {available})")]
    UnknownProfile { name: String, available: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error(transparent)]
    Figment(Box<figment::Error>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config structs ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: `requested`, else the configured
    /// default, else `"default"`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                name: name.into(),
                available: self.available_profiles(),
            })
    }

    /// Comma-separated profile names, or `(none)`.
    pub fn available_profiles(&self) -> String {
        if self.profiles.is_empty() {
            "(none)".into()
        } else {
            self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
        }
    }
}

/// Values applied to every profile that does not set its own.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between poll cycles. 0 disables background polling.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_poll_interval() -> u64 {
    30
}

/// One device.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Hostname or IP address of the rabbit.
    pub host: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconnect_attempts: Option<u32>,

    /// Seconds to wait before each event channel reconnect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconnect_delay: Option<u64>,

    /// Open the push event channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<bool>,

    /// Path overrides; unset entries keep the firmware defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<EndpointMap>,

    /// Resources read on every poll cycle. All of them when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Resource>>,
}

impl Profile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "openkarotz", "karotz").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("karotz");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the config from the canonical path plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path`, layered as defaults, then file, then
/// `KAROTZ_` environment variables. A missing file is not an error.
///
/// Nested keys use a double underscore: `KAROTZ_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("KAROTZ_").split("__"))
        .extract()?;
    Ok(config)
}

pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), config)
}

/// Serialize to pretty TOML and write, creating parent directories.
pub fn save_config_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(config)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile → DeviceConfig ──────────────────────────────────────────

/// Translate a profile into a [`DeviceConfig`], filling unset fields from
/// `defaults` and then from the built-in defaults.
///
/// This is the single boundary where config types cross into core types.
pub fn profile_to_device_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<DeviceConfig, ConfigError> {
    let host = profile.host.trim();
    if host.is_empty() {
        return Err(invalid("host", "must not be empty"));
    }

    let timeout = profile.timeout.unwrap_or(defaults.timeout);
    if timeout == 0 {
        return Err(invalid("timeout", "must be at least 1 second"));
    }

    let mut config = DeviceConfig::new(host);
    if let Some(port) = profile.port {
        if port == 0 {
            return Err(invalid("port", "must be between 1 and 65535"));
        }
        config.port = port;
    }
    config.timeout = Duration::from_secs(timeout);
    config.poll_interval =
        Duration::from_secs(profile.poll_interval.unwrap_or(defaults.poll_interval));

    let defaults_policy = ReconnectPolicy::default();
    let max_attempts = profile
        .reconnect_attempts
        .unwrap_or(defaults_policy.max_attempts);
    if max_attempts == 0 {
        return Err(invalid("reconnect_attempts", "must be at least 1"));
    }
    config.reconnect = ReconnectPolicy {
        max_attempts,
        delay: profile
            .reconnect_delay
            .map_or(defaults_policy.delay, Duration::from_secs),
    };

    config.events_enabled = profile.events.unwrap_or(false);
    if let Some(endpoints) = &profile.endpoints {
        config.endpoints = endpoints.clone();
    }
    if let Some(resources) = &profile.resources {
        if resources.is_empty() {
            return Err(invalid("resources", "must name at least one resource"));
        }
        let mut resources = resources.clone();
        resources.sort();
        resources.dedup();
        config.resources = resources;
    }

    Ok(config)
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bare_profile_uses_builtin_defaults() {
        let config =
            profile_to_device_config(&Profile::new("192.168.1.201"), &Defaults::default())
                .unwrap();
        assert_eq!(config.host, "192.168.1.201");
        assert_eq!(config.port, 80);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.reconnect, ReconnectPolicy::default());
        assert!(!config.events_enabled);
        assert_eq!(config.resources.len(), 9);
    }

    #[test]
    fn profile_fields_win_over_defaults() {
        let profile = Profile {
            timeout: Some(3),
            poll_interval: Some(0),
            reconnect_attempts: Some(5),
            reconnect_delay: Some(1),
            events: Some(true),
            resources: Some(vec![Resource::Leds, Resource::Info, Resource::Leds]),
            ..Profile::new("rabbit.local")
        };
        let defaults = Defaults {
            timeout: 20,
            poll_interval: 60,
            ..Defaults::default()
        };

        let config = profile_to_device_config(&profile, &defaults).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.poll_interval, Duration::ZERO);
        assert_eq!(config.reconnect.max_attempts, 5);
        assert_eq!(config.reconnect.delay, Duration::from_secs(1));
        assert!(config.events_enabled);
        assert_eq!(config.resources, vec![Resource::Info, Resource::Leds]);
    }

    #[test]
    fn invalid_profiles_are_rejected() {
        let defaults = Defaults::default();
        for (profile, field) in [
            (Profile::new("  "), "host"),
            (
                Profile {
                    timeout: Some(0),
                    ..Profile::new("h")
                },
                "timeout",
            ),
            (
                Profile {
                    reconnect_attempts: Some(0),
                    ..Profile::new("h")
                },
                "reconnect_attempts",
            ),
            (
                Profile {
                    resources: Some(Vec::new()),
                    ..Profile::new("h")
                },
                "resources",
            ),
        ] {
            match profile_to_device_config(&profile, &defaults) {
                Err(ConfigError::Validation { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected validation error on {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_profile_lists_available() {
        let mut config = Config::default();
        config.profiles.insert("kitchen".into(), Profile::new("10.0.0.2"));
        let err = config.profile("bedroom").unwrap_err();
        assert_eq!(
            err.to_string(),
            "profile 'bedroom' not found (available: kitchen)"
        );
        assert_eq!(config.active_profile_name(None), "default");
        assert_eq!(config.active_profile_name(Some("kitchen")), "kitchen");
    }
}
