//! Resolves which device to talk to and how to print, from the config file
//! plus global flags.

use clap::ValueEnum;
use karotz_config::{Config, Profile};
use karotz_core::DeviceConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Output settings shared by every handler.
#[derive(Debug, Clone, Copy)]
pub struct Ctx {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Ctx {
    pub fn resolve(global: &GlobalOpts, config: &Config) -> Self {
        let format = global
            .output
            .or_else(|| OutputFormat::from_str(&config.defaults.output, true).ok())
            .unwrap_or(OutputFormat::Table);
        let color = global
            .color
            .or_else(|| ColorMode::from_str(&config.defaults.color, true).ok())
            .unwrap_or(ColorMode::Auto);

        Self {
            format,
            color: output::should_color(color),
            quiet: global.quiet,
        }
    }
}

/// Build the `DeviceConfig` for this invocation.
///
/// Precedence: flag / env var, then the selected profile, then config
/// defaults. Without any profile, `--host` alone is enough.
pub fn device_config(global: &GlobalOpts, config: &Config) -> Result<DeviceConfig, CliError> {
    let name = config.active_profile_name(global.profile.as_deref());

    let mut profile = match (config.profiles.get(&name), &global.host) {
        (Some(profile), _) => profile.clone(),
        // An explicitly named profile has to exist.
        (None, _) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name,
                available: config.available_profiles(),
            });
        }
        (None, Some(host)) => Profile::new(host.clone()),
        (None, None) => {
            return Err(CliError::NoConfig {
                path: karotz_config::config_path().display().to_string(),
            });
        }
    };

    if let Some(host) = &global.host {
        profile.host.clone_from(host);
    }
    if global.port.is_some() {
        profile.port = global.port;
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }

    tracing::debug!(profile = %name, host = %profile.host, "resolved device profile");
    Ok(karotz_config::profile_to_device_config(&profile, &config.defaults)?)
}
