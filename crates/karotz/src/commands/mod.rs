//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod control;
pub mod status;
pub mod watch;

use karotz_core::{Command as DeviceCommand, Device, DeviceConfig, Resource};
use serde_json::Value;

use crate::cli::Command;
use crate::config::Ctx;
use crate::error::CliError;
use crate::output;

/// Dispatch a device-bound command to its handler.
pub async fn dispatch(cmd: Command, config: DeviceConfig, ctx: &Ctx) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::status(config, ctx).await,
        Command::Info => status::info(config, ctx).await,
        Command::Get { resource } => status::get(config, resource.into(), ctx).await,
        Command::Watch(args) => watch::watch(args, config, ctx).await,
        Command::Events(args) => watch::events(args, config, ctx).await,
        Command::System(args) => control::system(args, config, ctx).await,
        other => match control::to_device_command(other) {
            Some(command) => send(config, command, ctx).await,
            None => Err(CliError::Internal(
                "config and completions are handled before dispatch".into(),
            )),
        },
    }
}

/// Issue one write and print the device's answer.
///
/// Probes go out without a session. Everything else opens a short session
/// whose first cycle only reads `info`.
pub async fn send(
    mut config: DeviceConfig,
    command: DeviceCommand,
    ctx: &Ctx,
) -> Result<(), CliError> {
    command.validate()?;

    let response = if command.is_probe() {
        Device::new(config)?.execute(command).await?
    } else {
        config.resources = vec![Resource::Info];
        Device::oneshot(config, |device| async move { device.execute(command).await }).await?
    };
    print_value(&response, ctx)
}

/// Print a raw device response.
pub fn print_value(value: &Value, ctx: &Ctx) -> Result<(), CliError> {
    let out = output::render_single(
        ctx.format,
        value,
        |v| format!("{v:#}"),
        |v| match v.get("return") {
            Some(code) => output::cell(code),
            None => v.to_string(),
        },
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
