//! Write-side commands. Each CLI subcommand maps onto one device command.

use karotz_core::{
    AudioCommand, Command as DeviceCommand, CoreError, Device, DeviceConfig, EarsCommand as Ears,
    LedCommand as Led, TtsCommand,
};

use super::{print_value, send};
use crate::cli::{
    Command, EarsCommand, LedCommand, RfidCommand, StreamCommand, SystemArgs, SystemCommand,
};
use crate::config::Ctx;
use crate::error::CliError;

/// Translate a write subcommand. `None` for commands that are not writes.
pub fn to_device_command(cmd: Command) -> Option<DeviceCommand> {
    let command = match cmd {
        Command::Led(args) => match args.command {
            LedCommand::Set {
                color,
                brightness,
                temperature,
                preset,
                rgb,
            } => DeviceCommand::SetLed(Led {
                color,
                brightness,
                color_temperature: temperature,
                preset,
                rgb_value: rgb,
            }),
        },

        Command::Tts(args) => DeviceCommand::PlayTts(TtsCommand {
            text: args.text.join(" "),
            voice: args.voice,
            category: args.category,
        }),

        Command::Ears(args) => match args.command {
            EarsCommand::Move { left, right } => DeviceCommand::MoveEars(Ears { left, right }),
            EarsCommand::Mode { mode } => DeviceCommand::EarsMode { mode },
            EarsCommand::Reset => DeviceCommand::EarsReset,
            EarsCommand::Volume { volume } => DeviceCommand::SetVolume { volume },
            EarsCommand::Play {
                source,
                category,
                volume,
            } => DeviceCommand::PlayAudio(AudioCommand {
                source,
                category,
                volume,
            }),
            EarsCommand::Stop { source } => DeviceCommand::StopAudio { source },
        },

        Command::Sound { sound, volume } => DeviceCommand::PlaySound { sound, volume },
        Command::Picture { picture, duration } => {
            DeviceCommand::DisplayPicture { picture, duration }
        }

        Command::Rfid(args) => match args.command {
            RfidCommand::Trigger { id, action } => DeviceCommand::TriggerRfid {
                rfid_id: id,
                action,
            },
            RfidCommand::RecordStart => DeviceCommand::RfidStartRecord,
            RfidCommand::RecordStop => DeviceCommand::RfidStopRecord,
            RfidCommand::Delete { tag } => DeviceCommand::RfidDelete { tag },
            RfidCommand::Unassign { tag } => DeviceCommand::RfidUnassign { tag },
            RfidCommand::Assign { tag, url, name } => {
                DeviceCommand::RfidAssignUrl { tag, url, name }
            }
        },

        Command::Stream(args) => match args.command {
            StreamCommand::Play { url } => DeviceCommand::PlayStream { url },
            StreamCommand::Pause => DeviceCommand::Pause,
            StreamCommand::SqueezeboxStart => DeviceCommand::SqueezeboxStart,
            StreamCommand::SqueezeboxStop => DeviceCommand::SqueezeboxStop,
        },

        _ => return None,
    };
    Some(command)
}

pub async fn system(args: SystemArgs, config: DeviceConfig, ctx: &Ctx) -> Result<(), CliError> {
    let command = match args.command {
        SystemCommand::Version => {
            let device = Device::new(config)?;
            let version = device
                .client()
                .get_version()
                .await
                .map_err(CoreError::from)?;
            return print_value(&version, ctx);
        }
        SystemCommand::Wakeup { silent } => DeviceCommand::Wakeup { silent },
        SystemCommand::Sleep => DeviceCommand::Sleep,
        SystemCommand::Snapshot { silent } => DeviceCommand::TakeSnapshot {
            silent: silent.then_some(true),
        },
        SystemCommand::ClearCache => DeviceCommand::ClearCache,
        SystemCommand::ClearSnapshots => DeviceCommand::ClearSnapshots,
    };
    send(config, command, ctx).await
}
