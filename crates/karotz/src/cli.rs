//! Clap derive structures for the `karotz` CLI.
//!
//! Only depends on clap, clap_complete and humantime so build.rs can pull it
//! in to render man pages.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// karotz -- talk to an OpenKarotz rabbit from the command line
#[derive(Debug, Parser)]
#[command(
    name = "karotz",
    version,
    about = "Control and monitor an OpenKarotz rabbit",
    long_about = "Reads the status of an OpenKarotz rabbit over its HTTP API, \
        sends it commands, and follows its push events.\n\n\
        Devices are described by profiles in the config file; --host targets \
        a rabbit directly.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device profile to use
    #[arg(long, short = 'p', env = "KAROTZ_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device hostname or IP (overrides profile)
    #[arg(long, short = 'H', env = "KAROTZ_HOST", global = true)]
    pub host: Option<String>,

    /// Device HTTP port (overrides profile)
    #[arg(long, env = "KAROTZ_PORT", global = true)]
    pub port: Option<u16>,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "KAROTZ_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format [default: table, or `defaults.output` from the config]
    #[arg(long, short = 'o', env = "KAROTZ_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// Pollable resources, as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceArg {
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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one poll cycle and show every resource
    #[command(alias = "st")]
    Status,

    /// Show the raw info block (works before a session is open)
    Info,

    /// Read a single resource
    Get {
        /// Resource to read
        resource: ResourceArg,
    },

    /// Follow poll updates until interrupted
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Control the LEDs
    Led(LedArgs),

    /// Speak text
    Tts(TtsArgs),

    /// Move the ears and drive the audio player
    Ears(EarsArgs),

    /// Play a stored sound
    Sound {
        /// Sound name
        sound: String,

        /// Volume (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: Option<u8>,
    },

    /// Show a stored picture
    Picture {
        /// Picture name
        picture: String,

        /// Seconds to keep it on screen
        #[arg(long)]
        duration: Option<u32>,
    },

    /// RFID tags and recording
    Rfid(RfidArgs),

    /// Power, firmware and maintenance operations
    #[command(alias = "sys")]
    System(SystemArgs),

    /// Internet radio and squeezebox playback
    Stream(StreamArgs),

    /// Print push events from the device until interrupted
    Events(EventsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Watch / events ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval (e.g. "5s", "1m"), overriding the profile
    #[arg(long, short = 'i', value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Also print push events
    #[arg(long, short = 'e')]
    pub events: bool,

    /// Stop after this many updates
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Stop after this many events
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

// ── LEDs ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LedArgs {
    #[command(subcommand)]
    pub command: LedCommand,
}

#[derive(Debug, Subcommand)]
pub enum LedCommand {
    /// Change the LED; unset options are left to the device
    Set {
        /// Named color
        #[arg(long)]
        color: Option<String>,

        /// Brightness (0-100)
        #[arg(long, short = 'b', value_parser = clap::value_parser!(u8).range(0..=100))]
        brightness: Option<u8>,

        /// Color temperature in Kelvin
        #[arg(long)]
        temperature: Option<u32>,

        /// Firmware preset name
        #[arg(long)]
        preset: Option<String>,

        /// Hex RGB value, e.g. FF0000
        #[arg(long)]
        rgb: Option<String>,
    },
}

// ── Speech ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TtsArgs {
    /// Text to speak
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Voice name
    #[arg(long)]
    pub voice: Option<String>,

    /// Message category
    #[arg(long)]
    pub category: Option<String>,
}

// ── Ears ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EarsArgs {
    #[command(subcommand)]
    pub command: EarsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EarsCommand {
    /// Move one or both ears
    Move {
        #[arg(long, short = 'l')]
        left: Option<u8>,

        #[arg(long, short = 'r')]
        right: Option<u8>,
    },

    /// Switch the ear mode
    Mode {
        /// Mode name
        mode: String,
    },

    /// Return both ears to the rest position
    Reset,

    /// Set the player volume
    Volume {
        /// Volume (0-100)
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: u8,
    },

    /// Play a media source
    Play {
        /// Media source (URL or stored name)
        source: String,

        #[arg(long)]
        category: Option<String>,

        /// Volume (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: Option<u8>,
    },

    /// Stop playback
    Stop {
        /// Only stop this source
        source: Option<String>,
    },
}

// ── RFID ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RfidArgs {
    #[command(subcommand)]
    pub command: RfidCommand,
}

#[derive(Debug, Subcommand)]
pub enum RfidCommand {
    /// Act as if a tag was presented
    Trigger {
        /// Tag id
        id: String,

        #[arg(long)]
        action: Option<String>,
    },

    /// Start recording presented tags
    RecordStart,

    /// Stop recording
    RecordStop,

    /// Forget a tag
    Delete { tag: String },

    /// Remove a tag's assignment
    Unassign { tag: String },

    /// Bind a tag to a URL
    Assign {
        tag: String,
        url: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,
    },
}

// ── System ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SystemArgs {
    #[command(subcommand)]
    pub command: SystemCommand,
}

#[derive(Debug, Subcommand)]
pub enum SystemCommand {
    /// Wake the rabbit up
    Wakeup {
        /// Skip the wake-up sound
        #[arg(long, short = 's')]
        silent: bool,
    },

    /// Put the rabbit to sleep
    Sleep,

    /// Show the firmware version
    Version,

    /// Take a camera snapshot
    Snapshot {
        /// Skip the shutter sound
        #[arg(long, short = 's')]
        silent: bool,
    },

    /// Clear the TTS cache
    ClearCache,

    /// Delete stored snapshots
    ClearSnapshots,
}

// ── Streaming ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StreamArgs {
    #[command(subcommand)]
    pub command: StreamCommand,
}

#[derive(Debug, Subcommand)]
pub enum StreamCommand {
    /// Play an internet radio stream
    Play { url: String },

    /// Pause playback
    Pause,

    /// Start the squeezebox client
    SqueezeboxStart,

    /// Stop the squeezebox client
    SqueezeboxStop,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a profile and make it the default
    Init {
        /// Device hostname or IP
        #[arg(long = "device", value_name = "HOST")]
        device: String,

        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// HTTP port
        #[arg(long = "device-port", value_name = "PORT")]
        device_port: Option<u16>,

        /// Open the push event channel when watching
        #[arg(long)]
        events: bool,

        /// Replace an existing profile of the same name
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Display the current configuration
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
