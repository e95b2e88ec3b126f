// karotz-core: Polling, snapshot publication and lifecycle for one OpenKarotz device.

pub mod command;
pub mod config;
pub mod device;
pub mod error;
pub mod model;
pub mod poller;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::Command;
pub use config::DeviceConfig;
pub use device::{ConnectionState, Device};
pub use error::CoreError;
pub use model::{ConnectionStatus, DeviceDescriptor, PollUpdate, Snapshot};
pub use poller::Poller;
pub use store::SnapshotStore;
pub use stream::SnapshotStream;

// API types that appear in this crate's public surface.
pub use karotz_api::{
    AudioCommand, ChannelState, DeviceClient, DeviceEvent, DeviceInfo, EarsCommand, EndpointMap,
    LedCommand, ReconnectPolicy, Resource, TtsCommand,
};
