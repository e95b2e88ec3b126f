// karotz-api: Async Rust client for the OpenKarotz HTTP and WebSocket API

pub mod client;
pub mod endpoints;
pub mod error;
pub mod events;
pub mod models;
pub mod transport;

pub use client::DeviceClient;
pub use endpoints::EndpointMap;
pub use error::{Error, ErrorKind};
pub use events::{ChannelState, DeviceEvent, EventChannel, EventHandler, ReconnectPolicy};
pub use models::{AudioCommand, DeviceInfo, EarsCommand, LedCommand, Resource, TtsCommand};
pub use transport::{Transport, TransportConfig};
