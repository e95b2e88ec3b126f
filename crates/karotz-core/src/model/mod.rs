// ── Domain model ──
//
// What the host sees of the device: aggregated snapshots, the updates that
// announce them, and the identity block derived from the info read.

pub mod descriptor;
pub mod snapshot;

pub use descriptor::DeviceDescriptor;
pub use snapshot::{ConnectionStatus, PollUpdate, Snapshot};
