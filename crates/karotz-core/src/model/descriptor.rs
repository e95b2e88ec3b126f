use karotz_api::DeviceInfo;
use serde::Serialize;

const MANUFACTURER: &str = "OpenKarotz";
const DEFAULT_NAME: &str = "OpenKarotz";
const UNKNOWN: &str = "Unknown";
const UNKNOWN_ID: &str = "unknown";

/// Identity the host registers the device under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    /// Stable identifier: the firmware `id`, else the Wi-Fi MAC.
    pub id: String,
    pub name: String,
    pub model: String,
    pub serial: String,
    pub manufacturer: String,
    pub sw_version: Option<String>,
}

impl From<DeviceInfo> for DeviceDescriptor {
    fn from(info: DeviceInfo) -> Self {
        Self {
            id: info
                .id
                .or(info.wlan_mac)
                .unwrap_or_else(|| UNKNOWN_ID.into()),
            name: info.name.unwrap_or_else(|| DEFAULT_NAME.into()),
            model: info.model.unwrap_or_else(|| UNKNOWN.into()),
            serial: info.serial.unwrap_or_else(|| UNKNOWN.into()),
            manufacturer: MANUFACTURER.into(),
            sw_version: info.version,
        }
    }
}
