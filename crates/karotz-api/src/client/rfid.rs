// RFID endpoints
//
// Reading and triggering go through the `rfid` resource; tag management
// uses the dedicated CGI scripts with query parameters.

use serde_json::Value;
use tracing::debug;

use crate::client::DeviceClient;
use crate::error::Error;
use crate::models::RfidTriggerBody;

impl DeviceClient {
    /// Last seen tag and reader state.
    ///
    /// `GET {rfid}`
    pub async fn get_rfid(&self) -> Result<Value, Error> {
        self.get(&self.endpoints().rfid).await
    }

    /// Act as if `rfid_id` had been presented to the reader.
    ///
    /// `POST {rfid}` with `{"rfid_id", "action"?}`
    pub async fn trigger_rfid(&self, rfid_id: &str, action: Option<&str>) -> Result<Value, Error> {
        debug!(rfid_id, ?action, "triggering rfid");
        self.post(&self.endpoints().rfid, &RfidTriggerBody { rfid_id, action }).await
    }

    /// Put the reader in record mode; the next tag shown is stored.
    pub async fn rfid_start_record(&self) -> Result<Value, Error> {
        debug!("starting rfid record");
        self.get(&self.endpoints().rfid_start_record).await
    }

    pub async fn rfid_stop_record(&self) -> Result<Value, Error> {
        debug!("stopping rfid record");
        self.get(&self.endpoints().rfid_stop_record).await
    }

    /// `GET {rfid_delete}?tag=...`
    pub async fn rfid_delete(&self, tag: &str) -> Result<Value, Error> {
        debug!(tag, "deleting rfid tag");
        self.get_with(&self.endpoints().rfid_delete, &[("tag", tag.to_owned())]).await
    }

    /// Remove whatever action is bound to a tag.
    ///
    /// `GET {rfid_unassign}?tag=...`
    pub async fn rfid_unassign(&self, tag: &str) -> Result<Value, Error> {
        debug!(tag, "unassigning rfid tag");
        self.get_with(&self.endpoints().rfid_unassign, &[("tag", tag.to_owned())]).await
    }

    /// Bind a URL to a tag; the device calls it when the tag is shown.
    ///
    /// `GET {rfid_assign}?tag=...&url=...&name=...`
    pub async fn rfid_assign_url(
        &self,
        tag: &str,
        url: &str,
        name: Option<&str>,
    ) -> Result<Value, Error> {
        debug!(tag, url, "assigning url to rfid tag");
        let mut query = vec![("tag", tag.to_owned()), ("url", url.to_owned())];
        if let Some(name) = name {
            query.push(("name", name.to_owned()));
        }
        self.get_with(&self.endpoints().rfid_assign, &query).await
    }
}
