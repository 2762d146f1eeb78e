use serde::{Deserialize, Serialize};

pub const STATUS_OK: &str = "OK";

/// Payload of `/api/lines/{category}`. The geometry travels as a JSON-encoded
/// string and `status` reports the upstream aggregator's health independently
/// of the HTTP status code.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct LineData {
    pub geojson: String,
    pub status: String,
}

impl LineData {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}
