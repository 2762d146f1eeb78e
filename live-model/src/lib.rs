//! Wire types shared by the live transit client: vehicle snapshots, stop
//! passages and overlay payloads as served by the backend REST API.

mod delay;
mod latlng;
mod lines;
mod passage;
mod vehicle;

pub use delay::Delay;
pub use latlng::LatLng;
pub use lines::{LineData, STATUS_OK};
pub use passage::{Passage, StopInfo};
pub use vehicle::{VehiclePosition, VehicleSnapshot};
