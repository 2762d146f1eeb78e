use serde::{Deserialize, Serialize};

/// WGS-84 coordinate pair.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn from_lat_lng(lat: f64, lng: f64) -> Self {
        Self {
            latitude: lat,
            longitude: lng,
        }
    }

    /// GeoJSON positions are `[lng, lat]`.
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [lng, lat, ..] => Some(Self::from_lat_lng(*lat, *lng)),
            _ => None,
        }
    }
}
