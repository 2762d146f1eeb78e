use crate::{Delay, LatLng, STATUS_OK};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePosition {
    pub vehicle_id: String,
    #[serde(default)]
    pub line_id: String,
    pub direction: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub delay: Option<String>,
    pub bearing: Option<f64>,
    pub recorded_at_time: Option<String>,
    pub valid_until_time: Option<String>,
    pub destination_name: Option<String>,
    pub data_source: Option<String>,
    pub vehicle_status: Option<String>,
}

impl VehiclePosition {
    pub fn position(&self) -> LatLng {
        LatLng::from_lat_lng(self.latitude, self.longitude)
    }

    /// `None` when upstream sent no delay or an empty one. A present delay
    /// with nothing readable in it parses as zero and so counts as on time.
    pub fn delay(&self) -> Option<Delay> {
        self.delay
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(Delay::parse)
    }

    pub fn recorded_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(self.recorded_at_time.as_deref())
    }

    pub fn valid_until(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(self.valid_until_time.as_deref())
    }
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<FixedOffset>> {
    raw.and_then(|r| DateTime::parse_from_rfc3339(r).ok())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Epoch(f64),
    #[allow(dead_code)]
    Other(IgnoredAny),
}

/// Epoch values above this are milliseconds, below it seconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e11;

/// Accepts RFC 3339, offset-less ISO (read as UTC) and epoch seconds or
/// milliseconds. Anything else becomes `None` instead of failing the body.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawTimestamp::Text(text)) => {
            let text = text.trim();
            DateTime::parse_from_rfc3339(text)
                .map(|t| t.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                        .ok()
                        .map(|t| Utc.from_utc_datetime(&t))
                })
        }
        Some(RawTimestamp::Epoch(value)) if value.is_finite() => {
            let millis = if value.abs() >= EPOCH_MILLIS_THRESHOLD {
                value
            } else {
                value * 1000.0
            };
            Utc.timestamp_millis_opt(millis.round() as i64).single()
        }
        _ => None,
    })
}

/// Body of `/api/vehicles`.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSnapshot {
    #[serde(default)]
    pub vehicles: Vec<VehiclePosition>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub api_response_timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_fetch_time: Option<DateTime<Utc>>,
    pub api_status: Option<String>,
}

impl VehicleSnapshot {
    /// The upstream status when it reports anything other than OK.
    pub fn upstream_issue(&self) -> Option<&str> {
        self.api_status.as_deref().filter(|s| *s != STATUS_OK)
    }
}
