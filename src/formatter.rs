use crate::line_classifier::classify_line_id;
use crate::overlay_cache::OverlayEntry;
use crate::stats::Stats;
use crate::vehicle_feed::{FeedPhase, FeedState};
use chrono::TimeZone;
use live_model::{VehiclePosition, VehicleSnapshot};
use std::fmt::{Display, Formatter};

const NOT_AVAILABLE: &str = "N/A";
const DESTINATION_PREFIX: &str = "ActIV:StopArea:";
const DESTINATION_SUFFIX: &str = ":SYTRAL";

pub fn describe_delay(vehicle: &VehiclePosition) -> String {
    match vehicle.delay() {
        Some(delay) => delay.to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `"ActIV:StopArea:SP:48376:SYTRAL"` -> `"SP:48376"`.
pub fn short_destination(raw: Option<&str>) -> &str {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return NOT_AVAILABLE;
    };
    raw.find(DESTINATION_PREFIX)
        .map(|start| &raw[start + DESTINATION_PREFIX.len()..])
        .and_then(|rest| rest.find(DESTINATION_SUFFIX).map(|end| &rest[..end]))
        .unwrap_or(raw)
}

/// `"Tramway: T1"`.
pub fn vehicle_title(vehicle: &VehiclePosition) -> String {
    let line = classify_line_id(&vehicle.line_id);
    format!("{}: {}", line.category, line.code)
}

/// Full-screen message shown while there is no vehicle data to draw.
#[derive(Debug, PartialEq, Eq)]
pub struct ConnectionOverlay {
    pub headline: &'static str,
    pub detail: String,
    pub can_retry: bool,
}

impl ConnectionOverlay {
    pub fn for_state(state: &FeedState) -> Option<Self> {
        let overlay = match state.phase() {
            FeedPhase::Live | FeedPhase::Degraded => return None,
            FeedPhase::Unreachable => ConnectionOverlay {
                headline: "Connection Issue",
                detail: state.error.clone().unwrap_or_default(),
                can_retry: true,
            },
            FeedPhase::WakingUp => ConnectionOverlay {
                headline: "Waking up Server...",
                detail: "The free-tier server is spinning up. This usually takes 30-50s.".to_string(),
                can_retry: false,
            },
            FeedPhase::Connecting => ConnectionOverlay {
                headline: "Connecting to Lyon...",
                detail: "Fetching real-time traffic data...".to_string(),
                can_retry: false,
            },
        };
        Some(overlay)
    }
}

/// Warning shown when the backend reports trouble with its own upstream.
pub fn upstream_banner(snapshot: &VehicleSnapshot) -> Option<String> {
    snapshot.upstream_issue().map(|issue| match issue {
        "API_DOWN" => "Upstream server unreachable".to_string(),
        other => other.to_string(),
    })
}

pub fn server_time<Tz>(snapshot: Option<&VehicleSnapshot>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    snapshot
        .and_then(|s| s.api_response_timestamp)
        .map(|t| t.with_timezone(tz).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "---".to_string())
}

pub struct StatsSummary<'a>(pub &'a Stats);

impl Display for StatsSummary<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let stats = self.0;
        if stats.late > stats.early {
            write!(f, "Currently {} vehicles are late.", stats.late)
        } else {
            write!(f, "Efficiency is high: {} vehicles are ahead of schedule.", stats.early)
        }
    }
}

/// Text of a layer toggle button.
pub fn layer_label(category: &str, entry: Option<&OverlayEntry>) -> String {
    match entry {
        Some(OverlayEntry::Pending) => "Loading...".to_string(),
        Some(OverlayEntry::Failed(_)) => format!("{category} Error"),
        _ => {
            let mut chars = category.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}
