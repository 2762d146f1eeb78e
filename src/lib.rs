//! Data synchronization layer of the Lyon live traffic map: vehicle polling,
//! on-demand overlays, stop arrivals, device location and the figures the
//! dashboard derives from them.

pub mod api;
pub mod configuration;
pub mod error;
pub mod formatter;
pub mod geolocation;
pub mod line_classifier;
pub mod overlay_cache;
pub mod overlay_style;
pub mod session;
pub mod stats;
pub mod stop_lookup;
pub mod vehicle_feed;

#[cfg(test)]
mod test_support;

pub use api::{HttpApi, TransitApi};
pub use configuration::Config;
pub use error::{FetchError, LocationError};
pub use geolocation::{ChannelPositionSource, GeoLocationTracker, PositionSender, PositionSource};
pub use line_classifier::{classify_line_id, LineCategory, LineInfo};
pub use overlay_cache::{OverlayCache, OverlayEntry, OverlayFailure};
pub use session::LiveSession;
pub use stats::{aggregate, Stats};
pub use stop_lookup::{PassageState, Selection, StopLookup};
pub use vehicle_feed::{FeedPhase, FeedState, VehicleFeed};

pub use live_model;
