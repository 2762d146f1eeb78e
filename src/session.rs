use crate::api::{HttpApi, TransitApi};
use crate::configuration::Config;
use crate::geolocation::{GeoLocationTracker, PositionSource};
use crate::overlay_cache::OverlayCache;
use crate::stats::{aggregate, Stats};
use crate::stop_lookup::StopLookup;
use crate::vehicle_feed::VehicleFeed;
use anyhow::Result;
use live_model::{LatLng, StopInfo};
use log::info;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;

/// Everything one open map needs: the vehicle feed, overlays, stop lookup and
/// optionally the device location, all built from a single `Config`.
pub struct LiveSession {
    config: Config,
    feed: VehicleFeed,
    overlays: Arc<OverlayCache>,
    stops: Arc<StopLookup>,
    location: Option<GeoLocationTracker>,
    background: Mutex<JoinSet<()>>,
}

impl LiveSession {
    pub fn start(config: Config) -> Result<Self> {
        let api = Arc::new(HttpApi::new(&config)?);
        Ok(Self::with_api(api, config))
    }

    pub fn with_api(api: Arc<dyn TransitApi>, config: Config) -> Self {
        info!("Starting live session against {}", config.api_base);
        LiveSession {
            feed: VehicleFeed::start(api.clone(), &config),
            overlays: Arc::new(OverlayCache::new(api.clone())),
            stops: Arc::new(StopLookup::new(api)),
            location: None,
            background: Mutex::new(JoinSet::new()),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn feed(&self) -> &VehicleFeed {
        &self.feed
    }

    pub fn overlays(&self) -> &OverlayCache {
        &self.overlays
    }

    pub fn stops(&self) -> &StopLookup {
        &self.stops
    }

    pub fn track_location(&mut self, source: impl PositionSource) {
        // Replacing the tracker drops the old one, which ends its watch.
        self.location = Some(GeoLocationTracker::start(source));
    }

    pub fn location(&self) -> Option<LatLng> {
        self.location.as_ref().and_then(GeoLocationTracker::location)
    }

    /// Stats for whatever snapshot the feed currently holds.
    pub fn stats(&self) -> Stats {
        match &self.feed.state().snapshot {
            Some(snapshot) => aggregate(&snapshot.vehicles),
            None => Stats::default(),
        }
    }

    fn spawn(&self, task: impl std::future::Future<Output = ()> + Send + 'static) {
        let mut background = self.background.lock().unwrap_or_else(|e| e.into_inner());
        // Reap finished tasks.
        while background.try_join_next().is_some() {}
        background.spawn(task);
    }

    /// Fire-and-forget `OverlayCache::request`.
    pub fn request_overlay(&self, category: &str) {
        let overlays = self.overlays.clone();
        let category = category.to_string();
        self.spawn(async move {
            overlays.request(&category).await;
        });
    }

    /// Fire-and-forget `StopLookup::select`.
    pub fn select_stop(&self, stop: StopInfo) {
        let stops = self.stops.clone();
        self.spawn(async move {
            stops.select(stop).await;
        });
    }

    pub fn clear_stop(&self) {
        self.stops.clear();
    }

    pub async fn shutdown(self) {
        let LiveSession {
            feed,
            location,
            background,
            ..
        } = self;

        feed.shutdown().await;
        if let Some(location) = location {
            location.stop().await;
        }
        let mut background = background.into_inner().unwrap_or_else(|e| e.into_inner());
        background.shutdown().await;
        info!("Live session closed");
    }
}
