use crate::api::TransitApi;
use crate::error::FetchError;
use geojson::GeoJson;
use live_model::{LineData, STATUS_OK};
use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tokio::sync::watch;

pub const DEFAULT_CATEGORIES: [&str; 4] = ["metro", "tram", "bus", "stops"];

pub const FETCH_ERROR: &str = "FETCH_ERROR";

/// Why an overlay could not be loaded. The three cases are kept apart so the
/// dashboard can tell them apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayFailure {
    /// Non-2xx from our backend.
    Transport(u16),
    /// 200 from our backend, but its upstream source reported a problem.
    Upstream(String),
    /// No usable response at all.
    Fetch(String),
}

impl OverlayFailure {
    pub fn status(&self) -> String {
        match self {
            OverlayFailure::Transport(code) => format!("HTTP_{code}"),
            OverlayFailure::Upstream(status) => status.clone(),
            OverlayFailure::Fetch(_) => FETCH_ERROR.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum OverlayEntry {
    Pending,
    Resolved(Arc<GeoJson>),
    Failed(OverlayFailure),
}

impl OverlayEntry {
    pub fn loading(&self) -> bool {
        matches!(self, OverlayEntry::Pending)
    }

    /// `"OK"` unless the fetch failed; pending entries are optimistically OK.
    pub fn status(&self) -> String {
        match self {
            OverlayEntry::Failed(failure) => failure.status(),
            _ => STATUS_OK.to_string(),
        }
    }

    pub fn geometry(&self) -> Option<&Arc<GeoJson>> {
        match self {
            OverlayEntry::Resolved(geojson) => Some(geojson),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&OverlayFailure> {
        match self {
            OverlayEntry::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    fn from_response(result: Result<LineData, FetchError>) -> Self {
        match result {
            Ok(data) if data.is_ok() => match data.geojson.parse::<GeoJson>() {
                Ok(geojson) => OverlayEntry::Resolved(Arc::new(geojson)),
                Err(e) => OverlayEntry::Failed(OverlayFailure::Fetch(e.to_string())),
            },
            Ok(data) => OverlayEntry::Failed(OverlayFailure::Upstream(data.status)),
            Err(FetchError::Status(code)) => OverlayEntry::Failed(OverlayFailure::Transport(code)),
            Err(e) => OverlayEntry::Failed(OverlayFailure::Fetch(e.to_string())),
        }
    }
}

pub type OverlayMap = FxHashMap<String, OverlayEntry>;

/// Marks a claimed category as failed if its request is dropped before it
/// resolves, so the category does not stay pending forever.
struct PendingGuard<'a> {
    entries: &'a watch::Sender<OverlayMap>,
    category: &'a str,
    armed: bool,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("{} overlay request dropped before it resolved", self.category);
            self.entries.send_modify(|entries| {
                entries.insert(
                    self.category.to_string(),
                    OverlayEntry::Failed(OverlayFailure::Fetch("request cancelled".to_string())),
                );
            });
        }
    }
}

/// Static line/stop layers, fetched on first use and kept for the session.
pub struct OverlayCache {
    api: Arc<dyn TransitApi>,
    entries: watch::Sender<OverlayMap>,
}

impl OverlayCache {
    pub fn new(api: Arc<dyn TransitApi>) -> Self {
        let (entries, _) = watch::channel(OverlayMap::default());
        OverlayCache { api, entries }
    }

    /// Fetches `category` unless it is already loading or loaded. Returns
    /// whether a request was issued. A failed category can be requested again.
    pub async fn request(&self, category: &str) -> bool {
        let claimed = self.entries.send_if_modified(|entries| match entries.get(category) {
            Some(OverlayEntry::Pending) | Some(OverlayEntry::Resolved(_)) => false,
            _ => {
                entries.insert(category.to_string(), OverlayEntry::Pending);
                true
            }
        });
        if !claimed {
            debug!("{category} overlay already requested");
            return false;
        }

        let mut guard = PendingGuard {
            entries: &self.entries,
            category,
            armed: true,
        };

        info!("Fetching {category} overlay");
        let entry = OverlayEntry::from_response(self.api.lines(category).await);
        match &entry {
            OverlayEntry::Failed(OverlayFailure::Fetch(reason)) => {
                warn!("Error fetching {category} lines: {reason}")
            }
            OverlayEntry::Failed(failure) => {
                warn!("{category} overlay unavailable: {}", failure.status())
            }
            _ => info!("{category} overlay loaded"),
        }

        guard.armed = false;
        self.entries.send_modify(|entries| {
            entries.insert(category.to_string(), entry);
        });
        true
    }

    pub fn entry(&self, category: &str) -> Option<OverlayEntry> {
        self.entries.borrow().get(category).cloned()
    }

    pub fn geometry(&self, category: &str) -> Option<Arc<GeoJson>> {
        self.entries
            .borrow()
            .get(category)
            .and_then(|e| e.geometry().cloned())
    }

    pub fn loading(&self, category: &str) -> bool {
        self.entries
            .borrow()
            .get(category)
            .map_or(false, OverlayEntry::loading)
    }

    /// Categories that have been requested at least once, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<_> = self.entries.borrow().keys().cloned().collect();
        categories.sort();
        categories
    }

    pub fn subscribe(&self) -> watch::Receiver<OverlayMap> {
        self.entries.subscribe()
    }
}
