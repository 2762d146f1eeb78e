use crate::api::TransitApi;
use live_model::{Passage, StopInfo};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone, Debug, PartialEq)]
pub enum PassageState {
    Loading,
    /// May be empty: the stop has no upcoming passages.
    Loaded(Vec<Passage>),
    Failed(String),
}

/// The selected stop and what we know about its arrivals. Passages only exist
/// inside a selection.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub stop: StopInfo,
    pub passages: PassageState,
}

/// Moves a selection out of `Loading` if its `select` future is dropped
/// before the passages arrive. Superseded selections are left alone.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<Option<Selection>>,
    current: &'a AtomicU64,
    token: u64,
    stop_id: i64,
    armed: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.state.send_if_modified(|selection| {
            if self.current.load(Ordering::SeqCst) != self.token {
                return false;
            }
            match selection {
                Some(selection) if selection.passages == PassageState::Loading => {
                    warn!("Passage request for stop {} dropped before it resolved", self.stop_id);
                    selection.passages = PassageState::Failed("request cancelled".to_string());
                    true
                }
                _ => false,
            }
        });
    }
}

pub struct StopLookup {
    api: Arc<dyn TransitApi>,
    state: watch::Sender<Option<Selection>>,
    token: AtomicU64,
}

impl StopLookup {
    pub fn new(api: Arc<dyn TransitApi>) -> Self {
        let (state, _) = watch::channel(None);
        StopLookup {
            api,
            state,
            token: AtomicU64::new(0),
        }
    }

    /// Replaces the selection and fetches its passages. Returns whether the
    /// result was committed; it is not if another stop was selected, or the
    /// selection cleared, while the request was in flight.
    pub async fn select(&self, stop: StopInfo) -> bool {
        let stop_id = stop.id;
        info!("Fetching passages for stop {} ({})", stop.name, stop_id);

        let mut token = 0;
        self.state.send_modify(|selection| {
            token = self.token.fetch_add(1, Ordering::SeqCst) + 1;
            *selection = Some(Selection {
                stop,
                passages: PassageState::Loading,
            });
        });

        let mut guard = LoadingGuard {
            state: &self.state,
            current: &self.token,
            token,
            stop_id,
            armed: true,
        };

        let passages = match self.api.passages(stop_id).await {
            Ok(passages) => {
                debug!("{} passages for stop {stop_id}", passages.len());
                PassageState::Loaded(passages)
            }
            Err(e) => {
                warn!("Error fetching passages for stop {stop_id}: {e}");
                PassageState::Failed(e.to_string())
            }
        };

        guard.armed = false;
        self.state.send_if_modified(|selection| {
            if self.token.load(Ordering::SeqCst) != token {
                debug!("Discarding passages for superseded stop {stop_id}");
                return false;
            }
            match selection {
                Some(selection) => {
                    selection.passages = passages;
                    true
                }
                None => false,
            }
        })
    }

    pub fn clear(&self) {
        self.state.send_modify(|selection| {
            self.token.fetch_add(1, Ordering::SeqCst);
            if let Some(previous) = selection.take() {
                debug!("Cleared stop selection {}", previous.stop.id);
            }
        });
    }

    pub fn selection(&self) -> Option<Selection> {
        self.state.borrow().clone()
    }

    pub fn selected_stop(&self) -> Option<StopInfo> {
        self.state.borrow().as_ref().map(|s| s.stop.clone())
    }

    pub fn loading(&self) -> bool {
        matches!(
            self.state.borrow().as_ref().map(|s| &s.passages),
            Some(PassageState::Loading)
        )
    }

    /// Loaded passages, empty while loading, after a failure or with nothing
    /// selected.
    pub fn passages(&self) -> Vec<Passage> {
        match self.state.borrow().as_ref().map(|s| &s.passages) {
            Some(PassageState::Loaded(passages)) => passages.clone(),
            _ => Vec::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Selection>> {
        self.state.subscribe()
    }
}
