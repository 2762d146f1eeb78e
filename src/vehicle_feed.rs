use crate::api::TransitApi;
use crate::configuration::Config;
use crate::error::FetchError;
use futures::future::BoxFuture;
use live_model::VehicleSnapshot;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

#[derive(Clone, Debug, Default)]
pub struct FeedState {
    pub snapshot: Option<Arc<VehicleSnapshot>>,
    pub error: Option<String>,
    pub is_waking_up: bool,
}

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum FeedPhase {
    /// No data yet, nothing gone wrong.
    Connecting,
    /// No data yet and the backend is taking long enough to look asleep.
    WakingUp,
    /// No data yet and the last request failed.
    Unreachable,
    Live,
    /// Showing stale data because the last request failed.
    Degraded,
}

impl FeedState {
    pub fn has_data(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn phase(&self) -> FeedPhase {
        match (&self.snapshot, &self.error) {
            (Some(_), None) => FeedPhase::Live,
            (Some(_), Some(_)) => FeedPhase::Degraded,
            (None, Some(_)) => FeedPhase::Unreachable,
            (None, None) if self.is_waking_up => FeedPhase::WakingUp,
            (None, None) => FeedPhase::Connecting,
        }
    }
}

struct FeedShared {
    api: Arc<dyn TransitApi>,
    state: watch::Sender<FeedState>,
    wake_up_threshold: Duration,
    issued: AtomicU64,
    applied: AtomicU64,
}

impl FeedShared {
    async fn poll(self: Arc<Self>) {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let cold = !self.state.borrow().has_data();

        let request = self.api.vehicles();
        let result = if cold {
            self.race_wake_up(request).await
        } else {
            request.await
        };

        self.apply(seq, result);
    }

    /// Runs the request against the wake-up timer. Both live in this future,
    /// so dropping it releases the timer together with the request.
    async fn race_wake_up(
        &self,
        mut request: BoxFuture<'static, Result<VehicleSnapshot, FetchError>>,
    ) -> Result<VehicleSnapshot, FetchError> {
        tokio::select! {
            result = &mut request => return result,
            _ = tokio::time::sleep(self.wake_up_threshold) => {}
        }

        self.state.send_if_modified(|state| {
            if state.has_data() || state.is_waking_up {
                return false;
            }
            info!(
                "No response from backend after {:?}, it is probably waking up",
                self.wake_up_threshold
            );
            state.is_waking_up = true;
            true
        });

        request.await
    }

    fn apply(&self, seq: u64, result: Result<VehicleSnapshot, FetchError>) {
        self.state.send_if_modified(|state| {
            if seq < self.applied.load(Ordering::SeqCst) {
                debug!("Dropping vehicle response #{seq}, a newer one is already applied");
                return false;
            }
            self.applied.store(seq, Ordering::SeqCst);
            state.is_waking_up = false;

            match result {
                Ok(snapshot) => {
                    debug!("Vehicle snapshot #{seq}: {} vehicles", snapshot.vehicles.len());
                    if let Some(issue) = snapshot.upstream_issue() {
                        warn!("Backend reports upstream status {issue}");
                    }
                    state.snapshot = Some(Arc::new(snapshot));
                    state.error = None;
                }
                Err(e) => {
                    warn!("Error fetching vehicles: {e}");
                    state.error = Some(e.to_string());
                }
            }
            true
        });
    }
}

async fn drive(shared: Arc<FeedShared>, period: Duration, mut retries: mpsc::UnboundedReceiver<()>) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Dropped with this future, which aborts whatever is still in flight.
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if in_flight.is_empty() {
                    in_flight.spawn(shared.clone().poll());
                } else {
                    debug!("Vehicle request still outstanding, skipping tick");
                }
            }
            retry = retries.recv() => match retry {
                Some(()) => {
                    info!("Manual vehicle reload");
                    in_flight.spawn(shared.clone().poll());
                }
                None => return,
            },
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }
}

/// Polls `/api/vehicles` on a fixed interval for as long as it lives.
pub struct VehicleFeed {
    state: watch::Receiver<FeedState>,
    retry: mpsc::UnboundedSender<()>,
    driver: JoinHandle<()>,
}

impl VehicleFeed {
    /// Must be called from within a tokio runtime.
    pub fn start(api: Arc<dyn TransitApi>, config: &Config) -> Self {
        let (tx, rx) = watch::channel(FeedState::default());
        let shared = Arc::new(FeedShared {
            api,
            state: tx,
            wake_up_threshold: config.wake_up_threshold,
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        });
        let (retry, retries) = mpsc::unbounded_channel();

        info!("Starting vehicle feed, refreshing every {:?}", config.refresh_interval);
        let driver = tokio::spawn(drive(shared, config.refresh_interval, retries));

        VehicleFeed {
            state: rx,
            retry,
            driver,
        }
    }

    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.clone()
    }

    /// Issues a request right away, outside the interval.
    pub fn reload(&self) {
        if self.retry.send(()).is_err() {
            warn!("Vehicle feed is stopped, ignoring reload");
        }
    }

    /// Stops polling. Once this returns no timer or response of this feed
    /// touches the state again.
    pub async fn shutdown(mut self) {
        self.driver.abort();
        let _ = (&mut self.driver).await;
        info!("Vehicle feed stopped");
    }
}

impl Drop for VehicleFeed {
    fn drop(&mut self) {
        self.driver.abort();
    }
}
