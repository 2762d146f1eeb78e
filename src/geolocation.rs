use crate::error::LocationError;
use futures::channel::mpsc;
use futures::stream::{BoxStream, StreamExt};
use live_model::LatLng;
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A platform capability that reports the device position continuously.
/// Dropping the returned stream must end the observation.
pub trait PositionSource: Send + 'static {
    fn watch(self) -> BoxStream<'static, Result<LatLng, LocationError>>;
}

/// Position source fed from platform callbacks through a [`PositionSender`].
pub struct ChannelPositionSource {
    rx: mpsc::UnboundedReceiver<Result<LatLng, LocationError>>,
}

#[derive(Clone)]
pub struct PositionSender {
    tx: mpsc::UnboundedSender<Result<LatLng, LocationError>>,
}

impl ChannelPositionSource {
    pub fn channel() -> (PositionSender, ChannelPositionSource) {
        let (tx, rx) = mpsc::unbounded();
        (PositionSender { tx }, ChannelPositionSource { rx })
    }
}

impl PositionSource for ChannelPositionSource {
    fn watch(self) -> BoxStream<'static, Result<LatLng, LocationError>> {
        self.rx.boxed()
    }
}

impl PositionSender {
    /// Returns false once the tracker has stopped listening.
    pub fn fix(&self, position: LatLng) -> bool {
        self.tx.unbounded_send(Ok(position)).is_ok()
    }

    pub fn fail(&self, error: LocationError) -> bool {
        self.tx.unbounded_send(Err(error)).is_ok()
    }

    /// The platform can stop its own watch when this turns true.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Latest device position, if any. Location is optional for the client, so
/// source errors only reset it to `None`.
pub struct GeoLocationTracker {
    location: watch::Receiver<Option<LatLng>>,
    task: JoinHandle<()>,
}

impl GeoLocationTracker {
    /// Must be called from within a tokio runtime.
    pub fn start(source: impl PositionSource) -> Self {
        let (tx, rx) = watch::channel(None);
        let mut positions = source.watch();

        let task = tokio::spawn(async move {
            while let Some(update) = positions.next().await {
                match update {
                    Ok(position) => {
                        tx.send_replace(Some(position));
                    }
                    Err(e) => {
                        warn!("Error getting location: {e}");
                        tx.send_replace(None);
                    }
                }
            }
            debug!("Position source ended");
        });

        info!("Watching device position");
        GeoLocationTracker { location: rx, task }
    }

    pub fn location(&self) -> Option<LatLng> {
        *self.location.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<LatLng>> {
        self.location.clone()
    }

    pub async fn stop(mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
        info!("Stopped watching device position");
    }
}

impl Drop for GeoLocationTracker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::init_logging;

    #[tokio::test]
    async fn follows_fixes_and_forgets_on_error() {
        init_logging();
        let (sender, source) = ChannelPositionSource::channel();
        let tracker = GeoLocationTracker::start(source);
        let mut rx = tracker.subscribe();
        assert_eq!(None, tracker.location());

        let bellecour = LatLng::from_lat_lng(45.7578, 4.8320);
        assert!(sender.fix(bellecour));
        rx.changed().await.unwrap();
        assert_eq!(Some(bellecour), tracker.location());

        assert!(sender.fail(LocationError::PermissionDenied));
        rx.changed().await.unwrap();
        assert_eq!(None, tracker.location());

        let fourviere = LatLng::from_lat_lng(45.7623, 4.8226);
        sender.fix(fourviere);
        rx.changed().await.unwrap();
        assert_eq!(Some(fourviere), tracker.location());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_releases_the_source() {
        init_logging();
        let (sender, source) = ChannelPositionSource::channel();
        let tracker = GeoLocationTracker::start(source);
        let rx = tracker.subscribe();
        assert!(!sender.is_closed());

        tracker.stop().await;
        assert!(sender.is_closed());
        assert!(!sender.fix(LatLng::from_lat_lng(45.0, 4.0)));

        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        assert_eq!(None, *rx.borrow());
    }

    #[tokio::test]
    async fn drop_releases_the_source() {
        let (sender, source) = ChannelPositionSource::channel();
        drop(GeoLocationTracker::start(source));

        while !sender.is_closed() {
            tokio::task::yield_now().await;
        }
        assert!(!sender.fail(LocationError::Unavailable));
    }
}
