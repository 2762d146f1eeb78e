//! Scripted in-memory backend for component tests.

use crate::api::TransitApi;
use crate::error::FetchError;
use futures::future::{BoxFuture, FutureExt};
use live_model::{LineData, Passage, VehiclePosition, VehicleSnapshot};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub enum Reply<T> {
    Ready(Result<T, FetchError>),
    Delayed(Duration, Result<T, FetchError>),
    /// Resolves when the paired sender fires.
    Gated(oneshot::Receiver<Result<T, FetchError>>),
}

impl<T: Send + 'static> Reply<T> {
    fn into_future(self) -> BoxFuture<'static, Result<T, FetchError>> {
        match self {
            Reply::Ready(result) => futures::future::ready(result).boxed(),
            Reply::Delayed(after, result) => async move {
                tokio::time::sleep(after).await;
                result
            }
            .boxed(),
            Reply::Gated(rx) => async move {
                rx.await
                    .unwrap_or_else(|_| Err(FetchError::Network("gate dropped".to_string())))
            }
            .boxed(),
        }
    }
}

pub fn gate<T>() -> (oneshot::Sender<Result<T, FetchError>>, Reply<T>) {
    let (tx, rx) = oneshot::channel();
    (tx, Reply::Gated(rx))
}

#[derive(Default)]
pub struct ScriptedApi {
    vehicles: Mutex<VecDeque<Reply<VehicleSnapshot>>>,
    lines: Mutex<FxHashMap<String, VecDeque<Reply<LineData>>>>,
    passages: Mutex<FxHashMap<i64, VecDeque<Reply<Vec<Passage>>>>>,

    vehicle_calls: AtomicUsize,
    line_calls: Mutex<Vec<String>>,
    pub passage_calls: Mutex<Vec<i64>>,
}

impl ScriptedApi {
    pub fn push_vehicles(&self, reply: Reply<VehicleSnapshot>) {
        self.vehicles.lock().unwrap().push_back(reply);
    }

    pub fn push_lines(&self, category: &str, reply: Reply<LineData>) {
        self.lines
            .lock()
            .unwrap()
            .entry(category.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn push_passages(&self, stop_id: i64, reply: Reply<Vec<Passage>>) {
        self.passages
            .lock()
            .unwrap()
            .entry(stop_id)
            .or_default()
            .push_back(reply);
    }

    pub fn vehicle_calls(&self) -> usize {
        self.vehicle_calls.load(Ordering::SeqCst)
    }

    pub fn line_calls(&self, category: &str) -> usize {
        self.line_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| *c == category)
            .count()
    }
}

impl TransitApi for ScriptedApi {
    fn vehicles(&self) -> BoxFuture<'static, Result<VehicleSnapshot, FetchError>> {
        self.vehicle_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.vehicles.lock().unwrap().pop_front();
        reply
            .unwrap_or_else(|| Reply::Ready(Ok(snapshot(&["T1"]))))
            .into_future()
    }

    fn lines(&self, category: &str) -> BoxFuture<'static, Result<LineData, FetchError>> {
        self.line_calls.lock().unwrap().push(category.to_string());
        let reply = self
            .lines
            .lock()
            .unwrap()
            .get_mut(category)
            .and_then(|q| q.pop_front());
        reply
            .unwrap_or_else(|| Reply::Ready(Err(FetchError::Network("unscripted".to_string()))))
            .into_future()
    }

    fn passages(&self, stop_id: i64) -> BoxFuture<'static, Result<Vec<Passage>, FetchError>> {
        self.passage_calls.lock().unwrap().push(stop_id);
        let reply = self
            .passages
            .lock()
            .unwrap()
            .get_mut(&stop_id)
            .and_then(|q| q.pop_front());
        reply.unwrap_or_else(|| Reply::Ready(Ok(Vec::new()))).into_future()
    }
}

pub fn vehicle(line: &str, delay: Option<&str>) -> VehiclePosition {
    VehiclePosition {
        vehicle_id: format!("vehicle-{line}"),
        line_id: format!("ActIV:Line::{line}:SYTRAL"),
        direction: Some("ALLER".to_string()),
        latitude: 45.7578,
        longitude: 4.8320,
        delay: delay.map(str::to_string),
        bearing: Some(90.0),
        recorded_at_time: None,
        valid_until_time: None,
        destination_name: None,
        data_source: None,
        vehicle_status: None,
    }
}

pub fn snapshot(lines: &[&str]) -> VehicleSnapshot {
    VehicleSnapshot {
        vehicles: lines.iter().map(|l| vehicle(l, None)).collect(),
        api_response_timestamp: None,
        last_fetch_time: None,
        api_status: Some("OK".to_string()),
    }
}

pub fn passage(line: &str, countdown: &str) -> Passage {
    Passage {
        line: line.to_string(),
        countdown: countdown.to_string(),
        ..Passage::default()
    }
}

pub const EMPTY_COLLECTION: &str = r#"{"type":"FeatureCollection","features":[]}"#;

pub fn line_data(geojson: &str, status: &str) -> LineData {
    LineData {
        geojson: geojson.to_string(),
        status: status.to_string(),
    }
}
