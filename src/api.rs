use crate::configuration::Config;
use crate::error::FetchError;
use anyhow::{Context, Result};
use futures::future::{BoxFuture, FutureExt};
use live_model::{LineData, Passage, VehicleSnapshot};
use log::debug;
use serde::de::DeserializeOwned;

/// The three backend calls the client makes. Components only see this trait,
/// so the transport can be swapped without touching their state handling.
pub trait TransitApi: Send + Sync + 'static {
    fn vehicles(&self) -> BoxFuture<'static, Result<VehicleSnapshot, FetchError>>;

    fn lines(&self, category: &str) -> BoxFuture<'static, Result<LineData, FetchError>>;

    fn passages(&self, stop_id: i64) -> BoxFuture<'static, Result<Vec<Passage>, FetchError>>;
}

pub struct HttpApi {
    client: reqwest::Client,
    config: Config,
}

impl HttpApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("could not build HTTP client")?;

        Ok(HttpApi {
            client,
            config: config.clone(),
        })
    }
}

fn get_json<T>(request: reqwest::RequestBuilder) -> BoxFuture<'static, Result<T, FetchError>>
where
    T: DeserializeOwned + Send + 'static,
{
    async move {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
    .boxed()
}

impl TransitApi for HttpApi {
    fn vehicles(&self) -> BoxFuture<'static, Result<VehicleSnapshot, FetchError>> {
        let url = self.config.url("/api/vehicles");
        debug!("GET {url}");
        get_json(self.client.get(url))
    }

    fn lines(&self, category: &str) -> BoxFuture<'static, Result<LineData, FetchError>> {
        let url = self.config.url(&format!("/api/lines/{category}"));
        debug!("GET {url}");
        get_json(self.client.get(url))
    }

    fn passages(&self, stop_id: i64) -> BoxFuture<'static, Result<Vec<Passage>, FetchError>> {
        let url = self.config.url("/api/vehicles/passages");
        debug!("GET {url}?stopId={stop_id}");
        get_json(self.client.get(url).query(&[("stopId", stop_id)]))
    }
}
