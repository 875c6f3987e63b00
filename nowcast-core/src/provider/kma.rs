use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{
    error::WeatherError,
    model::{ForecastRequest, ObservationItem},
    provider::truncate_body,
};

use super::ForecastSource;

pub const DEFAULT_BASE_URL: &str = "http://apis.data.go.kr/1360000/VilageFcstInfoService_2.0";

const NOWCAST_PATH: &str = "getUltraSrtNcst";
const RESULT_OK: &str = "00";

/// Client for the KMA ultra short-term nowcast (`getUltraSrtNcst`).
#[derive(Clone)]
pub struct KmaClient {
    service_key: String,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for KmaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KmaClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl KmaClient {
    pub fn new(service_key: &str) -> Self {
        Self::with_base_url(service_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(service_key: &str, base_url: &str) -> Self {
        Self {
            service_key: decode_service_key(service_key),
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    #[instrument(skip(self))]
    async fn fetch(&self, request: &ForecastRequest) -> Result<Vec<ObservationItem>, WeatherError> {
        let url = format!("{}/{}", self.base_url, NOWCAST_PATH);
        let base_date = request.window.base_date_str();
        let base_time = request.window.base_time_str();
        let nx = request.grid.nx.to_string();
        let ny = request.grid.ny.to_string();

        debug!(nx = request.grid.nx, ny = request.grid.ny, "Requesting nowcast");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("serviceKey", self.service_key.as_str()),
                ("pageNo", "1"),
                ("numOfRows", "1000"),
                ("dataType", "JSON"),
                ("base_date", base_date.as_str()),
                ("base_time", base_time.as_str()),
                ("nx", nx.as_str()),
                ("ny", ny.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Api {
                code: status.as_u16().to_string(),
                message: truncate_body(&body),
            });
        }

        parse_nowcast(&body)
    }
}

#[async_trait]
impl ForecastSource for KmaClient {
    async fn fetch_observations(
        &self,
        request: &ForecastRequest,
    ) -> Result<Vec<ObservationItem>, WeatherError> {
        self.fetch(request).await
    }
}

/// The data portal hands out both a raw and a percent-encoded key. Reduce
/// either form to the raw key so it is encoded exactly once on the wire.
fn decode_service_key(key: &str) -> String {
    let key = key.trim();
    if !key.contains('%') {
        return key.to_string();
    }

    match urlencoding::decode(key) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            warn!("Service key is not valid percent-encoding, using as-is: {}", e);
            key.to_string()
        }
    }
}

#[derive(Debug, Deserialize)]
struct KmaEnvelope {
    response: KmaResponse,
}

#[derive(Debug, Deserialize)]
struct KmaResponse {
    header: KmaHeader,
    body: Option<KmaBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KmaHeader {
    result_code: String,
    result_msg: String,
}

#[derive(Debug, Deserialize)]
struct KmaBody {
    items: KmaItems,
}

#[derive(Debug, Deserialize)]
struct KmaItems {
    item: Vec<ObservationItem>,
}

fn parse_nowcast(body: &str) -> Result<Vec<ObservationItem>, WeatherError> {
    // Gateway errors come back as XML even when JSON was requested.
    let envelope: KmaEnvelope = serde_json::from_str(body).map_err(|e| {
        WeatherError::MalformedResponse(format!("{e}: {}", truncate_body(body)))
    })?;

    let response = envelope.response;
    if response.header.result_code != RESULT_OK {
        return Err(WeatherError::Api {
            code: response.header.result_code,
            message: response.header.result_msg,
        });
    }

    let body = response
        .body
        .ok_or_else(|| WeatherError::MalformedResponse("response.body is missing".into()))?;

    Ok(body.items.item)
}
