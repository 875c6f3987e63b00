use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::WeatherError,
    model::{ForecastRequest, ObservationItem},
    provider::{kakao_local::KakaoGeocoder, kma::KmaClient},
};

pub mod kakao_local;
pub mod kma;

#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch_observations(
        &self,
        request: &ForecastRequest,
    ) -> Result<Vec<ObservationItem>, WeatherError>;
}

/// Build the KMA client from the configured service key.
pub fn forecast_source_from_config(config: &Config) -> anyhow::Result<KmaClient> {
    let key = config.kma_service_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No KMA service key configured.\n\
             Hint: run `nowcast configure` or set KMA_SERVICE_KEY."
        )
    })?;

    Ok(KmaClient::new(key))
}

/// Build the Kakao reverse geocoder, if a REST API key is configured.
pub fn geocoder_from_config(config: &Config) -> Option<KakaoGeocoder> {
    config.kakao_rest_api_key().map(KakaoGeocoder::new)
}

/// Keep error messages readable when a service answers with a long body.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
