use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    error::WeatherError,
    location::ReverseGeocoder,
    model::{AddressComponents, GeoCoordinate},
    provider::truncate_body,
};

pub const DEFAULT_BASE_URL: &str = "https://dapi.kakao.com";

const COORD2ADDRESS_PATH: &str = "/v2/local/geo/coord2address.json";

/// Reverse geocoding through the Kakao Local API.
#[derive(Clone)]
pub struct KakaoGeocoder {
    rest_api_key: String,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for KakaoGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KakaoGeocoder")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl KakaoGeocoder {
    pub fn new(rest_api_key: &str) -> Self {
        Self::with_base_url(rest_api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(rest_api_key: &str, base_url: &str) -> Self {
        Self {
            rest_api_key: rest_api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Coord2AddressResponse {
    documents: Vec<Coord2AddressDocument>,
}

#[derive(Debug, Deserialize)]
struct Coord2AddressDocument {
    address: Option<LotAddress>,
    road_address: Option<RoadAddress>,
}

#[derive(Debug, Deserialize)]
struct LotAddress {
    region_1depth_name: Option<String>,
    region_2depth_name: Option<String>,
    region_3depth_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RoadAddress {
    road_name: Option<String>,
}

impl From<Coord2AddressDocument> for AddressComponents {
    fn from(doc: Coord2AddressDocument) -> Self {
        let (city, subregion, district) = match doc.address {
            Some(a) => (a.region_1depth_name, a.region_2depth_name, a.region_3depth_name),
            None => (None, None, None),
        };

        Self {
            district,
            street: doc.road_address.and_then(|r| r.road_name),
            subregion,
            city,
        }
    }
}

#[async_trait]
impl ReverseGeocoder for KakaoGeocoder {
    #[instrument(skip(self))]
    async fn reverse_geocode(
        &self,
        coord: GeoCoordinate,
    ) -> Result<Option<AddressComponents>, WeatherError> {
        let url = format!("{}{}", self.base_url, COORD2ADDRESS_PATH);

        let res = self
            .http
            .get(&url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("KakaoAK {}", self.rest_api_key),
            )
            .query(&[
                ("x", coord.longitude.to_string()),
                ("y", coord.latitude.to_string()),
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

        let parsed: Coord2AddressResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::MalformedResponse(format!("coord2address: {e}")))?;

        let address = parsed.documents.into_iter().next().map(AddressComponents::from);
        debug!(found = address.is_some(), "Reverse geocoding finished");

        Ok(address)
    }
}
