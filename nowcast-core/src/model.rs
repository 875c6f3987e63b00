use serde::{Deserialize, Serialize};

use crate::window::ForecastWindow;

/// Latitude/longitude in degrees, as reported by a location source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Cell indices on the forecast service's projected grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub nx: i32,
    pub ny: i32,
}

impl GridCell {
    /// Bounds of the KMA national 5 km grid.
    pub const KMA_MAX_NX: i32 = 149;
    pub const KMA_MAX_NY: i32 = 253;

    pub fn is_within_kma_domain(&self) -> bool {
        (1..=Self::KMA_MAX_NX).contains(&self.nx) && (1..=Self::KMA_MAX_NY).contains(&self.ny)
    }
}

/// One measured quantity from the nowcast response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationItem {
    pub category: String,
    #[serde(rename = "obsrValue")]
    pub value: String,
}

/// Everything the forecast endpoint needs besides the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastRequest {
    pub window: ForecastWindow,
    pub grid: GridCell,
}

/// Reverse-geocoded address parts. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponents {
    pub district: Option<String>,
    pub street: Option<String>,
    pub subregion: Option<String>,
    pub city: Option<String>,
}

impl AddressComponents {
    /// Joins the present parts as "district street subregion city".
    pub fn display(&self) -> String {
        [&self.district, &self.street, &self.subregion, &self.city]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of one successful pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub coordinate: GeoCoordinate,
    pub grid: GridCell,
    pub window: ForecastWindow,
    pub address: Option<String>,
    pub lines: Vec<String>,
}
