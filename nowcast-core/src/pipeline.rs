//! The weather query: location → grid → window → nowcast → display lines.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::{
    error::WeatherError,
    grid,
    interpret::{Language, interpret},
    location::{LocationProvider, Permission, ReverseGeocoder},
    model::{ForecastRequest, ObservationItem, WeatherReport},
    provider::ForecastSource,
    window::ForecastWindow,
};

/// Runs one weather query against the given collaborators.
#[derive(Debug)]
pub struct WeatherQueryPipeline<L, G, F> {
    location: L,
    geocoder: G,
    source: F,
    language: Language,
}

impl<L, G, F> WeatherQueryPipeline<L, G, F>
where
    L: LocationProvider,
    G: ReverseGeocoder,
    F: ForecastSource,
{
    pub fn new(location: L, geocoder: G, source: F) -> Self {
        Self {
            location,
            geocoder,
            source,
            language: Language::default(),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Each stage is awaited in order. Any failure ends the run.
    #[instrument(skip(self))]
    pub async fn run(&self, now: DateTime<Utc>) -> Result<WeatherReport, WeatherError> {
        if self.location.request_permission().await == Permission::Denied {
            warn!("Location permission denied");
            return Err(WeatherError::PermissionDenied);
        }

        let coordinate = self.location.current_position().await?;
        let grid = grid::project(coordinate);
        info!(
            latitude = coordinate.latitude,
            longitude = coordinate.longitude,
            nx = grid.nx,
            ny = grid.ny,
            "Projected position onto forecast grid"
        );
        if !grid.is_within_kma_domain() {
            warn!(nx = grid.nx, ny = grid.ny, "Position is outside the national forecast grid");
        }

        let address = self
            .geocoder
            .reverse_geocode(coordinate)
            .await?
            .map(|components| components.display());

        let window = ForecastWindow::for_instant(now);
        let request = ForecastRequest { window, grid };

        let items = self.source.fetch_observations(&request).await?;
        let lines = display_lines(&items, self.language);
        info!(items = items.len(), shown = lines.len(), "Nowcast received");

        Ok(WeatherReport {
            coordinate,
            grid,
            window,
            address,
            lines,
        })
    }
}

/// Interprets each item in order, dropping categories without a display rule.
pub fn display_lines(items: &[ObservationItem], language: Language) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| interpret(&item.category, &item.value, language))
        .collect()
}

/// UI-facing state of a weather query.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherView {
    Loading,
    Ready(WeatherReport),
    Failed(String),
}

impl WeatherView {
    pub fn from_result(result: Result<WeatherReport, WeatherError>) -> Self {
        match result {
            Ok(report) => Self::Ready(report),
            Err(e) => {
                warn!("Weather query failed: {}", e);
                Self::Failed(e.user_message().to_string())
            }
        }
    }
}
