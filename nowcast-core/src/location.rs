//! Location collaborators: where the pipeline gets coordinates and addresses.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::WeatherError,
    model::{AddressComponents, GeoCoordinate},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn request_permission(&self) -> Permission;

    async fn current_position(&self) -> Result<GeoCoordinate, WeatherError>;
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync + Debug {
    /// `Ok(None)` when the service knows no address for the point.
    async fn reverse_geocode(
        &self,
        coord: GeoCoordinate,
    ) -> Result<Option<AddressComponents>, WeatherError>;
}

/// A position the caller already knows, e.g. from command-line arguments.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub GeoCoordinate);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn current_position(&self) -> Result<GeoCoordinate, WeatherError> {
        Ok(self.0)
    }
}

/// Geocoder for callers that have no address source.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeocoder;

#[async_trait]
impl ReverseGeocoder for NoGeocoder {
    async fn reverse_geocode(
        &self,
        _coord: GeoCoordinate,
    ) -> Result<Option<AddressComponents>, WeatherError> {
        Ok(None)
    }
}
