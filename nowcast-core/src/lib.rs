//! Core library for the `nowcast` CLI.
//!
//! This crate defines:
//! - Projection of coordinates onto the KMA forecast grid
//! - Selection of the latest published observation window
//! - Interpretation of nowcast categories into display lines
//! - The weather query pipeline and its HTTP providers
//! - The Kakao OAuth2 login flow
//!
//! It is used by `nowcast-cli`, but the pipeline and login flow only talk to
//! their collaborators through traits, so other front ends can drive them.

pub mod auth;
pub mod config;
pub mod error;
pub mod grid;
pub mod interpret;
pub mod location;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod window;

pub use auth::{AuthRedirect, LoginFlow, LoginOutcome, LoginState, NavigationPolicy};
pub use config::Config;
pub use error::{AuthError, WeatherError};
pub use interpret::{Language, interpret};
pub use location::{FixedLocation, LocationProvider, Permission, ReverseGeocoder};
pub use model::{AddressComponents, GeoCoordinate, GridCell, ObservationItem, WeatherReport};
pub use pipeline::{WeatherQueryPipeline, WeatherView};
pub use provider::ForecastSource;
pub use window::ForecastWindow;
