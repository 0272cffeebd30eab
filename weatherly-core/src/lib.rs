//! Core library for the `weatherly` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather fetcher producing normalized snapshots
//! - The deduplicated card list and the lookup session around it
//! - Position sources for "use my location" lookups
//!
//! It is used by `weatherly-cli`, but can also be reused by other front ends.

pub mod cards;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod session;

pub use cards::CardList;
pub use config::Config;
pub use error::{FetchError, ProviderError};
pub use geolocation::{FirstAvailable, FixedPosition, IpGeolocator, PositionSource};
pub use model::{Coordinates, ForecastDay, LocationQuery, WeatherSnapshot};
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use session::LookupSession;
