use crate::{Config, FetchError, LocationQuery, WeatherSnapshot};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Source of normalized weather snapshots.
///
/// Every call goes to the network; implementations do not cache.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, query: &LocationQuery) -> Result<WeatherSnapshot, FetchError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `weatherly configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    Ok(OpenWeatherProvider::new(api_key.to_owned()).with_base_url(config.base_url()))
}
