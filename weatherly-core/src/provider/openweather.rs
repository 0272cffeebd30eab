use async_trait::async_trait;
use chrono::{NaiveDateTime, Timelike};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use crate::{
    error::{FetchError, ProviderError},
    model::{ForecastDay, LocationQuery, WeatherSnapshot, round_celsius},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Forecast days kept per snapshot.
const FORECAST_DAYS: usize = 3;

const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point the provider at another API root, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current conditions and forecast are requested together; either failing
    /// fails the whole lookup.
    async fn fetch_snapshot(&self, query: &LocationQuery) -> Result<WeatherSnapshot, ProviderError> {
        let (current, forecast) = tokio::try_join!(
            self.get_json::<OwCurrentResponse>("weather", query),
            self.get_json::<OwForecastResponse>("forecast", query),
        )?;

        build_snapshot(current, &forecast)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &LocationQuery,
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(url = %url, query = %query, "requesting OpenWeather");

        let mut params = location_params(query);
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));

        let res = self.http.get(&url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip_all, fields(query = %query))]
    async fn fetch(&self, query: &LocationQuery) -> Result<WeatherSnapshot, FetchError> {
        self.fetch_snapshot(query).await.map_err(|source| {
            warn!(error = %source, "weather lookup failed");
            match query {
                LocationQuery::City(city) => FetchError::LookupFailed {
                    city: city.clone(),
                    source,
                },
                LocationQuery::Coordinates(_) => FetchError::LocationLookupFailed { source },
            }
        })
    }
}

fn location_params(query: &LocationQuery) -> Vec<(&'static str, String)> {
    match query {
        LocationQuery::City(name) => vec![("q", name.clone())],
        LocationQuery::Coordinates(position) => vec![
            ("lat", position.lat.to_string()),
            ("lon", position.lon.to_string()),
        ],
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    // Absent for coordinates outside any country.
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    id: u64,
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn build_snapshot(
    current: OwCurrentResponse,
    forecast: &OwForecastResponse,
) -> Result<WeatherSnapshot, ProviderError> {
    let condition = current
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::shape("current weather array is empty"))?;

    let humidity_pct = u8::try_from(current.main.humidity)
        .ok()
        .filter(|pct| *pct <= 100)
        .ok_or_else(|| {
            ProviderError::shape(format!("humidity {} is out of range", current.main.humidity))
        })?;

    if current.wind.speed.is_nan() || current.wind.speed < 0.0 {
        return Err(ProviderError::shape(format!(
            "invalid wind speed {}",
            current.wind.speed
        )));
    }

    let forecast = noon_entries(&forecast.list)?
        .into_iter()
        .map(|(at, entry)| {
            let weather = entry.weather.first().ok_or_else(|| {
                ProviderError::shape(format!("forecast weather array is empty at {}", entry.dt_txt))
            })?;
            Ok(ForecastDay {
                date: at.date(),
                temperature_c: round_celsius(entry.main.temp),
                icon_code: weather.icon.clone(),
                description: weather.description.clone(),
            })
        })
        .collect::<Result<Vec<_>, ProviderError>>()?;

    Ok(WeatherSnapshot {
        id: current.id,
        name: current.name,
        country_code: current.sys.country,
        temperature_c: round_celsius(current.main.temp),
        feels_like_c: round_celsius(current.main.feels_like),
        humidity_pct,
        wind_speed_ms: current.wind.speed,
        condition_text: condition.description,
        icon_code: condition.icon,
        forecast,
    })
}

/// First `FORECAST_DAYS` entries stamped exactly 12:00:00, in response order.
fn noon_entries(
    entries: &[OwForecastEntry],
) -> Result<Vec<(NaiveDateTime, &OwForecastEntry)>, ProviderError> {
    let mut picked = Vec::with_capacity(FORECAST_DAYS);

    for entry in entries {
        if picked.len() == FORECAST_DAYS {
            break;
        }

        let at = NaiveDateTime::parse_from_str(&entry.dt_txt, DT_TXT_FORMAT).map_err(|e| {
            ProviderError::shape(format!("invalid dt_txt '{}': {e}", entry.dt_txt))
        })?;

        if (at.hour(), at.minute(), at.second()) == (12, 0, 0) {
            picked.push((at, entry));
        }
    }

    Ok(picked)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
