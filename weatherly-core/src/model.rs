use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FetchError;

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, FetchError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(FetchError::InvalidCoordinates);
        }
        Ok(Self { lat, lon })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// What to look up: a free-text city or a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    /// Build a city query from raw user input. Blank input is rejected.
    pub fn city(input: &str) -> Result<Self, FetchError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(FetchError::EmptyQuery);
        }
        Ok(Self::City(trimmed.to_string()))
    }

    pub fn coordinates(position: Coordinates) -> Self {
        Self::Coordinates(position)
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::City(name) => f.write_str(name),
            LocationQuery::Coordinates(position) => write!(f, "({position})"),
        }
    }
}

/// One representative forecast entry per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temperature_c: i32,
    pub icon_code: String,
    pub description: String,
}

/// Normalized weather reading for one location at lookup time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Provider-assigned location id, used as the dedup key for cards.
    pub id: u64,
    pub name: String,
    pub country_code: String,
    pub temperature_c: i32,
    pub feels_like_c: i32,
    pub humidity_pct: u8,
    pub wind_speed_ms: f64,
    pub condition_text: String,
    pub icon_code: String,
    pub forecast: Vec<ForecastDay>,
}

/// Round a provider temperature to whole degrees, half away from zero.
pub fn round_celsius(value: f64) -> i32 {
    value.round() as i32
}
