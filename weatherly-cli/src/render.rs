use std::fmt::Write as _;

use weatherly_core::{CardList, LookupSession, WeatherSnapshot};

const MISSING: &str = "--";

/// Text for every card, newest first.
pub fn cards(cards: &CardList) -> String {
    if cards.is_empty() {
        return "No weather cards yet.\n".to_string();
    }

    cards
        .iter()
        .map(card)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn cards_json(cards: &CardList) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(cards)?)
}

/// Loading and error indicators shown under the search prompt.
pub fn status(session: &LookupSession) -> Option<String> {
    if session.is_loading() {
        return Some("Loading...".to_string());
    }
    session.error().map(|msg| format!("Error: {msg}"))
}

fn card(snapshot: &WeatherSnapshot) -> String {
    let mut out = String::new();

    let place = if snapshot.country_code.is_empty() {
        snapshot.name.clone()
    } else {
        format!("{}, {}", snapshot.name, snapshot.country_code)
    };
    let place = if place.is_empty() { MISSING.to_string() } else { place };

    let _ = writeln!(out, "+ {place}  [id {}]", snapshot.id);
    let _ = writeln!(out, "| {:13}{}°C", "Temperature", snapshot.temperature_c);
    let _ = writeln!(out, "| {:13}{}°C", "Feels like", snapshot.feels_like_c);
    let _ = writeln!(out, "| {:13}{}%", "Humidity", snapshot.humidity_pct);
    let _ = writeln!(out, "| {:13}{} m/s", "Wind", snapshot.wind_speed_ms);
    let _ = writeln!(
        out,
        "| {:13}{} ({})",
        "Condition", snapshot.condition_text, snapshot.icon_code
    );

    if !snapshot.forecast.is_empty() {
        let _ = writeln!(out, "| Forecast");
        for day in &snapshot.forecast {
            let date = day.date.format("%a %Y-%m-%d").to_string();
            let temp = format!("{}°C", day.temperature_c);
            let _ = writeln!(
                out,
                "|   {date:14} {:4} {temp:>5}  {}",
                day.icon_code, day.description
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use weatherly_core::{FetchError, ForecastDay};

    fn london() -> WeatherSnapshot {
        WeatherSnapshot {
            id: 2643743,
            name: "London".into(),
            country_code: "GB".into(),
            temperature_c: 15,
            feels_like_c: 14,
            humidity_pct: 82,
            wind_speed_ms: 5.66,
            condition_text: "light rain".into(),
            icon_code: "10d".into(),
            forecast: vec![ForecastDay {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                temperature_c: 12,
                icon_code: "01d".into(),
                description: "clear sky".into(),
            }],
        }
    }

    #[test]
    fn empty_list_has_placeholder() {
        assert_eq!(cards(&CardList::new()), "No weather cards yet.\n");
    }

    #[test]
    fn card_shows_all_fields() {
        let text = cards(&CardList::new().prepend_if_absent(london()));

        assert!(text.starts_with("+ London, GB  [id 2643743]"));
        assert!(text.contains("Temperature  15°C"));
        assert!(text.contains("Feels like   14°C"));
        assert!(text.contains("Humidity     82%"));
        assert!(text.contains("Wind         5.66 m/s"));
        assert!(text.contains("Condition    light rain (10d)"));
        assert!(text.contains("Mon 2024-01-01"));
        assert!(text.contains("clear sky"));
    }

    #[test]
    fn card_without_forecast_skips_section() {
        let mut snapshot = london();
        snapshot.forecast.clear();
        snapshot.country_code.clear();

        let text = cards(&CardList::new().prepend_if_absent(snapshot));
        assert!(text.starts_with("+ London  [id"));
        assert!(!text.contains("Forecast"));
    }

    #[test]
    fn json_is_an_array_of_cards() {
        let json = cards_json(&CardList::new().prepend_if_absent(london())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "London");
        assert_eq!(value[0]["forecast"][0]["date"], "2024-01-01");
    }

    #[test]
    fn status_prefers_loading_over_error() {
        let mut session = LookupSession::new();
        assert_eq!(status(&session), None);

        session.apply(Err(FetchError::EmptyQuery));
        assert_eq!(status(&session).as_deref(), Some("Error: Please enter a city name."));

        session.begin();
        assert_eq!(status(&session).as_deref(), Some("Loading..."));
    }
}
