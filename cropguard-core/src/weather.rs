//! OpenWeatherMap current-conditions client.
//!
//! Unlike the geocoder, failures here propagate: the orchestrator needs
//! to know the cycle is dead so it can publish the placeholder state.

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::model::{Coordinate, WeatherIcon, WeatherSnapshot};

/// Ways a weather fetch can fail.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather request failed with status {status}")]
    Http { status: StatusCode },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Malformed weather response: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

/// Raw current-conditions payload, before unit conversion.
#[derive(Debug, Deserialize)]
pub struct CurrentConditions {
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl WeatherSnapshot {
    /// Derive display values from a raw payload: m/s wind to rounded
    /// km/h, icon code mapped to a known icon class.
    pub fn from_conditions(raw: &CurrentConditions, observed_at: DateTime<Utc>) -> Self {
        let front = raw.weather.first();
        let condition = front
            .map(|w| w.main.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let icon = front
            .map(|w| WeatherIcon::from_code(&w.icon))
            .unwrap_or_default();

        Self {
            temperature_c: raw.main.temp,
            condition,
            humidity_pct: raw.main.humidity,
            wind_speed_kmh: (raw.wind.speed * 3.6).round(),
            icon,
            observed_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    http: Client,
    base_url: String,
    api_key: String,
    units: String,
    language: String,
}

impl WeatherFetcher {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        units: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            units: units.into(),
            language: language.into(),
        }
    }

    /// Fetch current conditions at a coordinate.
    pub async fn fetch_current(
        &self,
        coord: &Coordinate,
    ) -> Result<CurrentConditions, WeatherError> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coord.latitude().to_string()),
                ("lon", coord.longitude().to_string()),
                ("units", self.units.clone()),
                ("lang", self.language.clone()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(
                "Weather request for {coord} failed with status {status}: {}",
                truncate_body(&body)
            );
            return Err(WeatherError::Http { status });
        }

        let parsed: CurrentConditions =
            serde_json::from_str(&body).map_err(|e| WeatherError::Malformed(e.to_string()))?;

        tracing::debug!("Fetched current conditions for {coord}");
        Ok(parsed)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    // Cut on a character boundary; a byte offset could land mid-glyph
    // in localized error bodies and panic the slice.
    match body.char_indices().nth(MAX_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
