use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A validated geographic coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside the valid
    /// latitude [-90, 90] / longitude [-180, 180] ranges.
    pub fn new(latitude: f64, longitude: f64) -> anyhow::Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            anyhow::bail!("Latitude {latitude} out of range [-90, 90]");
        }
        if !(-180.0..=180.0).contains(&longitude) {
            anyhow::bail!("Longitude {longitude} out of range [-180, 180]");
        }
        Ok(Self { latitude, longitude })
    }

    /// Nairobi, used when live location acquisition fails.
    pub const FALLBACK: Self = Self {
        latitude: -1.2921,
        longitude: 36.8219,
    };

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Icon classes the view layer knows how to render.
///
/// External icon codes never reach the view raw; everything is mapped
/// here first, unknown codes included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherIcon {
    Sun,
    Moon,
    #[default]
    CloudSun,
    CloudMoon,
    Cloud,
    Clouds,
    CloudRain,
    CloudSunRain,
    CloudMoonRain,
    Bolt,
    Snowflake,
    Smog,
}

impl WeatherIcon {
    /// Map an OpenWeatherMap icon code (e.g. "10d") to an icon class.
    /// Unknown codes fall back to the generic cloud-sun icon.
    pub fn from_code(code: &str) -> Self {
        match code {
            "01d" => Self::Sun,
            "01n" => Self::Moon,
            "02d" => Self::CloudSun,
            "02n" => Self::CloudMoon,
            "03d" | "03n" => Self::Cloud,
            "04d" | "04n" => Self::Clouds,
            "09d" | "09n" => Self::CloudRain,
            "10d" => Self::CloudSunRain,
            "10n" => Self::CloudMoonRain,
            "11d" | "11n" => Self::Bolt,
            "13d" | "13n" => Self::Snowflake,
            "50d" | "50n" => Self::Smog,
            _ => Self::CloudSun,
        }
    }

    /// CSS-class identifier consumed by the view layer.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::Moon => "moon",
            Self::CloudSun => "cloud-sun",
            Self::CloudMoon => "cloud-moon",
            Self::Cloud => "cloud",
            Self::Clouds => "clouds",
            Self::CloudRain => "cloud-rain",
            Self::CloudSunRain => "cloud-sun-rain",
            Self::CloudMoonRain => "cloud-moon-rain",
            Self::Bolt => "bolt",
            Self::Snowflake => "snowflake",
            Self::Smog => "smog",
        }
    }
}

/// Current conditions after unit conversion and icon mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: f64,
    pub condition: String,
    pub humidity_pct: u8,
    /// Converted from the raw m/s reading: round(speed * 3.6).
    pub wind_speed_kmh: f64,
    pub icon: WeatherIcon,
    pub observed_at: DateTime<Utc>,
}

/// Everything the view layer needs for one render.
///
/// Rebuilt whole on every resolution cycle; a failed cycle produces the
/// placeholder variant rather than leaving fields half-updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    pub place: String,
    pub weather: Option<WeatherSnapshot>,
    pub alert: Option<crate::alert::Alert>,
}

impl DisplayState {
    /// Placeholder state shown when a cycle fails outright.
    pub fn unavailable() -> Self {
        Self {
            place: "Location unavailable".to_string(),
            weather: None,
            alert: None,
        }
    }

    /// Placeholder state shown before the first cycle completes.
    pub fn loading() -> Self {
        Self {
            place: "Detecting location...".to_string(),
            weather: None,
            alert: None,
        }
    }

    pub fn temperature_text(&self) -> String {
        match &self.weather {
            Some(w) => format!("{}°C", w.temperature_c.round() as i64),
            None => "--°C".to_string(),
        }
    }

    pub fn condition_text(&self) -> String {
        match &self.weather {
            Some(w) => w.condition.clone(),
            None => "--".to_string(),
        }
    }

    pub fn humidity_text(&self) -> String {
        match &self.weather {
            Some(w) => format!("Humidity: {}%", w.humidity_pct),
            None => "Humidity: --%".to_string(),
        }
    }

    pub fn wind_text(&self) -> String {
        match &self.weather {
            Some(w) => format!("Wind: {} km/h", w.wind_speed_kmh),
            None => "Wind: -- km/h".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_accepts_valid_ranges() {
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
        assert!(Coordinate::new(-1.2921, 36.8219).is_ok());
    }

    #[test]
    fn coordinate_rejects_out_of_range() {
        assert!(Coordinate::new(90.1, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
    }

    #[test]
    fn icon_day_night_variants() {
        assert_eq!(WeatherIcon::from_code("01d"), WeatherIcon::Sun);
        assert_eq!(WeatherIcon::from_code("01n"), WeatherIcon::Moon);
        assert_eq!(WeatherIcon::from_code("10d"), WeatherIcon::CloudSunRain);
        assert_eq!(WeatherIcon::from_code("10n"), WeatherIcon::CloudMoonRain);
    }

    #[test]
    fn icon_shared_variants() {
        assert_eq!(WeatherIcon::from_code("03d"), WeatherIcon::Cloud);
        assert_eq!(WeatherIcon::from_code("03n"), WeatherIcon::Cloud);
        assert_eq!(WeatherIcon::from_code("04d"), WeatherIcon::Clouds);
        assert_eq!(WeatherIcon::from_code("09n"), WeatherIcon::CloudRain);
        assert_eq!(WeatherIcon::from_code("11d"), WeatherIcon::Bolt);
        assert_eq!(WeatherIcon::from_code("13n"), WeatherIcon::Snowflake);
        assert_eq!(WeatherIcon::from_code("50d"), WeatherIcon::Smog);
    }

    #[test]
    fn icon_unknown_code_defaults_to_cloud_sun() {
        assert_eq!(WeatherIcon::from_code("99x"), WeatherIcon::CloudSun);
        assert_eq!(WeatherIcon::from_code(""), WeatherIcon::CloudSun);
        assert_eq!(WeatherIcon::from_code("99x").class_name(), "cloud-sun");
    }

    #[test]
    fn placeholder_display_texts() {
        let s = DisplayState::unavailable();
        assert_eq!(s.place, "Location unavailable");
        assert_eq!(s.temperature_text(), "--°C");
        assert_eq!(s.condition_text(), "--");
        assert_eq!(s.humidity_text(), "Humidity: --%");
        assert_eq!(s.wind_text(), "Wind: -- km/h");
    }
}
