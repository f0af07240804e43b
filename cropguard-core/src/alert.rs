//! Disease-risk advisories derived from current weather.
//!
//! The checks are ordered; the first one that fires wins and no further
//! checks run. All comparisons are strict (`>`).

use serde::{Deserialize, Serialize};

use crate::model::WeatherSnapshot;

/// Thresholds for the advisory checks. Supplied by configuration and
/// never mutated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// Humidity (%) above which disease development is favored.
    pub high_humidity: f64,
    /// Humidity (%) that only warrants an advisory combined with warmth.
    pub moderate_humidity: f64,
    /// Temperature (°C) counted as "warm" for the combined check.
    pub warm_temp: f64,
    /// Temperature (°C) above which heat stress is a concern on its own.
    pub high_temp: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            high_humidity: 75.0,
            moderate_humidity: 60.0,
            warm_temp: 20.0,
            high_temp: 30.0,
        }
    }
}

/// An advisory worth surfacing to the grower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    HighHumidity,
    HumidWarmth,
    HeatStress,
}

impl Alert {
    /// Evaluate current conditions against the thresholds.
    ///
    /// Returns at most one advisory, highest priority first:
    /// high humidity, then humid warmth, then heat stress.
    pub fn evaluate(snapshot: &WeatherSnapshot, thresholds: &AlertThresholds) -> Option<Self> {
        let humidity = f64::from(snapshot.humidity_pct);
        let temp = snapshot.temperature_c;

        if humidity > thresholds.high_humidity {
            return Some(Self::HighHumidity);
        }
        if humidity > thresholds.moderate_humidity && temp > thresholds.warm_temp {
            return Some(Self::HumidWarmth);
        }
        if temp > thresholds.high_temp {
            return Some(Self::HeatStress);
        }
        None
    }

    /// The advisory text shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            Self::HighHumidity => {
                "High humidity detected. Conditions favor disease development. \
                 Monitor crops closely and consider preventive measures."
            }
            Self::HumidWarmth => {
                "Moderate humidity and warm temperature detected. \
                 Consider preventive spraying for disease control."
            }
            Self::HeatStress => {
                "High temperature detected. Ensure adequate irrigation \
                 and monitor for heat stress in crops."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeatherIcon;
    use chrono::Utc;

    fn snapshot(temperature_c: f64, humidity_pct: u8) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_c,
            condition: "Clouds".to_string(),
            humidity_pct,
            wind_speed_kmh: 10.0,
            icon: WeatherIcon::Clouds,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn high_humidity_fires_regardless_of_temperature() {
        let t = AlertThresholds::default();
        for temp in [-5.0, 10.0, 25.0, 40.0] {
            assert_eq!(
                Alert::evaluate(&snapshot(temp, 76), &t),
                Some(Alert::HighHumidity)
            );
        }
    }

    #[test]
    fn high_humidity_outranks_heat_stress() {
        let t = AlertThresholds::default();
        assert_eq!(
            Alert::evaluate(&snapshot(35.0, 80), &t),
            Some(Alert::HighHumidity)
        );
    }

    #[test]
    fn moderate_humidity_needs_warmth() {
        let t = AlertThresholds::default();
        assert_eq!(
            Alert::evaluate(&snapshot(21.0, 61), &t),
            Some(Alert::HumidWarmth)
        );
        // Same humidity but cool: no advisory.
        assert_eq!(Alert::evaluate(&snapshot(18.0, 61), &t), None);
    }

    #[test]
    fn heat_stress_when_dry() {
        let t = AlertThresholds::default();
        assert_eq!(
            Alert::evaluate(&snapshot(31.0, 50), &t),
            Some(Alert::HeatStress)
        );
    }

    #[test]
    fn calm_conditions_produce_no_alert() {
        let t = AlertThresholds::default();
        assert_eq!(Alert::evaluate(&snapshot(30.0, 60), &t), None);
        assert_eq!(Alert::evaluate(&snapshot(20.0, 40), &t), None);
    }

    #[test]
    fn comparisons_are_strict_at_thresholds() {
        let t = AlertThresholds::default();
        // Exactly at the boundary never fires.
        assert_eq!(Alert::evaluate(&snapshot(20.0, 75), &t), None);
        assert_eq!(Alert::evaluate(&snapshot(30.0, 0), &t), None);
    }

    #[test]
    fn messages_match_advisory_copy() {
        assert!(Alert::HighHumidity.message().starts_with("High humidity detected."));
        assert!(Alert::HumidWarmth.message().contains("preventive spraying"));
        assert!(Alert::HeatStress.message().contains("heat stress"));
    }
}
