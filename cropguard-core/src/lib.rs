//! Core library for the CropGuard weather advisory.
//!
//! This crate defines:
//! - Configuration handling (API access, refresh timing, alert thresholds)
//! - Position acquisition behind a provider trait, with a fixed fallback
//! - Reverse geocoding and current-weather HTTP clients
//! - Disease-risk alert evaluation and the resolution orchestrator
//!
//! It is used by `cropguard-cli`, but can also be reused by other
//! binaries or services.

pub mod alert;
pub mod config;
pub mod geocode;
pub mod model;
pub mod position;
pub mod resolver;
pub mod weather;

pub use alert::{Alert, AlertThresholds};
pub use config::Config;
pub use geocode::ReverseGeocoder;
pub use model::{Coordinate, DisplayState, WeatherIcon, WeatherSnapshot};
pub use position::{FixedPosition, NoPosition, PositionError, PositionOptions, PositionProvider};
pub use resolver::{CyclePhase, WeatherResolver};
pub use weather::{WeatherError, WeatherFetcher};
