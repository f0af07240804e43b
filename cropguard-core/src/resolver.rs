//! Location and weather resolution orchestrator.
//!
//! Drives a single cycle through its phases: acquire a position, then
//! resolve the place name and fetch weather concurrently, then evaluate
//! advisories. A failed position acquisition reroutes through the fixed
//! fallback coordinate; a failed weather fetch (fallback path included)
//! terminates the cycle in the failed state with placeholder values.

use chrono::Utc;
use reqwest::Client;
use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;

use crate::alert::{Alert, AlertThresholds};
use crate::config::Config;
use crate::geocode::ReverseGeocoder;
use crate::model::{Coordinate, DisplayState, WeatherSnapshot};
use crate::position::{PositionOptions, PositionProvider};
use crate::weather::WeatherFetcher;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Phases of one resolution cycle.
///
/// Transitions are total: every phase either advances or lands in one
/// of the two terminal phases, `Done` and `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePhase {
    #[default]
    Idle,
    ResolvingPosition,
    FallbackResolving,
    ResolvingNameAndWeather,
    Evaluating,
    Done,
    Failed,
}

impl CyclePhase {
    /// A load/refresh trigger starts the cycle.
    pub fn start(self) -> Self {
        Self::ResolvingPosition
    }

    /// Position acquisition finished: proceed, or reroute through the
    /// fallback coordinate.
    pub fn on_position(self, ok: bool) -> Self {
        if ok {
            Self::ResolvingNameAndWeather
        } else {
            Self::FallbackResolving
        }
    }

    /// The fallback coordinate is fixed, so this leg always proceeds.
    pub fn on_fallback(self) -> Self {
        Self::ResolvingNameAndWeather
    }

    /// Weather fetch finished; geocode cannot fail by contract.
    pub fn on_weather(self, ok: bool) -> Self {
        if ok { Self::Evaluating } else { Self::Failed }
    }

    pub fn on_evaluated(self) -> Self {
        Self::Done
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

#[derive(Debug)]
struct Published {
    cycle: u64,
    state: DisplayState,
}

/// Sequences position, geocode, weather and alert evaluation, and owns
/// the fallback policy.
///
/// Overlapping cycles are resolved last-writer-wins by cycle sequence
/// number: a completion older than what is already published is dropped.
#[derive(Debug)]
pub struct WeatherResolver {
    position: Box<dyn PositionProvider>,
    geocoder: ReverseGeocoder,
    fetcher: WeatherFetcher,
    thresholds: AlertThresholds,
    options: PositionOptions,
    fallback: Coordinate,
    next_cycle: AtomicU64,
    published: Mutex<Published>,
}

impl WeatherResolver {
    pub fn new(
        position: Box<dyn PositionProvider>,
        geocoder: ReverseGeocoder,
        fetcher: WeatherFetcher,
        thresholds: AlertThresholds,
        options: PositionOptions,
    ) -> Self {
        Self {
            position,
            geocoder,
            fetcher,
            thresholds,
            options,
            fallback: Coordinate::FALLBACK,
            next_cycle: AtomicU64::new(0),
            published: Mutex::new(Published {
                cycle: 0,
                state: DisplayState::loading(),
            }),
        }
    }

    /// Build a resolver from an explicit configuration record.
    ///
    /// Errors when no API key is configured.
    pub fn from_config(
        config: &Config,
        position: Box<dyn PositionProvider>,
    ) -> anyhow::Result<Self> {
        let api_key = config.api_key()?.to_string();
        let http = Client::builder().timeout(HTTP_TIMEOUT).build()?;

        let geocoder =
            ReverseGeocoder::new(http.clone(), config.weather.base_url.clone(), api_key.clone());
        let fetcher = WeatherFetcher::new(
            http,
            config.weather.base_url.clone(),
            api_key,
            config.weather.units.clone(),
            config.weather.language.clone(),
        );
        let options = PositionOptions {
            timeout: config.app.geolocation_timeout(),
            max_age: config.app.geolocation_max_age(),
            high_accuracy: true,
        };

        Ok(Self::new(position, geocoder, fetcher, config.alerts, options))
    }

    /// Run one resolution cycle, publish its result, and return the
    /// freshest published state.
    ///
    /// Under overlapping cycles the returned state may come from a
    /// newer cycle than the one just run; it always agrees with
    /// [`current`](Self::current).
    pub async fn refresh(&self) -> DisplayState {
        let cycle = self.next_cycle.fetch_add(1, Ordering::Relaxed) + 1;
        let state = self.run_cycle(cycle).await;
        self.publish(cycle, state);
        self.current()
    }

    /// Most recently published display state.
    pub fn current(&self) -> DisplayState {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state
            .clone()
    }

    async fn run_cycle(&self, cycle: u64) -> DisplayState {
        let mut phase = CyclePhase::default().start();
        tracing::debug!(cycle, ?phase, "Resolution cycle started");

        let (coord, used_fallback) = match self.position.position(&self.options).await {
            Ok(coord) => {
                phase = phase.on_position(true);
                (coord, false)
            }
            Err(e) => {
                phase = phase.on_position(false);
                tracing::info!(cycle, ?phase, "Position acquisition failed ({e}); using fallback");
                phase = phase.on_fallback();
                (self.fallback, true)
            }
        };
        tracing::debug!(cycle, ?phase, %coord, "Resolving name and weather");

        // Independent legs; the geocoder degrades instead of failing.
        let (mut place, conditions) = tokio::join!(
            self.geocoder.resolve_name(&coord),
            self.fetcher.fetch_current(&coord),
        );
        if used_fallback {
            place.push_str(" (Default)");
        }

        let raw = match conditions {
            Ok(raw) => raw,
            Err(e) => {
                phase = phase.on_weather(false);
                tracing::warn!(cycle, ?phase, "Weather fetch failed: {e}");
                return DisplayState::unavailable();
            }
        };
        phase = phase.on_weather(true);

        let snapshot = WeatherSnapshot::from_conditions(&raw, Utc::now());
        let alert = Alert::evaluate(&snapshot, &self.thresholds);
        phase = phase.on_evaluated();
        tracing::debug!(cycle, ?phase, alert = ?alert, "Resolution cycle complete");

        DisplayState {
            place,
            weather: Some(snapshot),
            alert,
        }
    }

    /// Last-writer-wins commit; stale completions are dropped.
    fn publish(&self, cycle: u64, state: DisplayState) {
        let mut published = self
            .published
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if cycle >= published.cycle {
            *published = Published { cycle, state };
        } else {
            tracing::debug!(cycle, "Dropping stale resolution cycle");
        }
    }
}
