//! Position acquisition seam.
//!
//! The orchestrator only sees the trait; hosts plug in whatever
//! geolocation capability they actually have. No retries happen here —
//! recovery policy belongs to the caller.

use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

use crate::model::Coordinate;

/// Options forwarded to the underlying capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub timeout: Duration,
    /// Oldest acceptable cached fix.
    pub max_age: Duration,
    pub high_accuracy: bool,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_age: Duration::from_secs(300),
            high_accuracy: true,
        }
    }
}

/// Ways position acquisition can fail.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum PositionError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location information unavailable")]
    PositionUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Geolocation is not supported on this host")]
    Unsupported,
}

#[async_trait]
pub trait PositionProvider: Send + Sync + Debug {
    async fn position(&self, opts: &PositionOptions) -> Result<Coordinate, PositionError>;
}

/// Provider backed by an explicit coordinate, e.g. from CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition {
    coordinate: Coordinate,
}

impl FixedPosition {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl PositionProvider for FixedPosition {
    async fn position(&self, _opts: &PositionOptions) -> Result<Coordinate, PositionError> {
        Ok(self.coordinate)
    }
}

/// Provider for hosts without any geolocation capability.
///
/// Always fails with `Unsupported`, which sends the orchestrator down
/// its fallback-coordinate path.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPosition;

#[async_trait]
impl PositionProvider for NoPosition {
    async fn position(&self, _opts: &PositionOptions) -> Result<Coordinate, PositionError> {
        Err(PositionError::Unsupported)
    }
}
