//! Noise sources near the subject point and the assessment derived from them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of noise emitter. The kind fixes intensity and audible reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Motorways and trunk roads.
    HeavyRoad,
    /// Primary roads.
    PrimaryRoad,
    /// Secondary roads.
    SecondaryRoad,
    /// Railway lines.
    Railway,
    /// Tram lines.
    Tramway,
    /// Bus and tram stops.
    TransitStop,
    /// Bars, clubs, and late venues.
    Nightlife,
}

impl NoiseKind {
    /// Penalty contributed by a source standing at the subject point.
    #[must_use]
    pub const fn intensity(self) -> f64 {
        match self {
            Self::HeavyRoad => 12.0,
            Self::PrimaryRoad => 8.0,
            Self::SecondaryRoad | Self::Tramway => 4.0,
            Self::Railway => 6.0,
            Self::TransitStop => 1.5,
            Self::Nightlife => 3.0,
        }
    }

    /// Distance in metres beyond which the source is inaudible.
    #[must_use]
    pub const fn reach_m(self) -> f64 {
        match self {
            Self::HeavyRoad => 1_000.0,
            Self::PrimaryRoad => 500.0,
            Self::SecondaryRoad => 300.0,
            Self::Railway => 400.0,
            Self::Tramway | Self::Nightlife => 150.0,
            Self::TransitStop => 100.0,
        }
    }
}

/// Errors returned by [`NoiseSource::new`].
#[derive(Debug, Error, PartialEq)]
pub enum NoiseSourceError {
    /// Distance was negative or not finite.
    #[error("noise source '{name}' has invalid distance {distance}")]
    InvalidDistance {
        /// Name of the rejected source.
        name: String,
        /// Offending distance in metres.
        distance: f64,
    },
}

/// A noise emitter measured from the subject point.
///
/// # Examples
/// ```
/// use vicinity_core::{NoiseKind, NoiseSource};
///
/// let road = NoiseSource::new("A4", NoiseKind::HeavyRoad, 250.0).expect("valid source");
/// assert_eq!(road.kind().reach_m(), 1_000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NoiseSourceRecord", into = "NoiseSourceRecord")]
pub struct NoiseSource {
    name: String,
    kind: NoiseKind,
    distance_m: f64,
}

impl NoiseSource {
    /// Validate and construct a [`NoiseSource`].
    pub fn new(
        name: impl Into<String>,
        kind: NoiseKind,
        distance_m: f64,
    ) -> Result<Self, NoiseSourceError> {
        let label: String = name.into();
        if !distance_m.is_finite() || distance_m < 0.0 {
            return Err(NoiseSourceError::InvalidDistance {
                name: label,
                distance: distance_m,
            });
        }
        Ok(Self {
            name: label,
            kind,
            distance_m,
        })
    }

    /// Display name, such as a road reference.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of emitter.
    #[must_use]
    pub const fn kind(&self) -> NoiseKind {
        self.kind
    }

    /// Distance from the subject point in metres.
    #[must_use]
    pub const fn distance_m(&self) -> f64 {
        self.distance_m
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NoiseSourceRecord {
    name: String,
    kind: NoiseKind,
    distance_m: f64,
}

impl TryFrom<NoiseSourceRecord> for NoiseSource {
    type Error = NoiseSourceError;

    fn try_from(record: NoiseSourceRecord) -> Result<Self, Self::Error> {
        Self::new(record.name, record.kind, record.distance_m)
    }
}

impl From<NoiseSource> for NoiseSourceRecord {
    fn from(source: NoiseSource) -> Self {
        Self {
            name: source.name,
            kind: source.kind,
            distance_m: source.distance_m,
        }
    }
}

/// Coarse band of the raw noise penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseLevel {
    /// Raw penalty below 4.
    Low,
    /// Raw penalty below 9.
    Moderate,
    /// Raw penalty below 15.
    High,
    /// Raw penalty of 15 or more.
    Extreme,
}

/// Noise outcome folded into a score breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseAssessment {
    /// Penalty subtracted from the base score after profile sensitivity.
    pub penalty: f64,
    /// Penalty before profile sensitivity, in `0..=20`.
    pub raw_penalty: f64,
    /// Band of the raw penalty.
    pub level: NoiseLevel,
    /// Quietness score in `0..=100` derived from the raw penalty.
    pub quiet_score: f64,
}

impl NoiseAssessment {
    /// Assessment for a location with no audible sources.
    pub const SILENT: Self = Self {
        penalty: 0.0,
        raw_penalty: 0.0,
        level: NoiseLevel::Low,
        quiet_score: 100.0,
    };
}

impl Default for NoiseAssessment {
    fn default() -> Self {
        Self::SILENT
    }
}
