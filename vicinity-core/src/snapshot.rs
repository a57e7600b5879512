//! Per-category POI snapshots captured once per fetch.
//!
//! A snapshot is the unit the scorer, data-quality assessor, and rescore
//! controller work from. It is never mutated after construction; narrowing
//! the radius produces a fresh snapshot via [`CategorySnapshot::restrict`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Category, Poi};

/// Counts of POIs the provider returned but that were not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rejections {
    /// Dropped for lying beyond the search radius.
    pub radius: usize,
    /// Dropped because their tags did not match the category.
    pub membership: usize,
    /// Dropped for any other reason, such as missing coordinates.
    pub other: usize,
}

impl Rejections {
    /// Total rejected POIs.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.radius
            .saturating_add(self.membership)
            .saturating_add(self.other)
    }
}

/// Outcome of the provider query for one category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderStatus {
    /// The query completed.
    #[default]
    Ok,
    /// The query failed, possibly after partial results.
    Error {
        /// Provider error codes, for example `timeout` or `http_429`.
        codes: Vec<String>,
    },
}

impl ProviderStatus {
    /// Report whether the provider signalled an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Error codes, empty when the query succeeded.
    #[must_use]
    pub fn codes(&self) -> &[String] {
        match self {
            Self::Ok => &[],
            Self::Error { codes } => codes,
        }
    }
}

/// Which upstream produced the POIs of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Primary provider only.
    #[default]
    Primary,
    /// Fallback provider only.
    Fallback,
    /// Both providers contributed.
    Mixed,
    /// Nothing was returned.
    None,
}

/// Errors raised while building a [`CategorySnapshot`].
#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    /// The radius was zero, negative, or not finite.
    #[error("radius for {category} must be positive and finite, got {radius}")]
    InvalidRadius {
        /// Category of the snapshot.
        category: Category,
        /// Offending radius in metres.
        radius: f64,
    },
    /// A POI belongs to a different category.
    #[error("point of interest '{name}' is {found}, expected {expected}")]
    CategoryMismatch {
        /// Category of the snapshot.
        expected: Category,
        /// Category carried by the POI.
        found: Category,
        /// Name of the offending POI.
        name: String,
    },
    /// The derived quiet category cannot hold a snapshot.
    #[error("quiet is derived from noise sources and has no snapshot")]
    DerivedCategory,
}

/// POIs fetched for one category plus the bookkeeping needed to judge them.
///
/// # Examples
/// ```
/// use vicinity_core::{Category, CategorySnapshot, Poi};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pois = vec![
///     Poi::new("Far", Category::Food, "restaurant", 700.0)?,
///     Poi::new("Near", Category::Food, "cafe", 90.0)?,
/// ];
/// let snapshot = CategorySnapshot::new(Category::Food, pois, 1_000.0)?;
/// assert_eq!(snapshot.nearest_distance(), Some(90.0));
///
/// let narrowed = snapshot.restrict(500.0)?;
/// assert_eq!(narrowed.kept_count(), 1);
/// assert_eq!(narrowed.rejections().radius, 1);
/// assert_eq!(snapshot.kept_count(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRecord", into = "SnapshotRecord")]
pub struct CategorySnapshot {
    category: Category,
    pois: Vec<Poi>,
    raw_count: usize,
    radius_m: f64,
    rejections: Rejections,
    provider: ProviderStatus,
    source: DataSource,
}

impl CategorySnapshot {
    /// Build a snapshot from kept POIs.
    ///
    /// POIs are ordered by distance; ties keep their input order. The raw
    /// count starts at the number of kept POIs.
    pub fn new(category: Category, pois: Vec<Poi>, radius_m: f64) -> Result<Self, SnapshotError> {
        if !category.carries_pois() {
            return Err(SnapshotError::DerivedCategory);
        }
        validate_radius(category, radius_m)?;
        if let Some(stray) = pois.iter().find(|poi| poi.category() != category) {
            return Err(SnapshotError::CategoryMismatch {
                expected: category,
                found: stray.category(),
                name: stray.name().to_owned(),
            });
        }
        let mut sorted = pois;
        sorted.sort_by(|a, b| a.distance_m().total_cmp(&b.distance_m()));
        let source = if sorted.is_empty() {
            DataSource::None
        } else {
            DataSource::Primary
        };
        Ok(Self {
            category,
            raw_count: sorted.len(),
            pois: sorted,
            radius_m,
            rejections: Rejections::default(),
            provider: ProviderStatus::Ok,
            source,
        })
    }

    /// Build a snapshot with no POIs.
    pub fn empty(category: Category, radius_m: f64) -> Result<Self, SnapshotError> {
        Self::new(category, Vec::new(), radius_m)
    }

    /// Record the rejection breakdown. The raw count grows to cover it.
    #[must_use]
    pub fn with_rejections(mut self, rejections: Rejections) -> Self {
        self.rejections = rejections;
        self.raw_count = self
            .raw_count
            .max(self.pois.len().saturating_add(rejections.total()));
        self
    }

    /// Record the number of POIs the provider returned before filtering.
    ///
    /// Values below the kept count are raised to it.
    #[must_use]
    pub fn with_raw_count(mut self, raw_count: usize) -> Self {
        self.raw_count = raw_count.max(self.pois.len());
        self
    }

    /// Record provider error codes for the category.
    #[must_use]
    pub fn with_provider_errors<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.provider = ProviderStatus::Error {
            codes: codes.into_iter().map(Into::into).collect(),
        };
        self
    }

    /// Record which upstream produced the POIs.
    #[must_use]
    pub const fn with_source(mut self, source: DataSource) -> Self {
        self.source = source;
        self
    }

    /// Return a new snapshot keeping only POIs within `radius_m`.
    ///
    /// Dropped POIs are added to the radius rejections. `self` is untouched.
    pub fn restrict(&self, radius_m: f64) -> Result<Self, SnapshotError> {
        validate_radius(self.category, radius_m)?;
        let pois: Vec<Poi> = self
            .pois
            .iter()
            .filter(|poi| poi.distance_m() <= radius_m)
            .cloned()
            .collect();
        let dropped = self.pois.len().saturating_sub(pois.len());
        let rejections = Rejections {
            radius: self.rejections.radius.saturating_add(dropped),
            ..self.rejections
        };
        Ok(Self {
            category: self.category,
            pois,
            raw_count: self.raw_count,
            radius_m,
            rejections,
            provider: self.provider.clone(),
            source: self.source,
        })
    }

    /// Category of every POI in the snapshot.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Kept POIs ordered by distance.
    #[must_use]
    pub fn pois(&self) -> &[Poi] {
        &self.pois
    }

    /// Number of kept POIs.
    #[must_use]
    pub const fn kept_count(&self) -> usize {
        self.pois.len()
    }

    /// Number of POIs the provider returned before filtering.
    #[must_use]
    pub const fn raw_count(&self) -> usize {
        self.raw_count
    }

    /// Radius used for the query in metres.
    #[must_use]
    pub const fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Rejection breakdown.
    #[must_use]
    pub const fn rejections(&self) -> Rejections {
        self.rejections
    }

    /// Provider outcome for the category.
    #[must_use]
    pub const fn provider(&self) -> &ProviderStatus {
        &self.provider
    }

    /// Upstream that produced the POIs.
    #[must_use]
    pub const fn source(&self) -> DataSource {
        self.source
    }

    /// Distance to the nearest kept POI.
    #[must_use]
    pub fn nearest_distance(&self) -> Option<f64> {
        self.pois.first().map(Poi::distance_m)
    }

    /// Number of kept POIs per subcategory.
    #[must_use]
    pub fn subcategory_distribution(&self) -> BTreeMap<String, usize> {
        let mut distribution = BTreeMap::new();
        for poi in &self.pois {
            let count = distribution
                .entry(poi.subcategory().to_owned())
                .or_insert(0_usize);
            *count = count.saturating_add(1);
        }
        distribution
    }
}

fn validate_radius(category: Category, radius_m: f64) -> Result<(), SnapshotError> {
    if radius_m.is_finite() && radius_m > 0.0 {
        Ok(())
    } else {
        Err(SnapshotError::InvalidRadius {
            category,
            radius: radius_m,
        })
    }
}

/// Wire representation of a [`CategorySnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotRecord {
    category: Category,
    pois: Vec<Poi>,
    raw_count: usize,
    radius_m: f64,
    #[serde(default)]
    rejections: Rejections,
    #[serde(default)]
    provider: ProviderStatus,
    #[serde(default)]
    source: DataSource,
}

impl TryFrom<SnapshotRecord> for CategorySnapshot {
    type Error = SnapshotError;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        let mut snapshot = Self::new(record.category, record.pois, record.radius_m)?
            .with_rejections(record.rejections)
            .with_raw_count(record.raw_count)
            .with_source(record.source);
        snapshot.provider = record.provider;
        Ok(snapshot)
    }
}

impl From<CategorySnapshot> for SnapshotRecord {
    fn from(snapshot: CategorySnapshot) -> Self {
        Self {
            category: snapshot.category,
            pois: snapshot.pois,
            raw_count: snapshot.raw_count,
            radius_m: snapshot.radius_m,
            rejections: snapshot.rejections,
            provider: snapshot.provider,
            source: snapshot.source,
        }
    }
}
