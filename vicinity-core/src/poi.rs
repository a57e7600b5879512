//! Points of interest found around the subject location.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Category;

/// A point of interest measured from the subject point.
///
/// Fields are private so a constructed value always carries a finite,
/// non-negative distance. Deserialisation goes through the same validation.
///
/// # Examples
/// ```
/// use vicinity_core::{Category, Poi};
///
/// # fn main() -> Result<(), vicinity_core::PoiError> {
/// let poi = Poi::new("Corner Market", Category::Shops, "supermarket", 120.0)?;
/// assert_eq!(poi.distance_m(), 120.0);
/// assert!(Poi::new("Ghost", Category::Shops, "kiosk", -1.0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PoiRecord", into = "PoiRecord")]
pub struct Poi {
    name: String,
    category: Category,
    subcategory: String,
    distance_m: f64,
    badges: Vec<String>,
}

/// Errors returned when constructing a [`Poi`].
#[derive(Debug, Error, PartialEq)]
pub enum PoiError {
    /// No distance was supplied.
    #[error("point of interest '{name}' has no distance")]
    MissingDistance {
        /// Name of the rejected POI.
        name: String,
    },
    /// The distance was NaN or infinite.
    #[error("point of interest '{name}' has a non-finite distance")]
    NonFiniteDistance {
        /// Name of the rejected POI.
        name: String,
    },
    /// The distance was below zero.
    #[error("point of interest '{name}' has negative distance {distance}")]
    NegativeDistance {
        /// Name of the rejected POI.
        name: String,
        /// Offending distance in metres.
        distance: f64,
    },
    /// The quiet category is derived and cannot hold POIs.
    #[error("point of interest '{name}' cannot belong to the derived quiet category")]
    DerivedCategory {
        /// Name of the rejected POI.
        name: String,
    },
}

impl Poi {
    /// Validate and construct a [`Poi`] without badges.
    pub fn new(
        name: impl Into<String>,
        category: Category,
        subcategory: impl Into<String>,
        distance_m: f64,
    ) -> Result<Self, PoiError> {
        let label: String = name.into();
        if !category.carries_pois() {
            return Err(PoiError::DerivedCategory { name: label });
        }
        if !distance_m.is_finite() {
            return Err(PoiError::NonFiniteDistance { name: label });
        }
        if distance_m < 0.0 {
            return Err(PoiError::NegativeDistance {
                name: label,
                distance: distance_m,
            });
        }
        Ok(Self {
            name: label,
            category,
            subcategory: subcategory.into(),
            distance_m,
            badges: Vec::new(),
        })
    }

    /// Attach display badges such as "24h" or "wheelchair".
    #[must_use]
    pub fn with_badges<I, S>(mut self, badges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.badges = badges.into_iter().map(Into::into).collect();
        self
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category the POI was fetched for.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Provider subcategory, for example `supermarket` or `tram_stop`.
    #[must_use]
    pub fn subcategory(&self) -> &str {
        &self.subcategory
    }

    /// Distance from the subject point in metres.
    #[must_use]
    pub const fn distance_m(&self) -> f64 {
        self.distance_m
    }

    /// Display badges.
    #[must_use]
    pub fn badges(&self) -> &[String] {
        &self.badges
    }
}

/// Wire representation of a [`Poi`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PoiRecord {
    name: String,
    category: Category,
    #[serde(default)]
    subcategory: String,
    distance_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    badges: Vec<String>,
}

impl TryFrom<PoiRecord> for Poi {
    type Error = PoiError;

    fn try_from(record: PoiRecord) -> Result<Self, Self::Error> {
        let PoiRecord {
            name,
            category,
            subcategory,
            distance_m,
            badges,
        } = record;
        let Some(distance) = distance_m else {
            return Err(PoiError::MissingDistance { name });
        };
        Ok(Self::new(name, category, subcategory, distance)?.with_badges(badges))
    }
}

impl From<Poi> for PoiRecord {
    fn from(poi: Poi) -> Self {
        Self {
            name: poi.name,
            category: poi.category,
            subcategory: poi.subcategory,
            distance_m: Some(poi.distance_m),
            badges: poi.badges,
        }
    }
}
