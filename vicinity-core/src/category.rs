//! POI categories scored by the engine and their distance-decay modes.
//!
//! The enum offers compile-time safety for weight, radius, and rule lookups.
//!
//! # Examples
//! ```
//! use vicinity_core::{Category, DecayMode};
//!
//! assert_eq!(Category::Transport.as_str(), "transport");
//! assert_eq!(Category::Shops.default_decay_mode(), DecayMode::Daily);
//! ```

use serde::{Deserialize, Serialize};

/// A POI category tracked by location profiles.
///
/// [`Category::Quiet`] is derived from the noise assessment rather than from
/// fetched POIs. Profiles may target it with rules but never weight it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Grocery stores, supermarkets, and everyday retail.
    Shops,
    /// Public transport stops and stations.
    Transport,
    /// Nurseries, schools, and universities.
    Education,
    /// Pharmacies, clinics, and hospitals.
    Health,
    /// Parks, gardens, and reserves worth walking to.
    NaturePlace,
    /// Background greenery and water near the address.
    NatureBackground,
    /// Sports grounds, playgrounds, and leisure venues.
    Leisure,
    /// Restaurants, cafés, and bars.
    Food,
    /// Banks and cash machines.
    Finance,
    /// Parking, fuel, and road access used as a car-friendliness proxy.
    CarAccess,
    /// Quietness derived from nearby noise sources.
    Quiet,
}

impl Category {
    /// Every category that carries fetched POIs, in canonical order.
    pub const POI_CATEGORIES: [Self; 10] = [
        Self::Shops,
        Self::Transport,
        Self::Education,
        Self::Health,
        Self::NaturePlace,
        Self::NatureBackground,
        Self::Leisure,
        Self::Food,
        Self::Finance,
        Self::CarAccess,
    ];

    /// Return the category as a lowercase `&str`.
    ///
    /// # Examples
    /// ```
    /// use vicinity_core::Category;
    ///
    /// assert_eq!(Category::NaturePlace.as_str(), "nature_place");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shops => "shops",
            Self::Transport => "transport",
            Self::Education => "education",
            Self::Health => "health",
            Self::NaturePlace => "nature_place",
            Self::NatureBackground => "nature_background",
            Self::Leisure => "leisure",
            Self::Food => "food",
            Self::Finance => "finance",
            Self::CarAccess => "car_access",
            Self::Quiet => "quiet",
        }
    }

    /// Human-readable label used in key factors and explanations.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shops => "Shops",
            Self::Transport => "Public transport",
            Self::Education => "Education",
            Self::Health => "Health care",
            Self::NaturePlace => "Parks and gardens",
            Self::NatureBackground => "Surrounding greenery",
            Self::Leisure => "Sport and leisure",
            Self::Food => "Food and drink",
            Self::Finance => "Banks and finance",
            Self::CarAccess => "Car access",
            Self::Quiet => "Quietness",
        }
    }

    /// Report whether the category is populated from fetched POIs.
    #[must_use]
    pub const fn carries_pois(self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Decay mode applied when a profile does not override it.
    #[must_use]
    pub const fn default_decay_mode(self) -> DecayMode {
        match self {
            Self::Shops | Self::Transport | Self::Finance => DecayMode::Daily,
            Self::NatureBackground => DecayMode::Background,
            Self::Education
            | Self::Health
            | Self::NaturePlace
            | Self::Leisure
            | Self::Food
            | Self::CarAccess
            | Self::Quiet => DecayMode::Destination,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shops" => Ok(Self::Shops),
            "transport" => Ok(Self::Transport),
            "education" => Ok(Self::Education),
            "health" => Ok(Self::Health),
            "nature_place" => Ok(Self::NaturePlace),
            "nature_background" => Ok(Self::NatureBackground),
            "leisure" => Ok(Self::Leisure),
            "food" => Ok(Self::Food),
            "finance" => Ok(Self::Finance),
            "car_access" => Ok(Self::CarAccess),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("unknown category '{s}'")),
        }
    }
}

/// Shape of the distance-decay curve used for a category.
///
/// Everyday errands lose value quickly with distance, destinations tolerate
/// a longer walk, and background greenery only counts when it is close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayMode {
    /// Shops, stops, and cash machines.
    Daily,
    /// Parks, schools, clinics, and venues.
    Destination,
    /// Greenery and water around the address.
    Background,
}

impl DecayMode {
    /// Share of the radius over which a POI keeps full weight.
    #[must_use]
    pub const fn plateau(self) -> f64 {
        match self {
            Self::Daily => 0.25,
            Self::Destination => 0.30,
            Self::Background => 0.20,
        }
    }

    /// Exponent shaping the fall-off between the plateau and the radius.
    #[must_use]
    pub const fn exponent(self) -> f64 {
        match self {
            Self::Daily => 1.5,
            Self::Destination => 1.0,
            Self::Background => 2.0,
        }
    }
}
