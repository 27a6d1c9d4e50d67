//! Location filter accepted by the listing resolvers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::CoreError;

/// Category value that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

/// Ordering applied to resolved listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Newest,
    #[serde(alias = "price-asc")]
    PriceAsc,
    #[serde(alias = "price-desc")]
    PriceDesc,
    Popularity,
    Distance,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Newest => write!(f, "newest"),
            SortKey::PriceAsc => write!(f, "price_asc"),
            SortKey::PriceDesc => write!(f, "price_desc"),
            SortKey::Popularity => write!(f, "popularity"),
            SortKey::Distance => write!(f, "distance"),
        }
    }
}

impl FromStr for SortKey {
    type Err = CoreError;

    /// Accepts both `price_asc` and `price-asc` spellings, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "newest" => Ok(SortKey::Newest),
            "price_asc" => Ok(SortKey::PriceAsc),
            "price_desc" => Ok(SortKey::PriceDesc),
            "popularity" => Ok(SortKey::Popularity),
            "distance" => Ok(SortKey::Distance),
            _ => Err(CoreError::InvalidSortKey(s.to_string())),
        }
    }
}

/// Geographic and attribute filter for one resolver call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationFilter {
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    #[serde(default)]
    pub sort_key: SortKey,
}

impl LocationFilter {
    /// Reference point for distance decoration, when both coordinates are set.
    #[must_use]
    pub fn reference_point(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }

    /// City needle with `*` and `%` removed and surrounding whitespace
    /// trimmed, `None` when nothing is left. The backend predicate and
    /// provenance classification both match on this value.
    #[must_use]
    pub fn city_needle(&self) -> Option<String> {
        let cleaned: String = self
            .city
            .as_deref()?
            .chars()
            .filter(|c| !matches!(c, '*' | '%'))
            .collect();
        let trimmed = cleaned.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    }

    /// Category to match exactly, `None` when unset, blank or `"all"`.
    #[must_use]
    pub fn category_constraint(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES))
    }
}
