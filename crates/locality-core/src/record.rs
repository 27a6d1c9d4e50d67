//! Listing records before and after location resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;

/// Which listing table a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Product,
    Service,
    Business,
}

impl std::fmt::Display for ListingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingKind::Product => write!(f, "product"),
            ListingKind::Service => write!(f, "service"),
            ListingKind::Business => write!(f, "business"),
        }
    }
}

/// Average rating and number of reviews for a business.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// `None` when the business has no ratings yet.
    pub average: Option<f64>,
    pub count: u32,
}

impl RatingSummary {
    /// Sum of ratings divided by their count.
    #[must_use]
    pub fn from_ratings(ratings: &[f64]) -> Self {
        let count = u32::try_from(ratings.len()).unwrap_or(u32::MAX);
        let average = if ratings.is_empty() {
            None
        } else {
            #[allow(clippy::cast_precision_loss)]
            let n = ratings.len() as f64;
            Some(ratings.iter().sum::<f64>() / n)
        };
        Self { average, count }
    }
}

/// A product, service or business with the location fields the resolver reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatableRecord {
    pub id: Uuid,
    pub kind: ListingKind,
    pub display_name: String,
    pub price: Option<f64>,
    pub own_city: Option<String>,
    pub own_lat: Option<f64>,
    pub own_lng: Option<f64>,
    pub linked_business_city: Option<String>,
    pub linked_business_lat: Option<f64>,
    pub linked_business_lng: Option<f64>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: Option<bool>,
    /// View counter used for popularity ordering.
    pub views: Option<u64>,
    pub rating: Option<RatingSummary>,
}

impl LocatableRecord {
    /// Own coordinates when complete, else the linked business's.
    #[must_use]
    pub fn coordinates(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.own_lat, self.own_lng).or_else(|| {
            GeoPoint::from_parts(self.linked_business_lat, self.linked_business_lng)
        })
    }

    #[must_use]
    pub fn average_rating(&self) -> Option<f64> {
        self.rating.and_then(|r| r.average)
    }
}

/// Why a record matched the city filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    Direct,
    BusinessLocation,
    Fallback,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Direct => write!(f, "direct"),
            Provenance::BusinessLocation => write!(f, "business-location"),
            Provenance::Fallback => write!(f, "fallback"),
        }
    }
}

/// A record decorated with its provenance and optional distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    #[serde(flatten)]
    pub record: LocatableRecord,
    pub provenance: Provenance,
    pub distance_km: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_summary_averages_ratings() {
        let summary = RatingSummary::from_ratings(&[5.0, 4.0, 3.0]);
        assert_eq!(summary.count, 3);
        assert!((summary.average.unwrap() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rating_summary_without_ratings_has_no_average() {
        let summary = RatingSummary::from_ratings(&[]);
        assert_eq!(summary.count, 0);
        assert!(summary.average.is_none());
    }

    #[test]
    fn provenance_serializes_kebab_case() {
        let json = serde_json::to_string(&Provenance::BusinessLocation).unwrap();
        assert_eq!(json, "\"business-location\"");
        assert_eq!(Provenance::BusinessLocation.to_string(), "business-location");
    }
}
