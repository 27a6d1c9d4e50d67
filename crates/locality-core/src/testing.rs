use chrono::{TimeZone, Utc};
use uuid::Uuid;

use crate::record::{ListingKind, LocatableRecord};

/// A bare record with no location, price or counters set.
pub(crate) fn record(kind: ListingKind, name: &str) -> LocatableRecord {
    LocatableRecord {
        id: Uuid::new_v4(),
        kind,
        display_name: name.to_string(),
        price: None,
        own_city: None,
        own_lat: None,
        own_lng: None,
        linked_business_city: None,
        linked_business_lat: None,
        linked_business_lng: None,
        category: None,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
        is_active: Some(true),
        views: None,
        rating: None,
    }
}
