//! Provenance classification and distance decoration.
//!
//! Classification is descriptive only: the backend query already narrowed the
//! candidate set with an OR across both city columns, so nothing is dropped
//! here. Records that match neither city are kept as `fallback`.

use crate::filter::LocationFilter;
use crate::record::{LocatableRecord, Provenance, ResolvedRecord};

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

/// Decide why `record` matched `filter.city`. Own city wins over the
/// linked business city.
#[must_use]
pub fn provenance_for(record: &LocatableRecord, filter: &LocationFilter) -> Provenance {
    let Some(city) = filter.city_needle() else {
        return Provenance::Fallback;
    };
    if contains_ignore_case(record.own_city.as_deref(), &city) {
        Provenance::Direct
    } else if contains_ignore_case(record.linked_business_city.as_deref(), &city) {
        Provenance::BusinessLocation
    } else {
        Provenance::Fallback
    }
}

/// Classify one record and attach its distance from the filter's reference
/// point, when both sides have coordinates.
#[must_use]
pub fn classify(record: LocatableRecord, filter: &LocationFilter) -> ResolvedRecord {
    let provenance = provenance_for(&record, filter);
    let distance_km = filter
        .reference_point()
        .zip(record.coordinates())
        .map(|(origin, target)| origin.distance_km_to(&target));

    ResolvedRecord {
        record,
        provenance,
        distance_km,
    }
}

/// `false` only when a radius is set and the computed distance exceeds it.
/// Records without a distance are never excluded.
#[must_use]
pub fn within_radius(resolved: &ResolvedRecord, filter: &LocationFilter) -> bool {
    match (filter.radius_km, resolved.distance_km) {
        (Some(radius), Some(distance)) => distance <= radius,
        _ => true,
    }
}
