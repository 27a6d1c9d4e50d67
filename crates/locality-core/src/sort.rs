//! Result ordering for resolved listings.
//!
//! All orderings are stable, and a record missing the sort field always goes
//! after every record that has it.

use std::cmp::Ordering;

use crate::filter::SortKey;
use crate::record::ResolvedRecord;

/// `Some` before `None`; two `Some` values compared with `cmp`.
fn present_first<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn by_distance(a: &ResolvedRecord, b: &ResolvedRecord) -> Ordering {
    match (a.distance_km, b.distance_km) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        // Only businesses carry ratings, so this tie-break is a no-op elsewhere.
        (None, None) => present_first(a.record.average_rating(), b.record.average_rating(), |x, y| {
            y.total_cmp(&x)
        }),
    }
}

/// Order `records` in place for `key`.
pub fn sort_records(records: &mut [ResolvedRecord], key: SortKey) {
    match key {
        SortKey::PriceAsc => records
            .sort_by(|a, b| present_first(a.record.price, b.record.price, |x, y| x.total_cmp(&y))),
        SortKey::PriceDesc => records
            .sort_by(|a, b| present_first(a.record.price, b.record.price, |x, y| y.total_cmp(&x))),
        SortKey::Popularity => {
            records.sort_by(|a, b| present_first(a.record.views, b.record.views, |x, y| y.cmp(&x)));
        }
        SortKey::Newest => records.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at)),
        SortKey::Distance => records.sort_by(by_distance),
    }
}
