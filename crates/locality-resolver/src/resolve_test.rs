use locality_core::{ListingKind, Provenance, SortKey};
use locality_store::{MemorySource, Select, StoreError};
use serde_json::{json, Value};
use uuid::Uuid;

use super::*;
use crate::rows::{BusinessRow, ProductRow, ServiceRow};
use crate::{resolve_businesses, resolve_products, resolve_services, Resolver};

const AUSTIN: (f64, f64) = (30.2672, -97.7431);
const ROUND_ROCK: (f64, f64) = (30.5083, -97.6789);
const HOUSTON: (f64, f64) = (29.7604, -95.3698);

struct FailingSource;

impl RowSource for FailingSource {
    async fn fetch_rows(&self, _query: &Select) -> Result<Vec<Value>, StoreError> {
        Err(StoreError::Api {
            status: 503,
            message: "upstream unavailable".to_owned(),
        })
    }
}

/// Returns every row regardless of the query, like a backend that ignored
/// the city predicate.
struct UnfilteredSource(Vec<Value>);

impl RowSource for UnfilteredSource {
    async fn fetch_rows(&self, _query: &Select) -> Result<Vec<Value>, StoreError> {
        Ok(self.0.clone())
    }
}

struct Fixture<'a> {
    name: &'a str,
    price: Option<f64>,
    city: Option<&'a str>,
    at: Option<(f64, f64)>,
    category: &'a str,
    business: Option<(&'a str, Option<(f64, f64)>)>,
    created_at: &'a str,
    views: Option<u64>,
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self {
            name: "",
            price: None,
            city: None,
            at: None,
            category: "food",
            business: None,
            created_at: "2025-01-01T12:00:00Z",
            views: None,
        }
    }
}

fn listing_row(l: &Fixture<'_>) -> Value {
    let business = l.business.map(|(city, at)| {
        json!({
            "city": city,
            "latitude": at.map(|p| p.0),
            "longitude": at.map(|p| p.1),
        })
    });
    json!({
        "id": Uuid::new_v4().to_string(),
        "name": l.name,
        "price": l.price,
        "city": l.city,
        "latitude": l.at.map(|p| p.0),
        "longitude": l.at.map(|p| p.1),
        "category": l.category,
        "created_at": l.created_at,
        "is_active": true,
        "views": l.views,
        "business": business,
    })
}

fn business_row(name: &str, city: &str, at: Option<(f64, f64)>, ratings: &[f64]) -> Value {
    let reviews: Vec<Value> = ratings.iter().map(|r| json!({ "rating": r })).collect();
    json!({
        "id": Uuid::new_v4().to_string(),
        "name": name,
        "city": city,
        "latitude": at.map(|p| p.0),
        "longitude": at.map(|p| p.1),
        "category": "food",
        "created_at": "2025-01-01T12:00:00Z",
        "is_active": true,
        "views": null,
        "reviews": reviews,
    })
}

fn names(records: &[ResolvedRecord]) -> Vec<&str> {
    records
        .iter()
        .map(|r| r.record.display_name.as_str())
        .collect()
}

/// Two direct Austin matches, one via the owning business, two elsewhere.
fn austin_products() -> MemorySource {
    MemorySource::new().with_table(
        "products",
        vec![
            listing_row(&Fixture {
                name: "Brisket plate",
                price: Some(10.0),
                city: Some("Austin"),
                ..Fixture::default()
            }),
            listing_row(&Fixture {
                name: "Food truck tacos",
                price: Some(12.0),
                business: Some(("Austin", None)),
                ..Fixture::default()
            }),
            listing_row(&Fixture {
                name: "Dallas burger",
                price: Some(3.0),
                city: Some("Dallas"),
                ..Fixture::default()
            }),
            listing_row(&Fixture {
                name: "Breakfast taco",
                price: Some(5.0),
                city: Some("South Austin"),
                business: Some(("Austin", None)),
                ..Fixture::default()
            }),
            listing_row(&Fixture {
                name: "Houston pho",
                price: Some(1.0),
                city: Some("Houston"),
                business: Some(("Houston", None)),
                ..Fixture::default()
            }),
        ],
    )
}

#[tokio::test]
async fn austin_food_by_price_returns_three_classified_records() {
    let source = austin_products();
    let filter = LocationFilter {
        city: Some("Austin".to_owned()),
        category: Some("food".to_owned()),
        sort_key: "price-asc".parse().unwrap(),
        ..LocationFilter::default()
    };

    let records = resolve_products(&source, &filter).await;

    assert_eq!(
        names(&records),
        ["Breakfast taco", "Brisket plate", "Food truck tacos"]
    );
    let provenance: Vec<Provenance> = records.iter().map(|r| r.provenance).collect();
    assert_eq!(
        provenance,
        [
            Provenance::Direct,
            Provenance::Direct,
            Provenance::BusinessLocation
        ]
    );
    assert!(records.iter().all(|r| r.record.kind == ListingKind::Product));
}

#[tokio::test]
async fn fetch_failure_yields_empty_list() {
    let filter = LocationFilter {
        city: Some("Austin".to_owned()),
        ..LocationFilter::default()
    };
    assert!(resolve_products(&FailingSource, &filter).await.is_empty());
    assert!(resolve_services(&FailingSource, &filter).await.is_empty());
    assert!(resolve_businesses(&FailingSource, &filter).await.is_empty());
}

#[tokio::test]
async fn missing_table_is_fail_soft() {
    let source = MemorySource::new();
    let records = resolve_services(&source, &LocationFilter::default()).await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn non_matching_record_is_kept_as_fallback() {
    let source = UnfilteredSource(vec![
        listing_row(&Fixture {
            name: "Austin soap",
            city: Some("Austin"),
            ..Fixture::default()
        }),
        listing_row(&Fixture {
            name: "Nowhere candle",
            ..Fixture::default()
        }),
    ]);
    let filter = LocationFilter {
        city: Some("austin".to_owned()),
        ..LocationFilter::default()
    };

    let records = resolve_products(&source, &filter).await;

    assert_eq!(records.len(), 2);
    let candle = records
        .iter()
        .find(|r| r.record.display_name == "Nowhere candle")
        .unwrap();
    assert_eq!(candle.provenance, Provenance::Fallback);
}

#[tokio::test]
async fn wildcard_in_city_still_classifies_direct() {
    let source = MemorySource::new().with_table(
        "products",
        vec![listing_row(&Fixture {
            name: "Brisket plate",
            city: Some("Austin"),
            ..Fixture::default()
        })],
    );
    let filter = LocationFilter {
        city: Some("Austin%".to_owned()),
        ..LocationFilter::default()
    };

    let records = resolve_products(&source, &filter).await;

    assert_eq!(names(&records), ["Brisket plate"]);
    assert_eq!(records[0].provenance, Provenance::Direct);
}

#[tokio::test]
async fn decimal_string_price_survives_price_filter() {
    let mut row = listing_row(&Fixture {
        name: "Queso",
        ..Fixture::default()
    });
    row["price"] = json!("8.50");
    let source = MemorySource::new().with_table("products", vec![row]);
    let filter = LocationFilter {
        max_price: Some(10.0),
        ..LocationFilter::default()
    };

    let records = resolve_products(&source, &filter).await;

    assert_eq!(names(&records), ["Queso"]);
    assert_eq!(records[0].record.price, Some(8.5));
}

#[tokio::test]
async fn price_bounds_are_inclusive() {
    let source = MemorySource::new().with_table(
        "services",
        vec![
            listing_row(&Fixture {
                name: "Exactly fifty",
                price: Some(50.0),
                ..Fixture::default()
            }),
            listing_row(&Fixture {
                name: "Fifty one",
                price: Some(51.0),
                ..Fixture::default()
            }),
            listing_row(&Fixture {
                name: "Unpriced",
                ..Fixture::default()
            }),
        ],
    );
    let filter = LocationFilter {
        min_price: Some(50.0),
        max_price: Some(50.0),
        ..LocationFilter::default()
    };

    let records = resolve_services(&source, &filter).await;
    assert_eq!(names(&records), ["Exactly fifty"]);
}

#[tokio::test]
async fn inactive_records_are_excluded_and_unset_kept() {
    let mut inactive = listing_row(&Fixture {
        name: "Retired",
        ..Fixture::default()
    });
    inactive["is_active"] = json!(false);
    let mut unset = listing_row(&Fixture {
        name: "Legacy",
        ..Fixture::default()
    });
    unset["is_active"] = Value::Null;

    let source = MemorySource::new().with_table("products", vec![inactive, unset]);
    let records = resolve_products(&source, &LocationFilter::default()).await;
    assert_eq!(names(&records), ["Legacy"]);
}

#[tokio::test]
async fn distance_sort_puts_unlocated_records_last() {
    let source = MemorySource::new().with_table(
        "products",
        vec![
            listing_row(&Fixture {
                name: "No coordinates",
                ..Fixture::default()
            }),
            listing_row(&Fixture {
                name: "Houston",
                at: Some(HOUSTON),
                ..Fixture::default()
            }),
            listing_row(&Fixture {
                name: "Via business in Round Rock",
                business: Some(("Round Rock", Some(ROUND_ROCK))),
                ..Fixture::default()
            }),
            listing_row(&Fixture {
                name: "Downtown",
                at: Some(AUSTIN),
                ..Fixture::default()
            }),
        ],
    );
    let filter = LocationFilter {
        latitude: Some(AUSTIN.0),
        longitude: Some(AUSTIN.1),
        sort_key: SortKey::Distance,
        ..LocationFilter::default()
    };

    let records = resolve_products(&source, &filter).await;

    assert_eq!(
        names(&records),
        [
            "Downtown",
            "Via business in Round Rock",
            "Houston",
            "No coordinates"
        ]
    );
    assert!(records[0].distance_km.unwrap() < 1e-9);
    assert!(records[3].distance_km.is_none());
}

#[tokio::test]
async fn radius_drops_far_records_but_keeps_unlocated() {
    let source = MemorySource::new().with_table(
        "products",
        vec![
            listing_row(&Fixture {
                name: "Round Rock",
                at: Some(ROUND_ROCK),
                ..Fixture::default()
            }),
            listing_row(&Fixture {
                name: "Houston",
                at: Some(HOUSTON),
                ..Fixture::default()
            }),
            listing_row(&Fixture {
                name: "Unknown",
                ..Fixture::default()
            }),
        ],
    );
    let filter = LocationFilter {
        latitude: Some(AUSTIN.0),
        longitude: Some(AUSTIN.1),
        radius_km: Some(50.0),
        sort_key: SortKey::Distance,
        ..LocationFilter::default()
    };

    let records = resolve_products(&source, &filter).await;
    assert_eq!(names(&records), ["Round Rock", "Unknown"]);
}

#[tokio::test]
async fn businesses_aggregate_ratings_and_break_distance_ties_by_rating() {
    let source = MemorySource::new().with_table(
        "businesses",
        vec![
            business_row("Unrated", "Austin", None, &[]),
            business_row("Okay diner", "Austin", None, &[3.0, 2.0]),
            business_row("Great cafe", "Austin", None, &[5.0, 4.0, 5.0]),
            business_row("Located grill", "Austin", Some(AUSTIN), &[1.0]),
            business_row("Dallas deli", "Dallas", None, &[5.0]),
        ],
    );
    let filter = LocationFilter {
        city: Some("Austin".to_owned()),
        latitude: Some(AUSTIN.0),
        longitude: Some(AUSTIN.1),
        sort_key: SortKey::Distance,
        ..LocationFilter::default()
    };

    let records = resolve_businesses(&source, &filter).await;

    assert_eq!(
        names(&records),
        ["Located grill", "Great cafe", "Okay diner", "Unrated"]
    );
    let great = records[1].record.rating.unwrap();
    assert_eq!(great.count, 3);
    assert!((great.average.unwrap() - 14.0 / 3.0).abs() < 1e-9);
    assert!(records[3].record.rating.unwrap().average.is_none());
    assert!(records.iter().all(|r| r.provenance == Provenance::Direct));
}

#[tokio::test]
async fn popularity_sort_orders_by_views_with_missing_last() {
    let source = MemorySource::new().with_table(
        "services",
        vec![
            listing_row(&Fixture {
                name: "Quiet",
                views: Some(3),
                ..Fixture::default()
            }),
            listing_row(&Fixture {
                name: "Unknown",
                ..Fixture::default()
            }),
            listing_row(&Fixture {
                name: "Popular",
                views: Some(900),
                ..Fixture::default()
            }),
        ],
    );
    let filter = LocationFilter {
        sort_key: SortKey::Popularity,
        ..LocationFilter::default()
    };

    let records = resolve_services(&source, &filter).await;
    assert_eq!(names(&records), ["Popular", "Quiet", "Unknown"]);
}

#[tokio::test]
async fn default_sort_is_newest_first() {
    let source = MemorySource::new().with_table(
        "products",
        vec![
            listing_row(&Fixture {
                name: "Old",
                created_at: "2024-01-01T00:00:00Z",
                ..Fixture::default()
            }),
            listing_row(&Fixture {
                name: "New",
                created_at: "2025-06-01T00:00:00Z",
                ..Fixture::default()
            }),
        ],
    );
    let records = resolve_products(&source, &LocationFilter::default()).await;
    assert_eq!(names(&records), ["New", "Old"]);
}

#[tokio::test]
async fn malformed_rows_are_skipped() {
    let source = UnfilteredSource(vec![
        json!({ "id": "not-a-uuid", "name": "Broken" }),
        listing_row(&Fixture {
            name: "Fine",
            ..Fixture::default()
        }),
    ]);
    let records = resolve_products(&source, &LocationFilter::default()).await;
    assert_eq!(names(&records), ["Fine"]);
}

#[tokio::test]
async fn resolver_dispatches_on_kind() {
    let source = austin_products().with_table(
        "businesses",
        vec![business_row("Joe's", "Austin", None, &[4.0])],
    );
    let resolver = Resolver::new(source);
    let filter = LocationFilter {
        city: Some("Austin".to_owned()),
        ..LocationFilter::default()
    };

    assert_eq!(resolver.resolve(ListingKind::Product, &filter).await.len(), 3);
    assert_eq!(
        names(&resolver.resolve(ListingKind::Business, &filter).await),
        ["Joe's"]
    );
    assert!(resolver
        .resolve(ListingKind::Service, &filter)
        .await
        .is_empty());
}

#[tokio::test]
async fn generic_resolve_matches_named_entry_points() {
    let source = austin_products();
    let filter = LocationFilter {
        city: Some("Austin".to_owned()),
        sort_key: SortKey::PriceAsc,
        ..LocationFilter::default()
    };
    let via_generic = resolve::<ProductRow, _>(&source, &filter).await;
    let via_named = resolve_products(&source, &filter).await;
    assert_eq!(names(&via_generic), names(&via_named));

    let none = resolve::<ServiceRow, _>(&source, &filter).await;
    assert!(none.is_empty());
    let none = resolve::<BusinessRow, _>(&source, &filter).await;
    assert!(none.is_empty());
}
