//! Typed row shapes for each listing table.
//!
//! The backend returns untyped JSON. Every row is parsed exactly once into
//! one of these DTOs right after the fetch, then converted into a
//! [`LocatableRecord`]; nothing downstream touches raw JSON.

use chrono::{DateTime, Utc};
use locality_core::{ListingKind, LocatableRecord, LocationFilter, RatingSummary};
use locality_store::{Filter, IsValue, Select};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Alias the owning business is embedded under.
const BUSINESS_ALIAS: &str = "business";
const BUSINESS_TABLE: &str = "businesses";
const BUSINESS_LOCATION_COLUMNS: &[&str] = &["city", "latitude", "longitude"];

const REVIEWS_ALIAS: &str = "reviews";
const REVIEWS_TABLE: &str = "reviews";

const LISTING_COLUMNS: &[&str] = &[
    "id",
    "name",
    "price",
    "city",
    "latitude",
    "longitude",
    "category",
    "created_at",
    "is_active",
    "views",
];

const BUSINESS_COLUMNS: &[&str] = &[
    "id",
    "name",
    "city",
    "latitude",
    "longitude",
    "category",
    "created_at",
    "is_active",
    "views",
];

/// A listing table the resolver knows how to query and parse.
pub trait Listing: DeserializeOwned {
    const KIND: ListingKind;
    const TABLE: &'static str;

    /// Builds the server-side query for `filter`.
    fn query(filter: &LocationFilter) -> Select;

    fn into_record(self) -> LocatableRecord;
}

/// Location fields of the business a product or service belongs to.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkedBusiness {
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Columns shared by the product and service tables.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingFields {
    pub id: Uuid,
    pub name: String,
    #[serde(default, deserialize_with = "price_from_number_or_text")]
    pub price: Option<f64>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: Option<bool>,
    pub views: Option<u64>,
    #[serde(default)]
    pub business: Option<LinkedBusiness>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Numeric columns may arrive as JSON numbers or as decimal strings.
fn price_from_number_or_text<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("price is not a number: {text:?}"))),
    }
}

impl ListingFields {
    fn into_record(self, kind: ListingKind) -> LocatableRecord {
        let business = self.business.unwrap_or_default();
        LocatableRecord {
            id: self.id,
            kind,
            display_name: self.name,
            price: self.price,
            own_city: self.city,
            own_lat: self.latitude,
            own_lng: self.longitude,
            linked_business_city: business.city,
            linked_business_lat: business.latitude,
            linked_business_lng: business.longitude,
            category: self.category,
            created_at: self.created_at,
            is_active: self.is_active,
            views: self.views,
            rating: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ProductRow(pub ListingFields);

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ServiceRow(pub ListingFields);

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRow {
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusinessRow {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: Option<bool>,
    pub views: Option<u64>,
    #[serde(default)]
    pub reviews: Vec<ReviewRow>,
}

/// `is_active = true OR is_active IS NULL`.
fn active_filter() -> Filter {
    Filter::Or(vec![
        Filter::is("is_active", IsValue::True),
        Filter::is("is_active", IsValue::Null),
    ])
}

/// Query shared by products and services: own city OR linked business city.
fn listing_query(table: &str, filter: &LocationFilter) -> Select {
    let mut query = Select::from(table, LISTING_COLUMNS)
        .join(BUSINESS_ALIAS, BUSINESS_TABLE, BUSINESS_LOCATION_COLUMNS)
        .filter(active_filter());

    if let Some(city) = filter.city_needle() {
        query = query.or(vec![
            Filter::contains("city", &city),
            Filter::contains(&format!("{BUSINESS_ALIAS}.city"), &city),
        ]);
    }
    if let Some(category) = filter.category_constraint() {
        query = query.eq("category", category);
    }
    if let Some(min) = filter.min_price {
        query = query.gte("price", min);
    }
    if let Some(max) = filter.max_price {
        query = query.lte("price", max);
    }
    query.order("created_at", false)
}

impl Listing for ProductRow {
    const KIND: ListingKind = ListingKind::Product;
    const TABLE: &'static str = "products";

    fn query(filter: &LocationFilter) -> Select {
        listing_query(Self::TABLE, filter)
    }

    fn into_record(self) -> LocatableRecord {
        self.0.into_record(Self::KIND)
    }
}

impl Listing for ServiceRow {
    const KIND: ListingKind = ListingKind::Service;
    const TABLE: &'static str = "services";

    fn query(filter: &LocationFilter) -> Select {
        listing_query(Self::TABLE, filter)
    }

    fn into_record(self) -> LocatableRecord {
        self.0.into_record(Self::KIND)
    }
}

impl Listing for BusinessRow {
    const KIND: ListingKind = ListingKind::Business;
    const TABLE: &'static str = "businesses";

    /// Businesses match on their own city only and carry no price.
    fn query(filter: &LocationFilter) -> Select {
        let mut query = Select::from(Self::TABLE, BUSINESS_COLUMNS)
            .join(REVIEWS_ALIAS, REVIEWS_TABLE, &["rating"])
            .filter(active_filter());

        if let Some(city) = filter.city_needle() {
            query = query.filter(Filter::contains("city", &city));
        }
        if let Some(category) = filter.category_constraint() {
            query = query.eq("category", category);
        }
        query.order("created_at", false)
    }

    fn into_record(self) -> LocatableRecord {
        let ratings: Vec<f64> = self.reviews.iter().filter_map(|r| r.rating).collect();
        LocatableRecord {
            id: self.id,
            kind: Self::KIND,
            display_name: self.name,
            price: None,
            own_city: self.city,
            own_lat: self.latitude,
            own_lng: self.longitude,
            linked_business_city: None,
            linked_business_lat: None,
            linked_business_lng: None,
            category: self.category,
            created_at: self.created_at,
            is_active: self.is_active,
            views: self.views,
            rating: Some(RatingSummary::from_ratings(&ratings)),
        }
    }
}
