use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Extension, Json,
};
use locality_core::{ListingKind, LocationFilter, ResolvedRecord, SortKey};
use locality_store::RowSource;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Default, Deserialize)]
pub(super) struct NearbyQuery {
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: Option<String>,
}

impl NearbyQuery {
    /// Validates the raw query and builds the resolver filter.
    fn into_filter(self) -> Result<LocationFilter, String> {
        let sort_key = match self.sort.as_deref() {
            Some(raw) => raw.parse::<SortKey>().map_err(|e| e.to_string())?,
            None => SortKey::default(),
        };
        if self.lat.is_some() != self.lng.is_some() {
            return Err("lat and lng must be supplied together".to_string());
        }
        if sort_key == SortKey::Distance && self.lat.is_none() {
            return Err("sort=distance requires lat and lng".to_string());
        }
        if let Some(radius) = self.radius_km {
            if radius <= 0.0 {
                return Err("radius_km must be positive".to_string());
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err("min_price must not exceed max_price".to_string());
            }
        }

        Ok(LocationFilter {
            city: self.city,
            latitude: self.lat,
            longitude: self.lng,
            radius_km: self.radius_km,
            category: self.category,
            min_price: self.min_price,
            max_price: self.max_price,
            sort_key,
        })
    }
}

fn parse_kind(raw: &str) -> Option<ListingKind> {
    match raw {
        "products" => Some(ListingKind::Product),
        "services" => Some(ListingKind::Service),
        "businesses" => Some(ListingKind::Business),
        _ => None,
    }
}

pub(super) async fn list_nearby<S: RowSource + 'static>(
    State(state): State<AppState<S>>,
    Extension(req_id): Extension<RequestId>,
    Path(kind): Path<String>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<ResolvedRecord>>>, ApiError> {
    let Some(kind) = parse_kind(&kind) else {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("unknown listing kind \"{kind}\""),
        ));
    };
    let Query(query) =
        query.map_err(|e| ApiError::new(req_id.0.clone(), "bad_request", e.body_text()))?;
    let filter = query
        .into_filter()
        .map_err(|msg| ApiError::new(req_id.0.clone(), "bad_request", msg))?;

    let data = state.resolver.resolve(kind, &filter).await;
    tracing::info!(
        request_id = %req_id.0,
        kind = %kind,
        results = data.len(),
        "nearby listings resolved"
    );

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
