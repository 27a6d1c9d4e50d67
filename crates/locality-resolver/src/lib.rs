//! Location-aware resolution of products, services and businesses.
//!
//! Each resolver sends one filtered query to a [`RowSource`], parses the
//! rows into typed DTOs, classifies provenance, decorates distance and
//! sorts. Resolvers never fail: a fetch error is logged and produces an
//! empty list.

mod resolve;
mod rows;
mod slot;

use locality_core::{AppConfig, ListingKind, LocationFilter, ResolvedRecord};
use locality_store::{RowSource, StoreClient, StoreError, StoreSettings};

pub use resolve::resolve;
pub use rows::{
    BusinessRow, LinkedBusiness, Listing, ListingFields, ProductRow, ReviewRow, ServiceRow,
};
pub use slot::{QuerySlot, Ticket};

/// Products whose own city or owning business's city matches the filter.
pub async fn resolve_products<S: RowSource>(
    source: &S,
    filter: &LocationFilter,
) -> Vec<ResolvedRecord> {
    resolve::<ProductRow, S>(source, filter).await
}

/// Services whose own city or owning business's city matches the filter.
pub async fn resolve_services<S: RowSource>(
    source: &S,
    filter: &LocationFilter,
) -> Vec<ResolvedRecord> {
    resolve::<ServiceRow, S>(source, filter).await
}

/// Businesses in the filter's city, with aggregated review ratings.
pub async fn resolve_businesses<S: RowSource>(
    source: &S,
    filter: &LocationFilter,
) -> Vec<ResolvedRecord> {
    resolve::<BusinessRow, S>(source, filter).await
}

/// Resolvers bound to one injected [`RowSource`].
#[derive(Debug, Clone)]
pub struct Resolver<S> {
    source: S,
}

impl Resolver<StoreClient> {
    /// Resolver over the hosted backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the HTTP client cannot be built or the
    /// store URL does not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        let settings = StoreSettings {
            timeout_secs: config.store_timeout_secs,
            user_agent: config.store_user_agent.clone(),
            max_retries: config.store_max_retries,
            backoff_base_ms: config.store_retry_backoff_base_ms,
        };
        let client = StoreClient::new(&config.store_url, &config.store_key, settings)?;
        Ok(Self::new(client))
    }
}

impl<S: RowSource> Resolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn products(&self, filter: &LocationFilter) -> Vec<ResolvedRecord> {
        resolve_products(&self.source, filter).await
    }

    pub async fn services(&self, filter: &LocationFilter) -> Vec<ResolvedRecord> {
        resolve_services(&self.source, filter).await
    }

    pub async fn businesses(&self, filter: &LocationFilter) -> Vec<ResolvedRecord> {
        resolve_businesses(&self.source, filter).await
    }

    /// Dispatches on `kind`.
    pub async fn resolve(&self, kind: ListingKind, filter: &LocationFilter) -> Vec<ResolvedRecord> {
        match kind {
            ListingKind::Product => self.products(filter).await,
            ListingKind::Service => self.services(filter).await,
            ListingKind::Business => self.businesses(filter).await,
        }
    }
}
