use std::future::Future;

use serde_json::Value;

use crate::error::StoreError;
use crate::query::Select;

/// Anything that can answer a [`Select`] with raw JSON rows.
///
/// Implemented by [`crate::StoreClient`] for the hosted backend and by
/// [`crate::MemorySource`] for tests and offline runs. Rows carry embedded
/// joins as nested objects (or arrays for one-to-many relations) under the
/// join alias.
pub trait RowSource: Send + Sync {
    /// Runs `query` and returns the matching rows.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the rows cannot be fetched.
    fn fetch_rows(
        &self,
        query: &Select,
    ) -> impl Future<Output = Result<Vec<Value>, StoreError>> + Send;
}

impl<S: RowSource> RowSource for std::sync::Arc<S> {
    fn fetch_rows(
        &self,
        query: &Select,
    ) -> impl Future<Output = Result<Vec<Value>, StoreError>> + Send {
        S::fetch_rows(self, query)
    }
}
