use locality_core::{classify, sort_records, within_radius, LocationFilter, ResolvedRecord};
use locality_store::RowSource;
use serde_json::Value;

use crate::rows::Listing;

/// Fetch, parse, classify, radius-filter and sort one listing table.
///
/// Fail-soft: a fetch error is logged and yields an empty list. Rows that
/// do not match the table's DTO are logged and skipped individually.
pub async fn resolve<L, S>(source: &S, filter: &LocationFilter) -> Vec<ResolvedRecord>
where
    L: Listing,
    S: RowSource,
{
    let query = L::query(filter);
    let rows = match source.fetch_rows(&query).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(
                table = L::TABLE,
                error = %e,
                "listing fetch failed, returning no results"
            );
            return Vec::new();
        }
    };

    let fetched = rows.len();
    let mut resolved: Vec<ResolvedRecord> = parse_rows::<L>(rows)
        .map(|record| classify(record, filter))
        .filter(|r| within_radius(r, filter))
        .collect();
    sort_records(&mut resolved, filter.sort_key);

    tracing::debug!(
        table = L::TABLE,
        fetched,
        returned = resolved.len(),
        sort = %filter.sort_key,
        "resolved listings"
    );
    resolved
}

fn parse_rows<L: Listing>(
    rows: Vec<Value>,
) -> impl Iterator<Item = locality_core::LocatableRecord> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value::<L>(row) {
            Ok(parsed) => Some(parsed.into_record()),
            Err(e) => {
                tracing::warn!(
                    table = L::TABLE,
                    index,
                    error = %e,
                    "skipping row that failed to parse"
                );
                None
            }
        })
}

#[cfg(test)]
#[path = "resolve_test.rs"]
mod tests;
