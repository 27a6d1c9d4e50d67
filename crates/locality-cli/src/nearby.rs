//! `nearby` command: resolve listings and print them as JSON.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use futures::stream::{self, StreamExt};
use locality_core::{ListingKind, LocationFilter, ResolvedRecord};
use locality_resolver::Resolver;
use locality_store::{MemorySource, RowSource};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Products,
    Services,
    Businesses,
    /// All three, keyed by kind
    All,
}

impl KindArg {
    fn kinds(self) -> Vec<ListingKind> {
        match self {
            KindArg::Products => vec![ListingKind::Product],
            KindArg::Services => vec![ListingKind::Service],
            KindArg::Businesses => vec![ListingKind::Business],
            KindArg::All => vec![
                ListingKind::Product,
                ListingKind::Service,
                ListingKind::Business,
            ],
        }
    }
}

/// Loads `{ "products": [...], "services": [...], "businesses": [...] }`.
pub(crate) fn load_fixtures(path: &Path) -> anyhow::Result<MemorySource> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading fixtures from {}", path.display()))?;
    let tables: HashMap<String, Vec<Value>> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing fixtures in {}", path.display()))?;

    Ok(tables
        .into_iter()
        .fold(MemorySource::new(), |source, (name, rows)| {
            source.with_table(&name, rows)
        }))
}

/// Resolves every requested kind concurrently, preserving request order.
pub(crate) async fn resolve_kinds<S: RowSource>(
    resolver: &Resolver<S>,
    kind: KindArg,
    filter: &LocationFilter,
) -> Vec<(ListingKind, Vec<ResolvedRecord>)> {
    let kinds = kind.kinds();
    let concurrency = kinds.len();
    stream::iter(kinds)
        .map(|k| async move { (k, resolver.resolve(k, filter).await) })
        .buffered(concurrency)
        .collect()
        .await
}

fn render(kind: KindArg, results: Vec<(ListingKind, Vec<ResolvedRecord>)>) -> anyhow::Result<String> {
    let value = if kind == KindArg::All {
        let keyed: serde_json::Map<String, Value> = results
            .into_iter()
            .map(|(k, records)| Ok((k.to_string(), serde_json::to_value(records)?)))
            .collect::<Result<_, serde_json::Error>>()?;
        Value::Object(keyed)
    } else {
        let records: Vec<ResolvedRecord> = results.into_iter().flat_map(|(_, r)| r).collect();
        serde_json::to_value(records)?
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

async fn print_nearby<S: RowSource>(
    resolver: &Resolver<S>,
    kind: KindArg,
    filter: &LocationFilter,
) -> anyhow::Result<()> {
    let results = resolve_kinds(resolver, kind, filter).await;
    for (k, records) in &results {
        tracing::info!(kind = %k, count = records.len(), "resolved");
    }
    println!("{}", render(kind, results)?);
    Ok(())
}

pub(crate) async fn run_nearby(
    kind: KindArg,
    filter: &LocationFilter,
    fixtures: Option<&Path>,
) -> anyhow::Result<()> {
    if let Some(path) = fixtures {
        let resolver = Resolver::new(load_fixtures(path)?);
        print_nearby(&resolver, kind, filter).await
    } else {
        // `.env` was already loaded in `main`.
        let config = locality_core::load_app_config_from_env()?;
        let resolver = Resolver::from_config(&config)?;
        print_nearby(&resolver, kind, filter).await
    }
}
