//! In-memory [`RowSource`] that evaluates [`Select`] queries over JSON rows.
//!
//! Rows are stored with their joins already embedded under the join alias,
//! so `business.city` resolves through the nested `business` object. Filter
//! semantics follow the SQL the hosted backend would run: comparisons
//! against `null` never match, `ilike` ignores case, ascending order puts
//! nulls last and descending order puts them first.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::Value;

use crate::error::StoreError;
use crate::query::{Filter, IsValue, Order, Scalar, Select};
use crate::source::RowSource;

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<String, Vec<Value>>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a table.
    #[must_use]
    pub fn with_table(mut self, name: &str, rows: Vec<Value>) -> Self {
        self.tables.insert(name.to_owned(), rows);
        self
    }

    /// Evaluates `query` synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownTable`] if no table named `query.table`
    /// was registered.
    pub fn run(&self, query: &Select) -> Result<Vec<Value>, StoreError> {
        let rows = self
            .tables
            .get(&query.table)
            .ok_or_else(|| StoreError::UnknownTable(query.table.clone()))?;

        let mut matched: Vec<Value> = rows
            .iter()
            .filter(|row| query.filters.iter().all(|f| matches(row, f)))
            .cloned()
            .collect();

        if !query.order.is_empty() {
            matched.sort_by(|a, b| compare_rows(a, b, &query.order));
        }
        if let Some(limit) = query.limit {
            matched.truncate(limit as usize);
        }
        Ok(matched)
    }
}

impl RowSource for MemorySource {
    async fn fetch_rows(&self, query: &Select) -> Result<Vec<Value>, StoreError> {
        self.run(query)
    }
}

/// Resolves a dotted column path through nested objects.
fn lookup<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(row, |current, key| current.get(key))
        .filter(|v| !v.is_null())
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn matches(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { column, value } => lookup(row, column).is_some_and(|v| scalar_eq(v, value)),
        Filter::ILike { column, pattern } => lookup(row, column)
            .and_then(Value::as_str)
            .is_some_and(|s| ilike(s, pattern)),
        Filter::Gte { column, value } => lookup(row, column)
            .and_then(as_number)
            .is_some_and(|n| n >= *value),
        Filter::Lte { column, value } => lookup(row, column)
            .and_then(as_number)
            .is_some_and(|n| n <= *value),
        Filter::Is { column, value } => {
            let found = lookup(row, column);
            match value {
                IsValue::Null => found.is_none(),
                IsValue::True => found.and_then(Value::as_bool) == Some(true),
                IsValue::False => found.and_then(Value::as_bool) == Some(false),
            }
        }
        Filter::Or(inner) => inner.iter().any(|f| matches(row, f)),
    }
}

fn scalar_eq(value: &Value, scalar: &Scalar) -> bool {
    match (value, scalar) {
        (Value::String(s), Scalar::Text(t)) => s == t,
        (Value::Bool(b), Scalar::Bool(t)) => b == t,
        (v, Scalar::Number(n)) => as_number(v).is_some_and(|x| (x - n).abs() < f64::EPSILON),
        _ => false,
    }
}

/// Case-insensitive glob match where `*` matches any run of characters.
fn ilike(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();

    let (mut t, mut p) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((sp, st)) = star {
            p = sp + 1;
            t = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '*')
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(_), _) | (_, Value::Number(_)) => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn compare_rows(a: &Value, b: &Value, order: &[Order]) -> Ordering {
    for key in order {
        let ordering = match (lookup(a, &key.column), lookup(b, &key.column)) {
            (Some(x), Some(y)) => {
                let o = compare_values(x, y);
                if key.ascending {
                    o
                } else {
                    o.reverse()
                }
            }
            (None, None) => Ordering::Equal,
            // Postgres default: NULLS LAST for ASC, NULLS FIRST for DESC.
            (None, Some(_)) => {
                if key.ascending {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (Some(_), None) => {
                if key.ascending {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn names(rows: &[Value]) -> Vec<&str> {
        rows.iter()
            .filter_map(|r| r.get("name").and_then(Value::as_str))
            .collect()
    }

    fn source() -> MemorySource {
        MemorySource::new().with_table(
            "products",
            vec![
                json!({"name": "Tacos", "price": 12.0, "city": "Austin", "is_active": true,
                       "business": {"city": "Austin"}}),
                json!({"name": "Brisket", "price": 25, "city": null, "is_active": null,
                       "business": {"city": "Round Rock"}}),
                json!({"name": "Kolache", "price": null, "city": "Houston", "is_active": false,
                       "business": null}),
                json!({"name": "Queso", "price": "8.50", "city": "south austin",
                       "business": {"city": "Austin"}}),
            ],
        )
    }

    #[test]
    fn unknown_table_is_an_error() {
        let err = source().run(&Select::from("nope", &["*"])).unwrap_err();
        assert!(matches!(err, StoreError::UnknownTable(ref t) if t == "nope"));
    }

    #[test]
    fn ilike_contains_ignores_case() {
        let rows = source()
            .run(&Select::from("products", &["*"]).filter(Filter::contains("city", "AUSTIN")))
            .unwrap();
        assert_eq!(names(&rows), ["Tacos", "Queso"]);
    }

    #[test]
    fn or_group_reaches_into_embedded_join() {
        let rows = source()
            .run(&Select::from("products", &["*"]).or(vec![
                Filter::contains("city", "round rock"),
                Filter::contains("business.city", "round rock"),
            ]))
            .unwrap();
        assert_eq!(names(&rows), ["Brisket"]);
    }

    #[test]
    fn range_filters_skip_nulls_and_parse_numeric_strings() {
        let rows = source()
            .run(&Select::from("products", &["*"]).gte("price", 8.5).lte("price", 12.0))
            .unwrap();
        assert_eq!(names(&rows), ["Tacos", "Queso"]);
    }

    #[test]
    fn is_filters_treat_missing_as_null() {
        let rows = source()
            .run(&Select::from("products", &["*"]).or(vec![
                Filter::is("is_active", IsValue::True),
                Filter::is("is_active", IsValue::Null),
            ]))
            .unwrap();
        assert_eq!(names(&rows), ["Tacos", "Brisket", "Queso"]);
    }

    #[test]
    fn eq_compares_text_exactly() {
        let rows = source()
            .run(&Select::from("products", &["*"]).eq("city", "Austin"))
            .unwrap();
        assert_eq!(names(&rows), ["Tacos"]);
    }

    #[test]
    fn order_puts_nulls_last_ascending_and_first_descending() {
        let asc = source()
            .run(&Select::from("products", &["*"]).order("price", true))
            .unwrap();
        assert_eq!(names(&asc), ["Queso", "Tacos", "Brisket", "Kolache"]);

        let desc = source()
            .run(&Select::from("products", &["*"]).order("price", false).limit(2))
            .unwrap();
        assert_eq!(names(&desc), ["Kolache", "Brisket"]);
    }

    #[test]
    fn ilike_glob_handles_anchors_and_multiple_wildcards() {
        assert!(ilike("Austin", "aus*"));
        assert!(!ilike("South Austin", "aus*"));
        assert!(ilike("South Austin", "*aus*in"));
        assert!(ilike("", "*"));
        assert!(!ilike("Austin", "*dallas*"));
    }

    #[tokio::test]
    async fn fetch_rows_matches_run() {
        let src = source();
        let query = Select::from("products", &["*"]).eq("name", "Kolache");
        let rows = src.fetch_rows(&query).await.unwrap();
        assert_eq!(names(&rows), ["Kolache"]);
    }
}
