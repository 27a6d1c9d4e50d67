//! Select-query builder for the backend's REST table interface.
//!
//! A [`Select`] names a table, the columns to return, optional embedded
//! joins, filters and ordering. [`Select::to_params`] renders it to
//! PostgREST-style query parameters; [`crate::MemorySource`] evaluates the
//! same structure against in-memory rows.

/// A literal compared against a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Text(s) => write!(f, "{s}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_owned())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// Right-hand side of an `is` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsValue {
    Null,
    True,
    False,
}

impl IsValue {
    fn as_str(self) -> &'static str {
        match self {
            IsValue::Null => "null",
            IsValue::True => "true",
            IsValue::False => "false",
        }
    }
}

/// A row predicate. Columns of embedded joins use `alias.column` paths.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { column: String, value: Scalar },
    /// Case-insensitive match where `*` is the wildcard.
    ILike { column: String, pattern: String },
    Gte { column: String, value: f64 },
    Lte { column: String, value: f64 },
    Is { column: String, value: IsValue },
    /// True when any inner filter matches.
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Scalar>) -> Self {
        Filter::Eq {
            column: column.to_owned(),
            value: value.into(),
        }
    }

    /// Substring match on `column`, ignoring case.
    #[must_use]
    pub fn contains(column: &str, needle: &str) -> Self {
        Filter::ILike {
            column: column.to_owned(),
            pattern: contains_pattern(needle),
        }
    }

    #[must_use]
    pub fn is(column: &str, value: IsValue) -> Self {
        Filter::Is {
            column: column.to_owned(),
            value,
        }
    }

    /// `column.op.value` form used inside `or=(...)` groups.
    fn render_inline(&self) -> String {
        match self {
            Filter::Eq { column, value } => {
                format!("{column}.eq.{}", quote_reserved(&value.to_string()))
            }
            Filter::ILike { column, pattern } => {
                format!("{column}.ilike.{}", quote_reserved(pattern))
            }
            Filter::Gte { column, value } => format!("{column}.gte.{value}"),
            Filter::Lte { column, value } => format!("{column}.lte.{value}"),
            Filter::Is { column, value } => format!("{column}.is.{}", value.as_str()),
            Filter::Or(inner) => format!("or({})", render_group(inner)),
        }
    }

    /// `(column, "op.value")` form used for top-level filters.
    fn render_param(&self) -> Option<(String, String)> {
        let pair = match self {
            Filter::Eq { column, value } => (column.clone(), format!("eq.{value}")),
            Filter::ILike { column, pattern } => (column.clone(), format!("ilike.{pattern}")),
            Filter::Gte { column, value } => (column.clone(), format!("gte.{value}")),
            Filter::Lte { column, value } => (column.clone(), format!("lte.{value}")),
            Filter::Is { column, value } => (column.clone(), format!("is.{}", value.as_str())),
            Filter::Or(_) => return None,
        };
        Some(pair)
    }
}

fn render_group(filters: &[Filter]) -> String {
    filters
        .iter()
        .map(Filter::render_inline)
        .collect::<Vec<_>>()
        .join(",")
}

/// `*needle*` with wildcard characters stripped from the needle.
fn contains_pattern(needle: &str) -> String {
    let cleaned: String = needle
        .trim()
        .chars()
        .filter(|c| *c != '*' && *c != '%')
        .collect();
    format!("*{cleaned}*")
}

/// Values containing PostgREST delimiters must be double-quoted inside
/// logical groups.
fn quote_reserved(value: &str) -> String {
    if value.contains([',', '(', ')', '"', '\\', ':']) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        value.to_owned()
    }
}

/// An embedded related table, rendered as `alias:table(columns)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub alias: String,
    pub table: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A read query against one backend table.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: String,
    pub columns: Vec<String>,
    pub joins: Vec<Join>,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<u32>,
}

impl Select {
    #[must_use]
    pub fn from(table: &str, columns: &[&str]) -> Self {
        Self {
            table: table.to_owned(),
            columns: columns.iter().map(|c| (*c).to_owned()).collect(),
            joins: Vec::new(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    #[must_use]
    pub fn join(mut self, alias: &str, table: &str, columns: &[&str]) -> Self {
        self.joins.push(Join {
            alias: alias.to_owned(),
            table: table.to_owned(),
            columns: columns.iter().map(|c| (*c).to_owned()).collect(),
        });
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn eq(self, column: &str, value: impl Into<Scalar>) -> Self {
        self.filter(Filter::eq(column, value))
    }

    #[must_use]
    pub fn ilike(self, column: &str, pattern: &str) -> Self {
        self.filter(Filter::ILike {
            column: column.to_owned(),
            pattern: pattern.to_owned(),
        })
    }

    #[must_use]
    pub fn gte(self, column: &str, value: f64) -> Self {
        self.filter(Filter::Gte {
            column: column.to_owned(),
            value,
        })
    }

    #[must_use]
    pub fn lte(self, column: &str, value: f64) -> Self {
        self.filter(Filter::Lte {
            column: column.to_owned(),
            value,
        })
    }

    #[must_use]
    pub fn or(self, filters: Vec<Filter>) -> Self {
        self.filter(Filter::Or(filters))
    }

    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(Order {
            column: column.to_owned(),
            ascending,
        });
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The `select=` value: plain columns followed by embedded joins.
    #[must_use]
    pub fn select_clause(&self) -> String {
        let mut parts = self.columns.clone();
        parts.extend(
            self.joins
                .iter()
                .map(|j| format!("{}:{}({})", j.alias, j.table, j.columns.join(","))),
        );
        parts.join(",")
    }

    /// Render as query parameters in a stable order.
    ///
    /// Several OR groups are combined into one `and=(or(..),or(..))`
    /// parameter so each group keeps its own disjunction.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_owned(), self.select_clause())];

        params.extend(self.filters.iter().filter_map(Filter::render_param));

        let groups: Vec<&Vec<Filter>> = self
            .filters
            .iter()
            .filter_map(|f| match f {
                Filter::Or(inner) => Some(inner),
                _ => None,
            })
            .collect();
        match groups.as_slice() {
            [] => {}
            [single] => params.push(("or".to_owned(), format!("({})", render_group(single)))),
            many => {
                let combined = many
                    .iter()
                    .map(|g| format!("or({})", render_group(g)))
                    .collect::<Vec<_>>()
                    .join(",");
                params.push(("and".to_owned(), format!("({combined})")));
            }
        }

        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| {
                    format!(
                        "{}.{}",
                        o.column,
                        if o.ascending { "asc" } else { "desc" }
                    )
                })
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_owned(), order));
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_owned(), limit.to_string()));
        }

        params
    }
}
