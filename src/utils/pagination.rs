//! Pagination support for list endpoints
//!
//! Query parameters are validated against a per-resource sort allow-list
//! before any SQL runs. Ordering always appends `id ASC` as a tiebreaker so
//! page boundaries stay stable when the sort key has duplicates.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::utils::error::AppError;

/// Maximum page size accepted from clients
pub const MAX_PER_PAGE: i64 = 100;

/// Raw pagination query parameters as deserialized from the query string
#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default = "default_include_meta")]
    pub include_meta: bool,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    10
}

fn default_include_meta() -> bool {
    true
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
            sort_by: None,
            sort_order: SortOrder::default(),
            include_meta: default_include_meta(),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl PageParams {
    /// Validate the parameters against a resource's sort allow-list.
    ///
    /// `sort_by` must come from `allowed`; anything else is rejected rather
    /// than interpolated into SQL. `default_sort` applies when the client
    /// sends no sort field.
    pub fn validate(
        &self,
        allowed: &[&str],
        default_sort: &str,
    ) -> Result<ResolvedQuery, AppError> {
        if self.page < 1 || self.per_page < 1 || self.per_page > MAX_PER_PAGE {
            return Err(AppError::Validation(
                "Invalid pagination parameters.".to_string(),
            ));
        }

        let sort_by = match &self.sort_by {
            Some(field) => {
                if !allowed.contains(&field.as_str()) {
                    return Err(AppError::Validation(format!(
                        "Invalid sort_by field. Allowed: {:?}",
                        allowed
                    )));
                }
                field.clone()
            }
            None => default_sort.to_string(),
        };

        Ok(ResolvedQuery {
            page: self.page,
            per_page: self.per_page,
            sort_by,
            sort_order: self.sort_order,
            include_meta: self.include_meta,
        })
    }
}

/// Validated pagination parameters, safe to build SQL from
#[derive(Debug, Clone)]
pub struct ResolvedQuery {
    pub page: i64,
    pub per_page: i64,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub include_meta: bool,
}

impl ResolvedQuery {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// ORDER BY clause with the stable `id ASC` tiebreaker.
    /// `sort_by` has already passed the allow-list check.
    pub fn order_clause(&self) -> String {
        format!("{} {}, id ASC", self.sort_by, self.sort_order.as_sql())
    }
}

/// One page of results plus totals
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub pages: i64,
    pub page: i64,
    pub per_page: i64,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, total: i64, query: &ResolvedQuery) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + query.per_page - 1) / query.per_page
        };
        Self {
            items,
            total,
            pages,
            page: query.page,
            per_page: query.per_page,
        }
    }

    /// Build the response envelope keyed by the resource's plural name.
    pub fn envelope(&self, key: &str, include_meta: bool) -> serde_json::Value {
        if include_meta {
            json!({
                key: self.items,
                "total": self.total,
                "pages": self.pages,
                "page": self.page,
                "per_page": self.per_page,
            })
        } else {
            json!({ key: self.items })
        }
    }
}
