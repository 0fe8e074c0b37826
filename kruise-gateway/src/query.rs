//! Listing criteria: pagination, sorting, label selection and field filters.

use crate::error::{ApiError, ApiResult};
use crate::selector;
use kube::core::Selector;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Request parameter carrying the page number.
pub const PARAM_PAGE: &str = "page";
/// Request parameter carrying the page size.
pub const PARAM_LIMIT: &str = "limit";
/// Request parameter carrying the sort field.
pub const PARAM_SORT_BY: &str = "sortBy";
/// Alias of [`PARAM_SORT_BY`].
pub const PARAM_ORDER_BY: &str = "orderBy";
/// Request parameter carrying the sort direction.
pub const PARAM_ASCENDING: &str = "ascending";
/// Request parameter carrying the label selector.
pub const PARAM_LABEL_SELECTOR: &str = "labelSelector";

/// A field that objects can be filtered or sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Substring of `metadata.name`.
    Name,
    /// Comma separated list of exact names.
    Names,
    /// `metadata.uid`.
    Uid,
    /// `metadata.namespace`.
    Namespace,
    /// UID of any owner reference.
    OwnerReference,
    /// Kind of any owner reference.
    OwnerKind,
    /// Label match (`key`, `key=value`, `key!=value`).
    Label,
    /// Annotation match, same syntax as [`Field::Label`].
    Annotation,
    /// `metadata.creationTimestamp`.
    CreationTimestamp,
    /// Derived lifecycle status.
    Status,
}

impl Field {
    /// Parameter name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Names => "names",
            Field::Uid => "uid",
            Field::Namespace => "namespace",
            Field::OwnerReference => "ownerReference",
            Field::OwnerKind => "ownerKind",
            Field::Label => "label",
            Field::Annotation => "annotation",
            Field::CreationTimestamp => "creationTimestamp",
            Field::Status => "status",
        }
    }
}

impl FromStr for Field {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "name" => Field::Name,
            "names" => Field::Names,
            "uid" => Field::Uid,
            "namespace" => Field::Namespace,
            "ownerReference" => Field::OwnerReference,
            "ownerKind" => Field::OwnerKind,
            "label" => Field::Label,
            "annotation" => Field::Annotation,
            "creationTimestamp" | "createTime" => Field::CreationTimestamp,
            "status" => Field::Status,
            other => return Err(ApiError::InvalidQuery(format!("unknown field {other:?}"))),
        };
        Ok(field)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field filter criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter<'a> {
    /// Field to test.
    pub field: Field,
    /// Expected value, interpreted per field.
    pub value: &'a str,
}

/// Validated listing criteria, built once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    page: usize,
    limit: usize,
    sort_by: Field,
    ascending: bool,
    label_selector: String,
    filters: BTreeMap<Field, String>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 0,
            sort_by: Field::CreationTimestamp,
            ascending: false,
            label_selector: String::new(),
            filters: BTreeMap::new(),
        }
    }
}

impl Query {
    /// Query with defaults: first page, no limit, newest first.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the 1-based page number; 0 is treated as 1.
    pub fn page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    /// Set the page size; 0 disables pagination.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the sort field.
    pub fn sort_by(mut self, field: Field) -> Self {
        self.sort_by = field;
        self
    }

    /// Set the sort direction.
    pub fn ascending(mut self, ascending: bool) -> Self {
        self.ascending = ascending;
        self
    }

    /// Replace the raw label selector.
    pub fn label_selector(mut self, selector: impl Into<String>) -> Self {
        self.label_selector = selector.into();
        self
    }

    /// Append a requirement to the label selector.
    pub fn with_label_requirement(mut self, requirement: &str) -> Self {
        if self.label_selector.trim().is_empty() {
            self.label_selector = requirement.to_string();
        } else {
            self.label_selector = format!("{},{}", self.label_selector, requirement);
        }
        self
    }

    /// Add a field filter, replacing any previous filter on the same field.
    pub fn filter(mut self, field: Field, value: impl Into<String>) -> Self {
        self.filters.insert(field, value.into());
        self
    }

    /// Parse request parameters.
    ///
    /// Parameters named after a [`Field`] become filters; unknown parameters
    /// are ignored. An unknown sort field falls back to the creation timestamp.
    pub fn from_params<'a, I>(params: I) -> ApiResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut query = Query::new();
        for (key, value) in params {
            match key {
                PARAM_PAGE => {
                    let page: usize = parse_number(key, value)?;
                    if page == 0 {
                        return Err(ApiError::InvalidQuery("page must be at least 1".into()));
                    }
                    query.page = page;
                }
                PARAM_LIMIT => query.limit = parse_number(key, value)?,
                PARAM_SORT_BY | PARAM_ORDER_BY => {
                    query.sort_by = value.parse().unwrap_or(Field::CreationTimestamp);
                }
                PARAM_ASCENDING => {
                    query.ascending = value.parse().map_err(|_| {
                        ApiError::InvalidQuery(format!("ascending must be true or false, got {value:?}"))
                    })?;
                }
                PARAM_LABEL_SELECTOR => query.label_selector = value.to_string(),
                other => {
                    if let Ok(field) = other.parse::<Field>() {
                        if !value.is_empty() {
                            query.filters.insert(field, value.to_string());
                        }
                    }
                }
            }
        }
        Ok(query)
    }

    /// 1-based page number.
    pub fn page_number(&self) -> usize {
        self.page
    }

    /// Page size, 0 when unbounded.
    pub fn page_limit(&self) -> usize {
        self.limit
    }

    /// Sort field.
    pub fn sort_field(&self) -> Field {
        self.sort_by
    }

    /// Sort direction.
    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    /// Raw label selector expression.
    pub fn raw_label_selector(&self) -> &str {
        &self.label_selector
    }

    /// Parsed label selector.
    pub fn selector(&self) -> ApiResult<Selector> {
        selector::parse(&self.label_selector)
    }

    /// Field filters in field order.
    pub fn filters(&self) -> impl Iterator<Item = Filter<'_>> {
        self.filters.iter().map(|(field, value)| Filter {
            field: *field,
            value: value.as_str(),
        })
    }

    /// Half-open index range of the requested page within `total` items.
    pub fn page_range(&self, total: usize) -> std::ops::Range<usize> {
        if self.limit == 0 {
            return 0..total;
        }
        let start = (self.page - 1).saturating_mul(self.limit).min(total);
        let end = start.saturating_add(self.limit).min(total);
        start..end
    }
}

fn parse_number(key: &str, value: &str) -> ApiResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::InvalidQuery(format!("{key} must be a non-negative integer, got {value:?}")))
}
