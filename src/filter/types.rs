use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::error::FilterError;
use crate::config::FilterConfig;
use crate::types::parse_date;

/// Raw query-string parameters of `GET /expenses`, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseQueryParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Amount,
    Category,
}

impl SortField {
    pub fn parse(value: &str) -> Result<Self, FilterError> {
        match value {
            "date" => Ok(SortField::Date),
            "amount" => Ok(SortField::Amount),
            "category" => Ok(SortField::Category),
            other => Err(FilterError::InvalidSortField(other.to_string())),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::Date => "e.date",
            SortField::Amount => "e.amount",
            SortField::Category => "c.name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Result<Self, FilterError> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(FilterError::InvalidSortOrder(value.to_string())),
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Validated listing request for one user's expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ExpenseQuery {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            search: None,
            sort_by: SortField::Date,
            sort_order: SortOrder::Desc,
            category: None,
            start_date: None,
            end_date: None,
        }
    }

    /// Apply defaults and reject malformed values. Blank strings count as absent.
    pub fn from_params(params: &ExpenseQueryParams, config: &FilterConfig) -> Result<Self, FilterError> {
        let mut query = Self::new(config.default_limit);

        if let Some(page) = present(&params.page) {
            query.page = match page.parse::<u32>() {
                Ok(p) if p >= 1 => p,
                _ => return Err(FilterError::InvalidPage(page.to_string())),
            };
        }

        if let Some(limit) = present(&params.limit) {
            let requested = match limit.parse::<u32>() {
                Ok(l) if l >= 1 => l,
                _ => return Err(FilterError::InvalidLimit(limit.to_string())),
            };
            query.limit = if requested > config.max_limit {
                tracing::warn!("Requested limit {} exceeds max {}, capping", requested, config.max_limit);
                config.max_limit
            } else {
                requested
            };
        }

        query.search = present(&params.search).map(str::to_string);

        if let Some(sort_by) = present(&params.sort_by) {
            query.sort_by = SortField::parse(sort_by)?;
        }
        if let Some(sort_order) = present(&params.sort_order) {
            query.sort_order = SortOrder::parse(sort_order)?;
        }

        query.category = present(&params.category)
            .filter(|c| *c != "all")
            .map(str::to_string);

        query.start_date = date_param("startDate", &params.start_date)?;
        query.end_date = date_param("endDate", &params.end_date)?;

        Ok(query)
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn date_param(field: &'static str, value: &Option<String>) -> Result<Option<NaiveDate>, FilterError> {
    match present(value) {
        None => Ok(None),
        Some(raw) => parse_date(raw)
            .map(Some)
            .ok_or_else(|| FilterError::InvalidDate { field, value: raw.to_string() }),
    }
}

/// A positional bind value for generated SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Uuid(Uuid),
    Text(String),
    Date(NaiveDate),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
