use chrono::{Months, NaiveDate};
use serde::Deserialize;
use uuid::Uuid;

use super::aggregate::{
    self, Comparison, Dashboard, GoalsProgress, GroupAnalytics, MonthlyTrend, PeriodBounds, SpendingOverview,
    TopExpense,
};
use super::source::AnalyticsSource;
use crate::config::FilterConfig;
use crate::services::{ServiceError, ServiceResult};
use crate::types::{parse_date, Period};

pub const DEFAULT_TREND_MONTHS: u32 = 6;
pub const DEFAULT_TOP_LIMIT: u32 = 10;
/// Longest trend window: 100 years.
pub const MAX_TREND_MONTHS: u32 = 1200;
const DASHBOARD_TOP_LIMIT: u32 = 5;

/// Query-string parameters shared by the analytics endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub months: Option<String>,
    pub limit: Option<String>,
    pub period: Option<String>,
}

impl AnalyticsParams {
    /// Overview bounds apply only when both ends are given.
    pub fn range(&self) -> ServiceResult<Option<(NaiveDate, NaiveDate)>> {
        let start = date_param("startDate", self.start_date.as_deref())?;
        let end = date_param("endDate", self.end_date.as_deref())?;
        Ok(start.zip(end))
    }

    pub fn months(&self) -> ServiceResult<u32> {
        let months = positive_param("months", self.months.as_deref(), DEFAULT_TREND_MONTHS)?;
        if months > MAX_TREND_MONTHS {
            return Err(ServiceError::Validation(format!(
                "Invalid months: must be at most {}",
                MAX_TREND_MONTHS
            )));
        }
        Ok(months)
    }

    pub fn limit(&self, config: &FilterConfig) -> ServiceResult<u32> {
        let limit = positive_param("limit", self.limit.as_deref(), DEFAULT_TOP_LIMIT)?;
        if limit > config.max_limit {
            tracing::warn!("Requested limit {} exceeds max {}, capping", limit, config.max_limit);
            return Ok(config.max_limit);
        }
        Ok(limit)
    }

    pub fn period(&self) -> ServiceResult<Period> {
        match self.period.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            None => Ok(Period::Month),
            Some(raw) => raw.parse().map_err(ServiceError::Validation),
        }
    }
}

fn date_param(name: &str, raw: Option<&str>) -> ServiceResult<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .ok_or_else(|| ServiceError::Validation(format!("Invalid {}: {}", name, value))),
    }
}

fn positive_param(name: &str, raw: Option<&str>, default: u32) -> ServiceResult<u32> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => match value.parse::<u32>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(ServiceError::Validation(format!("Invalid {}: must be a positive integer", name))),
        },
    }
}

/// Read-only analytics over one user's data. `today` is passed in so period math is testable.
pub struct AnalyticsService<S> {
    source: S,
}

impl<S: AnalyticsSource> AnalyticsService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn overview(&self, user_id: Uuid, range: Option<(NaiveDate, NaiveDate)>) -> ServiceResult<SpendingOverview> {
        let (start, end) = match range {
            Some((s, e)) => (Some(s), Some(e)),
            None => (None, None),
        };
        let expenses = self.source.expenses_between(user_id, start, end).await?;
        Ok(aggregate::spending_overview(&expenses))
    }

    pub async fn trends(&self, user_id: Uuid, months: u32, today: NaiveDate) -> ServiceResult<Vec<MonthlyTrend>> {
        let start = today.checked_sub_months(Months::new(months));
        let expenses = self.source.expenses_between(user_id, start, None).await?;
        Ok(aggregate::monthly_trends(&expenses))
    }

    pub async fn top_expenses(&self, user_id: Uuid, limit: u32) -> ServiceResult<Vec<TopExpense>> {
        let expenses = self.source.largest_expenses(user_id, limit).await?;
        Ok(aggregate::top_expenses(&expenses, limit as usize))
    }

    pub async fn groups(&self, user_id: Uuid) -> ServiceResult<Vec<GroupAnalytics>> {
        let ledgers = self.source.member_groups(user_id).await?;
        Ok(aggregate::group_breakdown(user_id, &ledgers))
    }

    pub async fn goals(&self, user_id: Uuid) -> ServiceResult<GoalsProgress> {
        let goals = self.source.goals(user_id).await?;
        Ok(aggregate::goals_progress(&goals))
    }

    pub async fn comparison(&self, user_id: Uuid, period: Period, today: NaiveDate) -> ServiceResult<Comparison> {
        let bounds = PeriodBounds::for_period(period, today)
            .ok_or_else(|| ServiceError::validation("Date out of range"))?;
        let (current, previous) = futures::try_join!(
            self.source.expenses_between(user_id, Some(bounds.current_start), None),
            self.source
                .expenses_between(user_id, Some(bounds.previous_start), Some(bounds.previous_end)),
        )?;
        Ok(aggregate::comparison(
            period,
            aggregate::period_totals(&current),
            aggregate::period_totals(&previous),
        ))
    }

    /// All six views fetched concurrently. Any failure fails the whole dashboard.
    pub async fn dashboard(&self, user_id: Uuid, today: NaiveDate) -> ServiceResult<Dashboard> {
        let (overview, trends, top_expenses, group_analytics, goals_progress, comparison) = futures::try_join!(
            self.overview(user_id, None),
            self.trends(user_id, DEFAULT_TREND_MONTHS, today),
            self.top_expenses(user_id, DASHBOARD_TOP_LIMIT),
            self.groups(user_id),
            self.goals(user_id),
            self.comparison(user_id, Period::Month, today),
        )?;
        Ok(Dashboard {
            overview,
            trends,
            top_expenses,
            group_analytics,
            goals_progress,
            comparison,
        })
    }
}
