//! Pure aggregation over already-fetched rows.
//!
//! Every function here is deterministic in its inputs; the data source decides which rows
//! (user scope, date window) reach them.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::goal::capped_percentage;
use crate::database::models::{ExpenseRecord, Goal};
use crate::types::Period;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingOverview {
    pub total_amount: Decimal,
    pub total_count: u64,
    pub category_breakdown: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    pub month: String,
    pub total_amount: Decimal,
    pub count: u64,
    pub categories: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopExpense {
    pub id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
}

/// One group the user belongs to, with every expense attributed to it.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupLedger {
    pub group_id: Uuid,
    pub group_name: String,
    pub entries: Vec<LedgerEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub user_id: Uuid,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAnalytics {
    pub group_id: Uuid,
    pub group_name: String,
    pub total_expenses: u64,
    pub total_amount: Decimal,
    pub user_expenses: u64,
    pub user_amount: Decimal,
    pub user_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub id: Uuid,
    pub name: String,
    pub current_amount: Decimal,
    pub target_amount: Decimal,
    pub progress: f64,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalsProgress {
    pub total_goals: u64,
    pub completed: u64,
    pub in_progress: u64,
    pub total_saved: Decimal,
    pub total_target: Decimal,
    pub overall_progress: f64,
    pub goals: Vec<GoalProgress>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub amount: Decimal,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Change {
    pub amount: Decimal,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub period: Period,
    pub current: PeriodTotals,
    pub previous: PeriodTotals,
    pub change: Change,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub overview: SpendingOverview,
    pub trends: Vec<MonthlyTrend>,
    pub top_expenses: Vec<TopExpense>,
    pub group_analytics: Vec<GroupAnalytics>,
    pub goals_progress: GoalsProgress,
    pub comparison: Comparison,
}

/// Calendar boundaries for a period comparison. The current period has no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBounds {
    pub current_start: NaiveDate,
    pub previous_start: NaiveDate,
    pub previous_end: NaiveDate,
}

impl PeriodBounds {
    /// `None` only at the edges of the representable calendar.
    pub fn for_period(period: Period, today: NaiveDate) -> Option<Self> {
        let current_start = match period {
            Period::Month => today.with_day(1)?,
            Period::Year => NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
        };
        let previous_start = match period {
            Period::Month => current_start.checked_sub_months(Months::new(1))?,
            Period::Year => NaiveDate::from_ymd_opt(today.year() - 1, 1, 1)?,
        };
        let previous_end = current_start.pred_opt()?;
        Some(Self { current_start, previous_start, previous_end })
    }
}

/// Totals plus a per-category breakdown, largest category first.
pub fn spending_overview(expenses: &[ExpenseRecord]) -> SpendingOverview {
    let mut by_category: HashMap<&str, (Decimal, u64)> = HashMap::new();
    for e in expenses {
        let slot = by_category.entry(e.category_name.as_str()).or_insert((Decimal::ZERO, 0));
        slot.0 += e.amount;
        slot.1 += 1;
    }

    let mut category_breakdown: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(name, (amount, count))| CategoryTotal { category: name.to_string(), amount, count })
        .collect();
    category_breakdown.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));

    SpendingOverview {
        total_amount: expenses.iter().map(|e| e.amount).sum(),
        total_count: expenses.len() as u64,
        category_breakdown,
    }
}

/// Chronological month buckets labelled like "Mar 2024". Months without expenses are absent.
pub fn monthly_trends(expenses: &[ExpenseRecord]) -> Vec<MonthlyTrend> {
    let mut buckets: BTreeMap<(i32, u32), MonthlyTrend> = BTreeMap::new();
    for e in expenses {
        let bucket = buckets
            .entry((e.date.year(), e.date.month()))
            .or_insert_with(|| MonthlyTrend {
                month: e.date.format("%b %Y").to_string(),
                total_amount: Decimal::ZERO,
                count: 0,
                categories: BTreeMap::new(),
            });
        bucket.total_amount += e.amount;
        bucket.count += 1;
        *bucket.categories.entry(e.category_name.clone()).or_insert(Decimal::ZERO) += e.amount;
    }
    buckets.into_values().collect()
}

/// The `limit` largest expenses, ties broken by id for a stable order.
pub fn top_expenses(expenses: &[ExpenseRecord], limit: usize) -> Vec<TopExpense> {
    let mut sorted: Vec<&ExpenseRecord> = expenses.iter().collect();
    sorted.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.id.cmp(&b.id)));
    sorted
        .into_iter()
        .take(limit)
        .map(|e| TopExpense {
            id: e.id,
            description: e.description.clone(),
            amount: e.amount,
            category: e.category_name.clone(),
            date: e.date,
        })
        .collect()
}

/// The user's share of spending in each of their groups.
pub fn group_breakdown(user_id: Uuid, ledgers: &[GroupLedger]) -> Vec<GroupAnalytics> {
    ledgers
        .iter()
        .map(|ledger| {
            let total_amount: Decimal = ledger.entries.iter().map(|e| e.amount).sum();
            let mine: Vec<&LedgerEntry> = ledger.entries.iter().filter(|e| e.user_id == user_id).collect();
            let user_amount: Decimal = mine.iter().map(|e| e.amount).sum();
            GroupAnalytics {
                group_id: ledger.group_id,
                group_name: ledger.group_name.clone(),
                total_expenses: ledger.entries.len() as u64,
                total_amount,
                user_expenses: mine.len() as u64,
                user_amount,
                user_percentage: capped_percentage(user_amount, total_amount),
            }
        })
        .collect()
}

pub fn goals_progress(goals: &[Goal]) -> GoalsProgress {
    let completed = goals.iter().filter(|g| g.is_completed()).count() as u64;
    let total_saved: Decimal = goals.iter().map(|g| g.current_amount).sum();
    let total_target: Decimal = goals.iter().map(|g| g.target_amount).sum();

    GoalsProgress {
        total_goals: goals.len() as u64,
        completed,
        in_progress: goals.len() as u64 - completed,
        total_saved,
        total_target,
        overall_progress: capped_percentage(total_saved, total_target),
        goals: goals
            .iter()
            .map(|g| GoalProgress {
                id: g.id,
                name: g.name.clone(),
                current_amount: g.current_amount,
                target_amount: g.target_amount,
                progress: g.progress(),
                deadline: g.deadline,
            })
            .collect(),
    }
}

pub fn period_totals(expenses: &[ExpenseRecord]) -> PeriodTotals {
    PeriodTotals {
        amount: expenses.iter().map(|e| e.amount).sum(),
        count: expenses.len() as u64,
    }
}

/// Relative change is 0 when there was no previous spending.
pub fn comparison(period: Period, current: PeriodTotals, previous: PeriodTotals) -> Comparison {
    let delta = current.amount - previous.amount;
    let percentage = if previous.amount > Decimal::ZERO {
        (delta / previous.amount * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0)
    } else {
        0.0
    };
    Comparison {
        period,
        current,
        previous,
        change: Change { amount: delta, percentage },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(category: &str, cents: i64, on: NaiveDate) -> ExpenseRecord {
        ExpenseRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            group_id: None,
            category_id: Uuid::new_v4(),
            category_name: category.to_string(),
            amount: Decimal::new(cents, 2),
            date: on,
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    fn goal(current: i64, target: i64) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: "Goal".into(),
            target_amount: Decimal::from(target),
            current_amount: Decimal::from(current),
            deadline: None,
            description: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn overview_breaks_down_by_category() {
        let rows = vec![
            expense("Food", 1000, date(2024, 1, 2)),
            expense("Rent", 50000, date(2024, 1, 1)),
            expense("Food", 550, date(2024, 1, 9)),
        ];
        let o = spending_overview(&rows);
        assert_eq!(o.total_amount, Decimal::new(51550, 2));
        assert_eq!(o.total_count, 3);
        assert_eq!(o.category_breakdown[0].category, "Rent");
        assert_eq!(
            o.category_breakdown[1],
            CategoryTotal { category: "Food".into(), amount: Decimal::new(1550, 2), count: 2 }
        );
    }

    #[test]
    fn overview_of_nothing_is_zero() {
        let o = spending_overview(&[]);
        assert_eq!(o.total_amount, Decimal::ZERO);
        assert_eq!(o.total_count, 0);
        assert!(o.category_breakdown.is_empty());
    }

    #[test]
    fn trends_bucket_by_month_in_order_without_gaps_filled() {
        let rows = vec![
            expense("Food", 1000, date(2024, 3, 20)),
            expense("Food", 500, date(2024, 1, 5)),
            expense("Fun", 250, date(2024, 3, 1)),
            expense("Food", 100, date(2023, 12, 31)),
        ];
        let t = monthly_trends(&rows);
        let labels: Vec<&str> = t.iter().map(|b| b.month.as_str()).collect();
        assert_eq!(labels, vec!["Dec 2023", "Jan 2024", "Mar 2024"]);
        assert_eq!(t[2].count, 2);
        assert_eq!(t[2].total_amount, Decimal::new(1250, 2));
        assert_eq!(t[2].categories["Fun"], Decimal::new(250, 2));
        assert_eq!(t[2].categories["Food"], Decimal::new(1000, 2));
    }

    #[test]
    fn top_expenses_are_largest_first() {
        let rows = vec![
            expense("A", 100, date(2024, 1, 1)),
            expense("B", 900, date(2024, 1, 2)),
            expense("C", 500, date(2024, 1, 3)),
        ];
        let top = top_expenses(&rows, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].category, "B");
        assert_eq!(top[1].category, "C");
    }

    #[test]
    fn group_share_and_zero_total() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let ledgers = vec![
            GroupLedger {
                group_id: Uuid::new_v4(),
                group_name: "Flat".into(),
                entries: vec![
                    LedgerEntry { user_id: me, amount: Decimal::from(30) },
                    LedgerEntry { user_id: other, amount: Decimal::from(90) },
                ],
            },
            GroupLedger { group_id: Uuid::new_v4(), group_name: "Empty".into(), entries: vec![] },
        ];
        let g = group_breakdown(me, &ledgers);
        assert_eq!(g[0].total_expenses, 2);
        assert_eq!(g[0].total_amount, Decimal::from(120));
        assert_eq!(g[0].user_expenses, 1);
        assert_eq!(g[0].user_amount, Decimal::from(30));
        assert_eq!(g[0].user_percentage, 25.0);
        assert_eq!(g[1].user_percentage, 0.0);
    }

    #[test]
    fn goals_progress_counts_and_caps() {
        let goals = vec![goal(1500, 1000), goal(250, 1000), goal(0, 500)];
        let p = goals_progress(&goals);
        assert_eq!(p.total_goals, 3);
        assert_eq!(p.completed, 1);
        assert_eq!(p.in_progress, 2);
        assert_eq!(p.total_saved, Decimal::from(1750));
        assert_eq!(p.total_target, Decimal::from(2500));
        assert_eq!(p.overall_progress, 70.0);
        assert_eq!(p.goals[0].progress, 100.0);

        let over = goals_progress(&[goal(3000, 1000)]);
        assert_eq!(over.overall_progress, 100.0);

        let none = goals_progress(&[]);
        assert_eq!(none.overall_progress, 0.0);
    }

    #[test]
    fn month_bounds_in_leap_february() {
        let b = PeriodBounds::for_period(Period::Month, date(2024, 3, 15)).unwrap();
        assert_eq!(b.current_start, date(2024, 3, 1));
        assert_eq!(b.previous_start, date(2024, 2, 1));
        assert_eq!(b.previous_end, date(2024, 2, 29));
    }

    #[test]
    fn month_bounds_across_year_boundary() {
        let b = PeriodBounds::for_period(Period::Month, date(2024, 1, 31)).unwrap();
        assert_eq!(b.current_start, date(2024, 1, 1));
        assert_eq!(b.previous_start, date(2023, 12, 1));
        assert_eq!(b.previous_end, date(2023, 12, 31));
    }

    #[test]
    fn year_bounds() {
        let b = PeriodBounds::for_period(Period::Year, date(2024, 7, 4)).unwrap();
        assert_eq!(b.current_start, date(2024, 1, 1));
        assert_eq!(b.previous_start, date(2023, 1, 1));
        assert_eq!(b.previous_end, date(2023, 12, 31));
    }

    #[test]
    fn comparison_change() {
        let cur = PeriodTotals { amount: Decimal::from(150), count: 3 };
        let prev = PeriodTotals { amount: Decimal::from(100), count: 2 };
        let c = comparison(Period::Month, cur, prev);
        assert_eq!(c.change.amount, Decimal::from(50));
        assert_eq!(c.change.percentage, 50.0);

        let from_zero = comparison(Period::Year, cur, PeriodTotals { amount: Decimal::ZERO, count: 0 });
        assert_eq!(from_zero.change.percentage, 0.0);
        assert_eq!(from_zero.change.amount, Decimal::from(150));
    }

    #[test]
    fn comparison_serializes_expected_shape() {
        let c = comparison(
            Period::Month,
            PeriodTotals { amount: Decimal::from(80), count: 1 },
            PeriodTotals { amount: Decimal::from(100), count: 4 },
        );
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["period"], "month");
        assert_eq!(v["current"]["count"], 1);
        assert_eq!(v["previous"]["amount"], 100.0);
        assert_eq!(v["change"]["percentage"], -20.0);
    }
}
