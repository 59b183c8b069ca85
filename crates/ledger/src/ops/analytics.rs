//! Read-only analytics over the entry store.
//!
//! Every query here recomputes from entries (never from the cached budget
//! totals, except the goal percent which is defined over the cached current
//! amount) and tolerates empty budgets by returning zeroed shapes.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, Statement, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{Direction, LedgerError, LedgerResult, Money, OwnerRef, categories, entries};

use super::Ledger;

/// Income/expense/balance summary over a date range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Kpi {
    pub total_income: Money,
    pub total_expense: Money,
    pub balance: Money,
}

/// One day of the cashflow series; days with no entries are omitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CashflowPoint {
    pub date: NaiveDate,
    pub income: Money,
    pub expense: Money,
}

/// Aggregate of one category (or the uncategorized bucket) over a range.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryStat {
    pub category: String,
    pub direction: Direction,
    pub count: u64,
    pub total_amount: Money,
    pub avg_amount: Money,
    /// Share of the range's grand total, rounded to two decimals.
    pub percentage: f64,
}

/// One day of a goal-progress series, zero-filled for quiet days.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: Money,
}

/// Goal progress of an owner's budget.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GoalProgress {
    /// current / planned as a percentage, one decimal, capped at 100.
    pub percent: f64,
    pub series: Vec<DailyTotal>,
}

/// Leaderboard row: how much one payer brought into a budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Contribution {
    pub payer_id: i64,
    pub total_contributed: Money,
}

/// Name shown for entries without a category.
const UNCATEGORIZED: &str = "Other";

impl Ledger {
    /// Sums income and expenses over an inclusive date range.
    pub async fn kpi(
        &self,
        budget_id: Uuid,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> LedgerResult<Kpi> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT \
               COALESCE(SUM(CASE WHEN direction = 'income' THEN amount_cents ELSE 0 END), 0) AS income_sum, \
               COALESCE(SUM(CASE WHEN direction = 'expense' THEN amount_cents ELSE 0 END), 0) AS expense_sum \
             FROM entries \
             WHERE budget_id = ? AND occurred_on >= ? AND occurred_on <= ?",
            [budget_id.into(), date_from.into(), date_to.into()],
        );
        let row = self.database.query_one(stmt).await?;
        let income = row
            .as_ref()
            .and_then(|r| r.try_get("", "income_sum").ok())
            .unwrap_or(0);
        let expense = row
            .as_ref()
            .and_then(|r| r.try_get("", "expense_sum").ok())
            .unwrap_or(0);
        let total_income = Money::new(income);
        let total_expense = Money::new(expense);
        Ok(Kpi {
            total_income,
            total_expense,
            balance: total_income - total_expense,
        })
    }

    /// Per-day income and expense totals over an inclusive range,
    /// ascending by date. Days with no entries produce no point.
    pub async fn cashflow(
        &self,
        budget_id: Uuid,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> LedgerResult<Vec<CashflowPoint>> {
        let models = entries::Entity::find()
            .filter(entries::Column::BudgetId.eq(budget_id))
            .filter(entries::Column::OccurredOn.gte(date_from))
            .filter(entries::Column::OccurredOn.lte(date_to))
            .all(&self.database)
            .await?;
        let mut days: BTreeMap<NaiveDate, (Money, Money)> = BTreeMap::new();
        for model in models {
            let slot = days.entry(model.occurred_on).or_default();
            match Direction::try_from(model.direction.as_str())? {
                Direction::Income => slot.0 += Money::new(model.amount_cents),
                Direction::Expense => slot.1 += Money::new(model.amount_cents),
            }
        }
        Ok(days
            .into_iter()
            .map(|(date, (income, expense))| CashflowPoint {
                date,
                income,
                expense,
            })
            .collect())
    }

    /// Per-category totals for one direction, largest first.
    ///
    /// Uncategorized entries are grouped under one "Other" bucket. Each
    /// percentage is the category's share of the direction's total.
    pub async fn category_breakdown(
        &self,
        budget_id: Uuid,
        direction: Direction,
    ) -> LedgerResult<Vec<CategoryStat>> {
        let models = entries::Entity::find()
            .find_also_related(categories::Entity)
            .filter(entries::Column::BudgetId.eq(budget_id))
            .filter(entries::Column::Direction.eq(direction.as_str()))
            .all(&self.database)
            .await?;

        let mut buckets: BTreeMap<String, (u64, Money)> = BTreeMap::new();
        let mut grand_total = Money::ZERO;
        for (entry, category) in models {
            let name = category
                .map(|c| c.name)
                .unwrap_or_else(|| UNCATEGORIZED.to_string());
            let amount = Money::new(entry.amount_cents);
            let bucket = buckets.entry(name).or_default();
            bucket.0 += 1;
            bucket.1 += amount;
            grand_total += amount;
        }

        // Floor at one cent so an empty budget divides cleanly to 0%.
        let divisor = grand_total.cents().max(1) as f64;
        let mut stats: Vec<CategoryStat> = buckets
            .into_iter()
            .map(|(category, (count, total_amount))| {
                let percentage =
                    (total_amount.cents() as f64 / divisor * 100.0 * 100.0).round() / 100.0;
                CategoryStat {
                    category,
                    direction,
                    count,
                    avg_amount: Money::new(total_amount.cents() / count as i64),
                    total_amount,
                    percentage,
                }
            })
            .collect();
        stats.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
        Ok(stats)
    }

    /// Goal progress for an owner's budget: the capped percent toward the
    /// planned amount plus a zero-filled daily activity series.
    ///
    /// The series spans `window_days` days back from `end_date` inclusive
    /// (`window_days + 1` points); each point sums that day's entries in
    /// both directions. `end_date` defaults to today.
    pub async fn rolling_progress(
        &self,
        owner: OwnerRef,
        end_date: Option<NaiveDate>,
        window_days: u64,
    ) -> LedgerResult<GoalProgress> {
        let budget = self.budget_for_owner(owner).await?;
        let end = end_date.unwrap_or_else(|| Utc::now().date_naive());
        let start = end
            .checked_sub_days(Days::new(window_days))
            .ok_or_else(|| LedgerError::Validation("window reaches before representable dates".to_string()))?;

        // Planned floored at one cent; a goal-less budget with any positive
        // balance saturates at 100%, an empty one stays at 0.
        let planned = budget.planned_amount.cents().max(1) as f64;
        let raw = budget.current_amount.cents() as f64 / planned * 100.0;
        let percent = (raw * 10.0).round() / 10.0;
        let percent = percent.min(100.0);

        let models = entries::Entity::find()
            .filter(entries::Column::BudgetId.eq(budget.id))
            .filter(entries::Column::OccurredOn.gte(start))
            .filter(entries::Column::OccurredOn.lte(end))
            .all(&self.database)
            .await?;
        let mut days: BTreeMap<NaiveDate, Money> = BTreeMap::new();
        for model in models {
            *days.entry(model.occurred_on).or_default() += Money::new(model.amount_cents);
        }

        let mut series = Vec::with_capacity(window_days as usize + 1);
        let mut date = start;
        while date <= end {
            series.push(DailyTotal {
                date,
                total: days.get(&date).copied().unwrap_or(Money::ZERO),
            });
            date = date
                .checked_add_days(Days::new(1))
                .ok_or_else(|| LedgerError::Validation("window reaches past representable dates".to_string()))?;
        }
        Ok(GoalProgress { percent, series })
    }

    /// Top contributors of income to a budget, largest first.
    pub async fn leaderboard(
        &self,
        budget_id: Uuid,
        top_n: u64,
    ) -> LedgerResult<Vec<Contribution>> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT payer_id, COALESCE(SUM(amount_cents), 0) AS total \
             FROM entries \
             WHERE budget_id = ? AND direction = ? \
             GROUP BY payer_id \
             ORDER BY total DESC \
             LIMIT ?",
            [
                budget_id.into(),
                Direction::Income.as_str().into(),
                (top_n as i64).into(),
            ],
        );
        let rows = self.database.query_all(stmt).await?;
        let mut contributions = Vec::with_capacity(rows.len());
        for row in rows {
            contributions.push(Contribution {
                payer_id: row.try_get("", "payer_id")?,
                total_contributed: Money::new(row.try_get("", "total")?),
            });
        }
        Ok(contributions)
    }
}
