//! Reporting aggregations: chart buckets, summary cards and category
//! ranking.
//!
//! Everything here is read-only fan-out. Bucket aggregations run
//! concurrently and are written back into a preallocated, index-addressed
//! vector so chart values stay aligned with their labels no matter which
//! query finishes first. Any failing sub-query aborts the whole report;
//! there is no partial chart output.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement, Value};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::{
    EngineError, ResultEngine,
    ledger::{Flow, RECOGNIZED_CATEGORIES, SALES_REVENUE},
    periods::{self, Period},
    tz::DateRange,
};

use super::Engine;

/// How many ranked categories a report carries.
pub const TOP_CATEGORIES_LIMIT: u64 = 5;

/// When revenue and cost are recognized: when cash moves (ledger entry
/// date) or when the sale happens (purchase date).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountingMethod {
    CashBasis,
    AccrualBasis,
}

impl AccountingMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CashBasis => "cash_basis",
            Self::AccrualBasis => "accrual_basis",
        }
    }
}

impl TryFrom<&str> for AccountingMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "cash_basis" => Ok(Self::CashBasis),
            "accrual_basis" => Ok(Self::AccrualBasis),
            other => Err(EngineError::InvalidValue(format!(
                "invalid accounting method: {other}"
            ))),
        }
    }
}

/// One two-column chart value in minor units.
///
/// Cash basis: inflow/outflow. Accrual basis: gross revenue/costs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricPoint {
    pub col_1: i64,
    pub col_2: i64,
}

/// A labeled chart value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartPoint {
    pub label: String,
    pub col_1: i64,
    pub col_2: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccrualCards {
    pub sale_count: i64,
    pub invoicing: i64,
    pub avg_ticket: i64,
    pub gross_profit: i64,
    pub net_profit: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CashCards {
    pub receipt: i64,
    pub period_result: i64,
    pub inflow: i64,
    pub outflow: i64,
    /// Running balance since the beginning of records up to the window
    /// end, not window-scoped.
    pub balance: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cards {
    Accrual(AccrualCards),
    Cash(CashCards),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Clone, Debug)]
pub struct StatsReport {
    pub cards: Cards,
    pub top_categories: Vec<CategoryCount>,
    pub metrics_chart: Vec<ChartPoint>,
}

impl Engine {
    /// The chart series for a period: one metric point per bucket, in
    /// bucket order. `today` has no buckets and yields an empty series.
    pub async fn chart_data(
        &self,
        period: Period,
        method: AccountingMethod,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<ChartPoint>> {
        let buckets = periods::buckets(period, now);
        let ranges: Vec<DateRange> = buckets.iter().map(|bucket| bucket.range).collect();

        let db = self.database().clone();
        let points = collect_in_order(ranges.len(), MetricPoint::default(), |index| {
            let db = db.clone();
            let range = ranges[index];
            async move {
                match method {
                    AccountingMethod::CashBasis => cash_point(&db, range).await,
                    AccountingMethod::AccrualBasis => accrual_point(&db, range).await,
                }
            }
        })
        .await?;

        Ok(buckets
            .into_iter()
            .zip(points)
            .map(|(bucket, point)| ChartPoint {
                label: bucket.label,
                col_1: point.col_1,
                col_2: point.col_2,
            })
            .collect())
    }

    /// Single-window summary cards for the requested accounting method.
    pub async fn card_metrics(
        &self,
        window: DateRange,
        method: AccountingMethod,
    ) -> ResultEngine<Cards> {
        match method {
            AccountingMethod::AccrualBasis => {
                Ok(Cards::Accrual(self.accrual_cards(window).await?))
            }
            AccountingMethod::CashBasis => Ok(Cards::Cash(self.cash_cards(window).await?)),
        }
    }

    async fn accrual_cards(&self, window: DateRange) -> ResultEngine<AccrualCards> {
        let db = self.database();
        let (sales, items_cost, manual_revenue, expenses) = tokio::join!(
            sales_aggregate(db, window),
            sum_item_costs(db, window),
            sum_manual_revenue(db, window),
            sum_recognized_expenses(db, window),
        );
        let (sales_total, sale_count) = sales?;
        let items_cost = items_cost?;
        let manual_revenue = manual_revenue?;
        let expenses = expenses?;

        let invoicing = manual_revenue + sales_total;
        let avg_ticket = if sale_count > 0 {
            invoicing / sale_count
        } else {
            0
        };
        let gross_profit = invoicing - items_cost;

        Ok(AccrualCards {
            sale_count,
            invoicing,
            avg_ticket,
            gross_profit,
            net_profit: gross_profit - expenses,
        })
    }

    async fn cash_cards(&self, window: DateRange) -> ResultEngine<CashCards> {
        let db = self.database();
        let (receipt, inflow, outflow, hist_inflow, hist_outflow) = tokio::join!(
            sum_window_category(db, window, SALES_REVENUE),
            sum_window_flow(db, window, Flow::Inflow),
            sum_window_flow(db, window, Flow::Outflow),
            sum_flow_until(db, window.end, Flow::Inflow),
            sum_flow_until(db, window.end, Flow::Outflow),
        );
        let receipt = receipt?;
        let inflow = inflow?;
        let outflow = outflow?;
        let balance = hist_inflow? - hist_outflow?;

        Ok(CashCards {
            receipt,
            period_result: inflow - outflow,
            inflow,
            outflow,
            balance,
        })
    }

    /// Categories ranked by item count over sales purchased in the
    /// window. Ties break on the category name so the ranking is stable.
    pub async fn top_categories(
        &self,
        window: DateRange,
        limit: u64,
    ) -> ResultEngine<Vec<CategoryCount>> {
        let backend = self.database().get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT si.category_name AS category, COUNT(si.id) AS count \
             FROM sale_items si \
             JOIN sales s ON si.sale_id = s.id \
             WHERE s.purchased_at >= ? AND s.purchased_at <= ? \
             GROUP BY si.category_name \
             ORDER BY count DESC, si.category_name ASC \
             LIMIT ?",
            vec![window.start.into(), window.end.into(), (limit as i64).into()],
        );

        let rows = self.database().query_all(stmt).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(CategoryCount {
                category: row.try_get("", "category")?,
                count: row.try_get("", "count")?,
            });
        }
        Ok(out)
    }

    /// The full stats response: cards and top categories over the
    /// `start..=end` window, plus the period chart. The three parts are
    /// independent and run concurrently; any failure fails the report.
    pub async fn stats(
        &self,
        period: Period,
        method: AccountingMethod,
        start: NaiveDate,
        end: NaiveDate,
        now: DateTime<Utc>,
    ) -> ResultEngine<StatsReport> {
        let window = DateRange::days(start, end);

        let (cards, top_categories, metrics_chart) = tokio::join!(
            self.card_metrics(window, method),
            self.top_categories(window, TOP_CATEGORIES_LIMIT),
            self.chart_data(period, method, now),
        );

        Ok(StatsReport {
            cards: cards?,
            top_categories: top_categories?,
            metrics_chart: metrics_chart?,
        })
    }
}

/// Spawns `count` indexed tasks and reassembles their results in index
/// order, regardless of completion order. The first error wins and the
/// remaining tasks are dropped.
async fn collect_in_order<T, F, Fut>(count: usize, fill: T, make: F) -> ResultEngine<Vec<T>>
where
    T: Clone + Send + 'static,
    F: Fn(usize) -> Fut,
    Fut: Future<Output = ResultEngine<T>> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    for index in 0..count {
        let fut = make(index);
        tasks.spawn(async move { (index, fut.await) });
    }

    let mut results = vec![fill; count];
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.map_err(|err| EngineError::Internal(err.to_string()))?;
        results[index] = result?;
    }
    Ok(results)
}

/// Cash basis: money that actually moved in the range.
async fn cash_point(db: &DatabaseConnection, range: DateRange) -> ResultEngine<MetricPoint> {
    let (inflow, outflow) = tokio::join!(
        sum_window_flow(db, range, Flow::Inflow),
        sum_window_flow(db, range, Flow::Outflow),
    );
    Ok(MetricPoint {
        col_1: inflow?,
        col_2: outflow?,
    })
}

/// Accrual basis: revenue at sale date plus manually recorded revenue,
/// against item costs plus recognized expenses.
async fn accrual_point(db: &DatabaseConnection, range: DateRange) -> ResultEngine<MetricPoint> {
    let (sales, items_cost, manual_revenue, expenses) = tokio::join!(
        sales_aggregate(db, range),
        sum_item_costs(db, range),
        sum_manual_revenue(db, range),
        sum_recognized_expenses(db, range),
    );
    let (sales_total, _) = sales?;

    Ok(MetricPoint {
        col_1: sales_total + manual_revenue?,
        col_2: items_cost? + expenses?,
    })
}

/// Sum of sale totals and number of sales purchased in the range.
async fn sales_aggregate(db: &DatabaseConnection, range: DateRange) -> ResultEngine<(i64, i64)> {
    let backend = db.get_database_backend();
    let stmt = Statement::from_sql_and_values(
        backend,
        "SELECT COALESCE(SUM(total_minor), 0) AS sum, COUNT(id) AS count \
         FROM sales \
         WHERE purchased_at >= ? AND purchased_at <= ?",
        vec![range.start.into(), range.end.into()],
    );
    let row = db.query_one(stmt).await?;
    match row {
        Some(row) => Ok((row.try_get("", "sum")?, row.try_get("", "count")?)),
        None => Ok((0, 0)),
    }
}

/// Sum of item cost prices for sales purchased in the range.
async fn sum_item_costs(db: &DatabaseConnection, range: DateRange) -> ResultEngine<i64> {
    sum_query(
        db,
        "SELECT COALESCE(SUM(si.cost_price_minor), 0) AS sum \
         FROM sale_items si \
         JOIN sales s ON si.sale_id = s.id \
         WHERE s.purchased_at >= ? AND s.purchased_at <= ?",
        vec![range.start.into(), range.end.into()],
    )
    .await
}

/// Inflow entries in the range not linked to any sale (manually recorded
/// revenue), restricted to the recognized category set.
async fn sum_manual_revenue(db: &DatabaseConnection, range: DateRange) -> ResultEngine<i64> {
    let sql = format!(
        "SELECT COALESCE(SUM(value_minor), 0) AS sum \
         FROM ledger_entries \
         WHERE flow = ? AND sale_id IS NULL \
           AND category IN ({placeholders}) \
           AND date >= ? AND date <= ?",
        placeholders = category_placeholders(),
    );
    let mut values: Vec<Value> = vec![Flow::Inflow.as_str().into()];
    values.extend(RECOGNIZED_CATEGORIES.iter().map(|c| Value::from(*c)));
    values.push(range.start.into());
    values.push(range.end.into());
    sum_query(db, &sql, values).await
}

/// Outflow entries in the range, restricted to the recognized category
/// set.
async fn sum_recognized_expenses(db: &DatabaseConnection, range: DateRange) -> ResultEngine<i64> {
    let sql = format!(
        "SELECT COALESCE(SUM(value_minor), 0) AS sum \
         FROM ledger_entries \
         WHERE flow = ? AND category IN ({placeholders}) \
           AND date >= ? AND date <= ?",
        placeholders = category_placeholders(),
    );
    let mut values: Vec<Value> = vec![Flow::Outflow.as_str().into()];
    values.extend(RECOGNIZED_CATEGORIES.iter().map(|c| Value::from(*c)));
    values.push(range.start.into());
    values.push(range.end.into());
    sum_query(db, &sql, values).await
}

/// Ledger entries of one flow direction in the range.
async fn sum_window_flow(
    db: &DatabaseConnection,
    range: DateRange,
    flow: Flow,
) -> ResultEngine<i64> {
    sum_query(
        db,
        "SELECT COALESCE(SUM(value_minor), 0) AS sum \
         FROM ledger_entries \
         WHERE flow = ? AND date >= ? AND date <= ?",
        vec![flow.as_str().into(), range.start.into(), range.end.into()],
    )
    .await
}

/// Ledger entries of one category in the range, any flow direction.
async fn sum_window_category(
    db: &DatabaseConnection,
    range: DateRange,
    category: &str,
) -> ResultEngine<i64> {
    sum_query(
        db,
        "SELECT COALESCE(SUM(value_minor), 0) AS sum \
         FROM ledger_entries \
         WHERE category = ? AND date >= ? AND date <= ?",
        vec![category.into(), range.start.into(), range.end.into()],
    )
    .await
}

/// Ledger entries of one flow direction dated up to `until`, since the
/// beginning of records.
async fn sum_flow_until(
    db: &DatabaseConnection,
    until: DateTime<Utc>,
    flow: Flow,
) -> ResultEngine<i64> {
    sum_query(
        db,
        "SELECT COALESCE(SUM(value_minor), 0) AS sum \
         FROM ledger_entries \
         WHERE flow = ? AND date <= ?",
        vec![flow.as_str().into(), until.into()],
    )
    .await
}

fn category_placeholders() -> String {
    vec!["?"; RECOGNIZED_CATEGORIES.len()].join(", ")
}

async fn sum_query(
    db: &DatabaseConnection,
    sql: &str,
    values: Vec<Value>,
) -> ResultEngine<i64> {
    let backend = db.get_database_backend();
    let stmt = Statement::from_sql_and_values(backend, sql, values);
    let row = db.query_one(stmt).await?;
    Ok(row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0))
}
