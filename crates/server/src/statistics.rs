//! Statistics API endpoints

use api_types::stats::{
    AccrualCards, Cards, CashCards, CategoryCount, ChartPoint, Method, Period, StatsQuery,
    StatsResponse,
};
use axum::{Extension, Json, extract::{Query, State}};
use chrono::Utc;

use crate::{ServerError, server::ServerState, user};

fn map_period(period: Period) -> engine::Period {
    match period {
        Period::Today => engine::Period::Today,
        Period::Week => engine::Period::Week,
        Period::Month => engine::Period::Month,
        Period::Year => engine::Period::Year,
    }
}

fn map_method(method: Method) -> engine::AccountingMethod {
    match method {
        Method::CashBasis => engine::AccountingMethod::CashBasis,
        Method::AccrualBasis => engine::AccountingMethod::AccrualBasis,
    }
}

fn map_cards(cards: engine::Cards) -> Cards {
    match cards {
        engine::Cards::Accrual(cards) => Cards::Accrual(AccrualCards {
            sale_count: cards.sale_count,
            invoicing: cards.invoicing,
            avg_ticket: cards.avg_ticket,
            gross_profit: cards.gross_profit,
            net_profit: cards.net_profit,
        }),
        engine::Cards::Cash(cards) => Cards::Cash(CashCards {
            receipt: cards.receipt,
            period_result: cards.period_result,
            inflow: cards.inflow,
            outflow: cards.outflow,
            balance: cards.balance,
        }),
    }
}

/// Handle requests for the reporting dashboard: summary cards, top
/// categories and the period chart in one response.
pub async fn get_stats(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, ServerError> {
    let report = state
        .engine
        .stats(
            map_period(query.period),
            map_method(query.method),
            query.start_date,
            query.end_date,
            Utc::now(),
        )
        .await?;

    Ok(Json(StatsResponse {
        cards: map_cards(report.cards),
        top_categories: report
            .top_categories
            .into_iter()
            .map(|entry| CategoryCount {
                category: entry.category,
                count: entry.count,
            })
            .collect(),
        metrics_chart: report
            .metrics_chart
            .into_iter()
            .map(|point| ChartPoint {
                label: point.label,
                col_1: point.col_1,
                col_2: point.col_2,
            })
            .collect(),
    }))
}
