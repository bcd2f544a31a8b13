//! Cash-flow (ledger) API endpoints

use api_types::ledger::{
    DeleteMany, Flow, LedgerEntryNew, LedgerEntryUpdate, LedgerEntryView, LedgerRow,
};
use api_types::list::{FilterBody, ListQuery, ListResponse};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, to_list_query, to_local, user};

fn map_flow(flow: Flow) -> engine::Flow {
    match flow {
        Flow::Inflow => engine::Flow::Inflow,
        Flow::Outflow => engine::Flow::Outflow,
    }
}

fn map_engine_flow(flow: engine::Flow) -> Flow {
    match flow {
        engine::Flow::Inflow => Flow::Inflow,
        engine::Flow::Outflow => Flow::Outflow,
    }
}

fn entry_view(entry: engine::LedgerEntry) -> LedgerEntryView {
    LedgerEntryView {
        id: entry.id,
        sale_id: entry.sale_id,
        flow: map_engine_flow(entry.flow),
        date: to_local(entry.date),
        description: entry.description,
        category: entry.category,
        value: entry.value_minor,
        created_at: to_local(entry.created_at),
    }
}

pub async fn create(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<LedgerEntryNew>,
) -> Result<Json<LedgerEntryView>, ServerError> {
    let entry = state
        .engine
        .create_ledger_entry(engine::LedgerEntryNew {
            flow: map_flow(payload.flow),
            date: payload.date,
            description: payload.description,
            category: payload.category,
            value_minor: engine::to_cents(payload.value),
        })
        .await?;

    Ok(Json(entry_view(entry)))
}

pub async fn update(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LedgerEntryUpdate>,
) -> Result<Json<LedgerEntryView>, ServerError> {
    let entry = state
        .engine
        .update_ledger_entry(
            id,
            engine::LedgerEntryUpdate {
                flow: payload.flow.map(map_flow),
                date: payload.date,
                description: payload.description,
                category: payload.category,
                value_minor: payload.value.map(engine::to_cents),
            },
        )
        .await?;

    Ok(Json(entry_view(entry)))
}

pub async fn delete(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_ledger_entry(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_many(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<DeleteMany>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_ledger_entries(&payload.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
    Json(body): Json<FilterBody>,
) -> Result<Json<ListResponse<LedgerRow>>, ServerError> {
    let page = state
        .engine
        .list_ledger_entries(&to_list_query(query, body))
        .await?;

    let mut rows = Vec::with_capacity(page.rows.len());
    for row in page.rows {
        rows.push(LedgerRow {
            id: Uuid::parse_str(&row.id)
                .map_err(|_| ServerError::Generic(format!("invalid row id: {}", row.id)))?,
            sale_id: row.sale_id.and_then(|id| Uuid::parse_str(&id).ok()),
            flow: row.flow,
            date: to_local(row.date),
            description: row.description,
            category: row.category,
            value: row.value_minor,
            created_at: to_local(row.created_at),
        });
    }

    Ok(Json(ListResponse {
        row_count: page.row_count,
        page_count: page.page_count,
        rows,
    }))
}
