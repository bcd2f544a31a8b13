//! Customers API endpoints

use api_types::customer::{
    AutocompleteQuery, CustomerNew, CustomerOverview, CustomerRef, CustomerRow, CustomerUpdate,
    DeleteMany, DeleteQuery, PurchaseRow,
};
use api_types::list::{FilterBody, ListQuery, ListResponse};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, to_list_query, to_local, user};

fn parse_row_id(id: &str) -> Result<Uuid, ServerError> {
    Uuid::parse_str(id).map_err(|_| ServerError::Generic(format!("invalid row id: {id}")))
}

pub async fn create(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CustomerNew>,
) -> Result<Json<CustomerRef>, ServerError> {
    let customer = state
        .engine
        .create_customer(
            &payload.name,
            payload.phone.as_deref(),
            payload.note.as_deref(),
        )
        .await?;

    Ok(Json(CustomerRef {
        id: customer.id,
        name: customer.name,
    }))
}

pub async fn update(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomerUpdate>,
) -> Result<Json<CustomerRef>, ServerError> {
    let customer = state
        .engine
        .update_customer(
            id,
            engine::CustomerUpdate {
                name: payload.name,
                phone: payload.phone,
                note: payload.note,
            },
        )
        .await?;

    Ok(Json(CustomerRef {
        id: customer.id,
        name: customer.name,
    }))
}

pub async fn overview(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerOverview>, ServerError> {
    let overview = state.engine.customer_overview(id).await?;

    Ok(Json(CustomerOverview {
        name: overview.name,
        phone: overview.phone,
        last_purchase_at: overview.last_purchase_at.map(to_local),
    }))
}

pub async fn purchases(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PurchaseRow>>, ServerError> {
    let purchases = state.engine.customer_purchases(id).await?;

    let rows = purchases
        .into_iter()
        .map(|purchase| PurchaseRow {
            id: purchase.id,
            item_count: purchase.item_count,
            installment_count: purchase.installment_count,
            status: purchase.status,
            purchased_at: to_local(purchase.purchased_at),
            total: purchase.total_minor,
            total_received: purchase.total_received_minor,
            profit: purchase.profit_minor,
            profit_received: purchase.profit_received_minor,
        })
        .collect();

    Ok(Json(rows))
}

pub async fn autocomplete(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<AutocompleteQuery>,
) -> Result<Json<Vec<CustomerRef>>, ServerError> {
    let matches = state
        .engine
        .autocomplete_customers(query.search.as_deref().unwrap_or(""))
        .await?;

    Ok(Json(
        matches
            .into_iter()
            .map(|customer| CustomerRef {
                id: customer.id,
                name: customer.name,
            })
            .collect(),
    ))
}

pub async fn list(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
    Json(body): Json<FilterBody>,
) -> Result<Json<ListResponse<CustomerRow>>, ServerError> {
    let page = state
        .engine
        .list_customers(&to_list_query(query, body))
        .await?;

    let mut rows = Vec::with_capacity(page.rows.len());
    for row in page.rows {
        rows.push(CustomerRow {
            id: parse_row_id(&row.id)?,
            name: row.name,
            phone: row.phone,
            total_spent: row.total_spent,
            debt: row.debt,
            last_purchase_at: row.last_purchase_at.map(to_local),
            created_at: to_local(row.created_at),
        });
    }

    Ok(Json(ListResponse {
        row_count: page.row_count,
        page_count: page.page_count,
        rows,
    }))
}

pub async fn delete(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_customer(id, query.delete_sales.unwrap_or(false))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_many(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<DeleteQuery>,
    Json(payload): Json<DeleteMany>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_customers(&payload.ids, query.delete_sales.unwrap_or(false))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
