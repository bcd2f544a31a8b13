//! Sales API endpoints

use api_types::customer::CustomerRef;
use api_types::list::{FilterBody, ListQuery, ListResponse};
use api_types::sale::{
    DeleteMany, InstallmentNew, InstallmentView, SaleCreated, SaleItemView, SaleNew, SaleOverview,
    SaleRow,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, to_list_query, to_local, user};

pub async fn create(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SaleNew>,
) -> Result<Json<SaleCreated>, ServerError> {
    let items = payload
        .items
        .into_iter()
        .map(|item| engine::SaleItemNew {
            model_id: item.model_id,
            size: item.size,
            color: item.color,
            print: item.print,
            cost_price_minor: engine::to_cents(item.cost_price),
            sale_price_minor: engine::to_cents(item.sale_price),
        })
        .collect();

    let id = state
        .engine
        .create_sale(engine::SaleNew {
            customer_id: payload.customer_id,
            purchased_at: payload.purchased_at,
            items,
            installment: payload.installment.map(|installment| engine::InstallmentNew {
                value_minor: engine::to_cents(installment.value),
                paid_at: installment.paid_at,
            }),
        })
        .await?;

    Ok(Json(SaleCreated { id }))
}

pub async fn overview(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SaleOverview>, ServerError> {
    let overview = state.engine.sale_overview(id).await?;

    Ok(Json(SaleOverview {
        status: overview.status,
        customer: overview.customer.map(|customer| CustomerRef {
            id: customer.id,
            name: customer.name,
        }),
        purchased_at: to_local(overview.purchased_at),
        total: overview.total_minor,
        total_received: overview.total_received_minor,
        profit: overview.profit_minor,
        profit_received: overview.profit_received_minor,
    }))
}

pub async fn items(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SaleItemView>>, ServerError> {
    let items = state.engine.sale_items(id).await?;

    Ok(Json(
        items
            .into_iter()
            .map(|item| SaleItemView {
                id: item.id,
                category_name: item.category_name,
                model_name: item.model_name,
                size: item.size,
                color: item.color,
                print: item.print,
                cost_price: item.cost_price_minor,
                sale_price: item.sale_price_minor,
            })
            .collect(),
    ))
}

pub async fn installments(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<InstallmentView>>, ServerError> {
    let installments = state.engine.sale_installments(id).await?;

    Ok(Json(
        installments
            .into_iter()
            .map(|installment| InstallmentView {
                id: installment.id,
                paid_at: to_local(installment.paid_at),
                value: installment.value_minor,
            })
            .collect(),
    ))
}

pub async fn create_installment(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InstallmentNew>,
) -> Result<Json<InstallmentView>, ServerError> {
    let installment = state
        .engine
        .create_installment(
            id,
            engine::InstallmentNew {
                value_minor: engine::to_cents(payload.value),
                paid_at: payload.paid_at,
            },
        )
        .await?;

    Ok(Json(InstallmentView {
        id: installment.id,
        paid_at: to_local(installment.paid_at),
        value: installment.value_minor,
    }))
}

pub async fn delete_installment(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path((_sale_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_installment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_sale(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_many(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<DeleteMany>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_sales(&payload.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
    Json(body): Json<FilterBody>,
) -> Result<Json<ListResponse<SaleRow>>, ServerError> {
    let page = state.engine.list_sales(&to_list_query(query, body)).await?;

    let mut rows = Vec::with_capacity(page.rows.len());
    for row in page.rows {
        let id = Uuid::parse_str(&row.id)
            .map_err(|_| ServerError::Generic(format!("invalid row id: {}", row.id)))?;
        let customer = match (row.customer_id, row.customer_name) {
            (Some(customer_id), Some(name)) => Uuid::parse_str(&customer_id)
                .ok()
                .map(|id| CustomerRef { id, name }),
            _ => None,
        };

        rows.push(SaleRow {
            id,
            customer,
            total: row.total_minor,
            profit: row.profit_minor,
            item_count: row.item_count,
            status: row.status,
            is_installment: row.is_installment,
            purchased_at: to_local(row.purchased_at),
            created_at: to_local(row.created_at),
        });
    }

    Ok(Json(ListResponse {
        row_count: page.row_count,
        page_count: page.page_count,
        rows,
    }))
}
