//! Catalog API endpoints (categories and models)

use api_types::catalog::{
    CatalogQuery, CategoryNew, CategoryUpdate, CategoryView, ModelNew, ModelUpdate, ModelView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_model_new(model: ModelNew) -> engine::ModelNew {
    engine::ModelNew {
        name: model.name,
        cost_price_minor: model.cost_price.map(engine::to_cents),
        sale_price_minor: model.sale_price.map(engine::to_cents),
    }
}

fn model_view(model: engine::ProductModel) -> ModelView {
    ModelView {
        id: model.id,
        name: model.name,
        cost_price: model.cost_price_minor,
        sale_price: model.sale_price_minor,
    }
}

fn category_view(entry: engine::CategoryWithModels) -> CategoryView {
    CategoryView {
        id: entry.category.id,
        name: entry.category.name,
        models: entry.models.into_iter().map(model_view).collect(),
    }
}

pub async fn create(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<Json<CategoryView>, ServerError> {
    let models = payload
        .models
        .unwrap_or_default()
        .into_iter()
        .map(map_model_new)
        .collect();

    let created = state.engine.create_category(&payload.name, models).await?;
    Ok(Json(category_view(created)))
}

pub async fn list(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let fetch_models = query.fetch_models.as_deref() == Some("true");
    let categories = state
        .engine
        .list_categories(query.search.as_deref(), fetch_models, None)
        .await?;

    Ok(Json(categories.into_iter().map(category_view).collect()))
}

pub async fn autocomplete(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let fetch_models = query.fetch_models.as_deref() == Some("true");
    let categories = state
        .engine
        .autocomplete_categories(query.search.as_deref().unwrap_or(""), fetch_models)
        .await?;

    Ok(Json(categories.into_iter().map(category_view).collect()))
}

pub async fn update_category(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.update_category(id, &payload.name).await?;
    Ok(Json(CategoryView {
        id: category.id,
        name: category.name,
        models: Vec::new(),
    }))
}

pub async fn delete_category(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_model(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModelNew>,
) -> Result<Json<ModelView>, ServerError> {
    let model = state.engine.create_model(id, map_model_new(payload)).await?;
    Ok(Json(model_view(model)))
}

pub async fn update_model(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path((category_id, model_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ModelUpdate>,
) -> Result<Json<ModelView>, ServerError> {
    let model = state
        .engine
        .update_model(
            category_id,
            model_id,
            engine::ModelUpdate {
                name: payload.name,
                cost_price_minor: payload.cost_price.map(engine::to_cents),
                sale_price_minor: payload.sale_price.map(engine::to_cents),
            },
        )
        .await?;

    Ok(Json(model_view(model)))
}

pub async fn delete_model(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path((_category_id, model_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_model(model_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
