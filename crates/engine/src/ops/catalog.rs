//! Catalog operations: categories and their product models.

use chrono::Utc;
use sea_orm::{
    ActiveValue, LoaderTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
    sea_query::{Alias, Expr},
};
use uuid::Uuid;

use crate::{
    Category, EngineError, ProductModel, ResultEngine, categories, filter, models,
};

use super::{Engine, with_tx};

#[derive(Clone, Debug)]
pub struct ModelNew {
    pub name: String,
    pub cost_price_minor: Option<i64>,
    pub sale_price_minor: Option<i64>,
}

#[derive(Clone, Debug, Default)]
pub struct ModelUpdate {
    pub name: Option<String>,
    pub cost_price_minor: Option<i64>,
    pub sale_price_minor: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct CategoryWithModels {
    pub category: Category,
    pub models: Vec<ProductModel>,
}

impl Engine {
    /// Creates a category, optionally with an initial set of models.
    ///
    /// Names are unique modulo Unicode normalization and case; a clash is
    /// reported as an existing key.
    pub async fn create_category(
        &self,
        name: &str,
        new_models: Vec<ModelNew>,
    ) -> ResultEngine<CategoryWithModels> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidValue(
                "category name must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let clash = categories::Entity::find()
                .filter(categories::Column::NameNorm.eq(categories::normalize_name(name)))
                .one(&db_tx)
                .await?;
            if clash.is_some() {
                return Err(EngineError::ExistingKey(name.to_string()));
            }

            let category = Category {
                id: Uuid::new_v4(),
                name: name.to_string(),
                created_at: Utc::now(),
            };
            categories::ActiveModel::from(&category).insert(&db_tx).await?;

            let mut created = Vec::with_capacity(new_models.len());
            for new in new_models {
                let model = ProductModel {
                    id: Uuid::new_v4(),
                    category_id: category.id,
                    name: new.name,
                    cost_price_minor: new.cost_price_minor,
                    sale_price_minor: new.sale_price_minor,
                    created_at: Utc::now(),
                };
                models::ActiveModel::from(&model).insert(&db_tx).await?;
                created.push(model);
            }

            Ok(CategoryWithModels {
                category,
                models: created,
            })
        })
    }

    /// Lists categories by name prefix, optionally embedding their models.
    pub async fn list_categories(
        &self,
        search: Option<&str>,
        fetch_models: bool,
        limit: Option<u64>,
    ) -> ResultEngine<Vec<CategoryWithModels>> {
        let mut query = categories::Entity::find().order_by_asc(categories::Column::Name);
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            query = query.filter(
                Expr::col(Alias::new("name")).like(filter::like_pattern("", search, "%")),
            );
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let category_models = query.all(&self.database).await?;
        let model_groups: Vec<Vec<models::Model>> = if fetch_models {
            category_models
                .load_many(models::Entity, &self.database)
                .await?
        } else {
            vec![Vec::new(); category_models.len()]
        };

        let mut out = Vec::with_capacity(category_models.len());
        for (category_model, model_models) in category_models.into_iter().zip(model_groups) {
            let category = Category::try_from(category_model)?;
            let mut embedded = Vec::with_capacity(model_models.len());
            for model in model_models {
                embedded.push(ProductModel::try_from(model)?);
            }
            out.push(CategoryWithModels {
                category,
                models: embedded,
            });
        }
        Ok(out)
    }

    /// Narrow variant of [`list_categories`](Self::list_categories) for
    /// autocomplete widgets.
    pub async fn autocomplete_categories(
        &self,
        search: &str,
        fetch_models: bool,
    ) -> ResultEngine<Vec<CategoryWithModels>> {
        self.list_categories(Some(search), fetch_models, Some(5)).await
    }

    pub async fn update_category(&self, category_id: Uuid, name: &str) -> ResultEngine<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidValue(
                "category name must not be empty".to_string(),
            ));
        }

        let model = categories::Entity::find_by_id(category_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;

        let mut active: categories::ActiveModel = model.into();
        active.name = ActiveValue::Set(name.to_string());
        active.name_norm = ActiveValue::Set(categories::normalize_name(name));
        let updated = active.update(&self.database).await?;
        Category::try_from(updated)
    }

    pub async fn delete_category(&self, category_id: Uuid) -> ResultEngine<()> {
        let deleted = categories::Entity::delete_by_id(category_id.to_string())
            .exec(&self.database)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("category not exists".to_string()));
        }
        Ok(())
    }

    pub async fn create_model(
        &self,
        category_id: Uuid,
        new: ModelNew,
    ) -> ResultEngine<ProductModel> {
        let category = categories::Entity::find_by_id(category_id.to_string())
            .one(&self.database)
            .await?;
        if category.is_none() {
            return Err(EngineError::KeyNotFound("category not exists".to_string()));
        }

        let model = ProductModel {
            id: Uuid::new_v4(),
            category_id,
            name: new.name,
            cost_price_minor: new.cost_price_minor,
            sale_price_minor: new.sale_price_minor,
            created_at: Utc::now(),
        };
        models::ActiveModel::from(&model).insert(&self.database).await?;
        Ok(model)
    }

    pub async fn update_model(
        &self,
        category_id: Uuid,
        model_id: Uuid,
        update: ModelUpdate,
    ) -> ResultEngine<ProductModel> {
        let model = models::Entity::find_by_id(model_id.to_string())
            .filter(models::Column::CategoryId.eq(category_id.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("model not exists".to_string()))?;

        let mut active: models::ActiveModel = model.into();
        if let Some(name) = update.name {
            active.name = ActiveValue::Set(name);
        }
        if let Some(cost) = update.cost_price_minor {
            active.cost_price_minor = ActiveValue::Set(Some(cost));
        }
        if let Some(sale) = update.sale_price_minor {
            active.sale_price_minor = ActiveValue::Set(Some(sale));
        }
        let updated = active.update(&self.database).await?;
        ProductModel::try_from(updated)
    }

    pub async fn delete_model(&self, model_id: Uuid) -> ResultEngine<()> {
        let deleted = models::Entity::delete_by_id(model_id.to_string())
            .exec(&self.database)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("model not exists".to_string()));
        }
        Ok(())
    }
}
