//! Catalog product models (a named article within a category, with
//! optional default prices).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductModel {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub cost_price_minor: Option<i64>,
    pub sale_price_minor: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "models")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub cost_price_minor: Option<i64>,
    pub sale_price_minor: Option<i64>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Categories,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ProductModel> for ActiveModel {
    fn from(model: &ProductModel) -> Self {
        Self {
            id: ActiveValue::Set(model.id.to_string()),
            category_id: ActiveValue::Set(model.category_id.to_string()),
            name: ActiveValue::Set(model.name.clone()),
            cost_price_minor: ActiveValue::Set(model.cost_price_minor),
            sale_price_minor: ActiveValue::Set(model.sale_price_minor),
            created_at: ActiveValue::Set(model.created_at),
        }
    }
}

impl TryFrom<Model> for ProductModel {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("model not exists".to_string()))?,
            category_id: Uuid::parse_str(&model.category_id)
                .map_err(|_| EngineError::KeyNotFound("category not exists".to_string()))?,
            name: model.name,
            cost_price_minor: model.cost_price_minor,
            sale_price_minor: model.sale_price_minor,
            created_at: model.created_at,
        })
    }
}
