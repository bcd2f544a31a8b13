//! Sale line items.
//!
//! Model and category names are denormalized onto the item at sale time so
//! reports stay stable when the catalog is edited later.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub model_id: Option<Uuid>,
    pub model_name: String,
    pub category_name: String,
    pub size: String,
    pub color: String,
    pub print: String,
    pub cost_price_minor: i64,
    pub sale_price_minor: i64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sale_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sale_id: String,
    pub model_id: Option<String>,
    pub model_name: String,
    pub category_name: String,
    pub size: String,
    pub color: String,
    pub print: String,
    pub cost_price_minor: i64,
    pub sale_price_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sales::Entity",
        from = "Column::SaleId",
        to = "super::sales::Column::Id"
    )]
    Sales,
}

impl Related<super::sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SaleItem> for ActiveModel {
    fn from(item: &SaleItem) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            sale_id: ActiveValue::Set(item.sale_id.to_string()),
            model_id: ActiveValue::Set(item.model_id.map(|id| id.to_string())),
            model_name: ActiveValue::Set(item.model_name.clone()),
            category_name: ActiveValue::Set(item.category_name.clone()),
            size: ActiveValue::Set(item.size.clone()),
            color: ActiveValue::Set(item.color.clone()),
            print: ActiveValue::Set(item.print.clone()),
            cost_price_minor: ActiveValue::Set(item.cost_price_minor),
            sale_price_minor: ActiveValue::Set(item.sale_price_minor),
        }
    }
}

impl TryFrom<Model> for SaleItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("sale item not exists".to_string()))?,
            sale_id: Uuid::parse_str(&model.sale_id)
                .map_err(|_| EngineError::KeyNotFound("sale not exists".to_string()))?,
            model_id: model.model_id.and_then(|id| Uuid::parse_str(&id).ok()),
            model_name: model.model_name,
            category_name: model.category_name,
            size: model.size,
            color: model.color,
            print: model.print,
            cost_price_minor: model.cost_price_minor,
            sale_price_minor: model.sale_price_minor,
        })
    }
}
