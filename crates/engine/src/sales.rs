//! Sale primitives.
//!
//! A `Sale` is the economic event (accrual side); the money actually
//! received against it lives in `ledger_entries` rows linked by `sale_id`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub total_minor: i64,
    pub profit_minor: i64,
    pub is_installment: bool,
    pub purchased_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub customer_id: Option<String>,
    pub total_minor: i64,
    pub profit_minor: i64,
    pub is_installment: bool,
    pub purchased_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(has_many = "super::sale_items::Entity")]
    SaleItems,
    #[sea_orm(has_many = "super::ledger::Entity")]
    LedgerEntries,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::sale_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleItems.def()
    }
}

impl Related<super::ledger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Sale> for ActiveModel {
    fn from(sale: &Sale) -> Self {
        Self {
            id: ActiveValue::Set(sale.id.to_string()),
            customer_id: ActiveValue::Set(sale.customer_id.map(|id| id.to_string())),
            total_minor: ActiveValue::Set(sale.total_minor),
            profit_minor: ActiveValue::Set(sale.profit_minor),
            is_installment: ActiveValue::Set(sale.is_installment),
            purchased_at: ActiveValue::Set(sale.purchased_at),
            created_at: ActiveValue::Set(sale.created_at),
        }
    }
}

impl TryFrom<Model> for Sale {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("sale not exists".to_string()))?,
            customer_id: model
                .customer_id
                .and_then(|id| Uuid::parse_str(&id).ok()),
            total_minor: model.total_minor,
            profit_minor: model.profit_minor,
            is_installment: model.is_installment,
            purchased_at: model.purchased_at,
            created_at: model.created_at,
        })
    }
}
