//! Ledger primitives.
//!
//! A `LedgerEntry` is a recorded cash movement (cash side): a flow
//! direction, a date, a category and a value in minor units. Entries
//! created by a sale carry its `sale_id`; manually recorded revenue and
//! expenses have none.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// Accounting categories recognized by the reporting engine.
pub const OPERATIONAL_EXPENSE: &str = "OPERATIONAL_EXPENSE";
pub const PERSONNEL_EXPENSE: &str = "PERSONNEL_EXPENSE";
pub const TAX_EXPENSE: &str = "TAX_EXPENSE";
pub const SALES_REVENUE: &str = "SALES_REVENUE";
pub const OTHER_INCOME: &str = "OTHER_INCOME";

/// The category set that accrual-basis reports recognize as expense or
/// revenue. Entries outside this set are ignored by accrual aggregation.
pub const RECOGNIZED_CATEGORIES: [&str; 5] = [
    OPERATIONAL_EXPENSE,
    PERSONNEL_EXPENSE,
    TAX_EXPENSE,
    SALES_REVENUE,
    OTHER_INCOME,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Inflow,
    Outflow,
}

impl Flow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inflow => "inflow",
            Self::Outflow => "outflow",
        }
    }
}

impl TryFrom<&str> for Flow {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "inflow" => Ok(Self::Inflow),
            "outflow" => Ok(Self::Outflow),
            other => Err(EngineError::InvalidValue(format!(
                "invalid flow: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub sale_id: Option<Uuid>,
    pub flow: Flow,
    pub date: DateTime<Utc>,
    pub description: String,
    pub category: String,
    pub value_minor: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sale_id: Option<String>,
    pub flow: String,
    pub date: DateTimeUtc,
    pub description: String,
    pub category: String,
    pub value_minor: i64,
    pub created_at: DateTimeUtc,
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

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            sale_id: ActiveValue::Set(entry.sale_id.map(|id| id.to_string())),
            flow: ActiveValue::Set(entry.flow.as_str().to_string()),
            date: ActiveValue::Set(entry.date),
            description: ActiveValue::Set(entry.description.clone()),
            category: ActiveValue::Set(entry.category.clone()),
            value_minor: ActiveValue::Set(entry.value_minor),
            created_at: ActiveValue::Set(entry.created_at),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("ledger entry not exists".to_string()))?,
            sale_id: model.sale_id.and_then(|id| Uuid::parse_str(&id).ok()),
            flow: Flow::try_from(model.flow.as_str())?,
            date: model.date,
            description: model.description,
            category: model.category,
            value_minor: model.value_minor,
            created_at: model.created_at,
        })
    }
}
