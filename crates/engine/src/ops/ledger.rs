//! Ledger entry operations (manual cash movements).

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, Condition, QueryFilter, TransactionTrait, prelude::*,
    sea_query::{Alias, Expr},
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    filter::{self, Field, FieldKind},
    ledger::{self, Flow, LedgerEntry},
    pagination, sales,
    sort::{self, SortField},
    tz, views,
};

use super::{Engine, ListPage, ListQuery, list, with_tx};

/// Filterable columns of the ledger table view.
pub const LEDGER_FIELDS: &[Field] = &[
    Field {
        name: "description",
        column: "description",
        kind: FieldKind::Text,
    },
    Field {
        name: "category",
        column: "category",
        kind: FieldKind::Text,
    },
    Field {
        name: "flow",
        column: "flow",
        kind: FieldKind::Text,
    },
    Field {
        name: "value",
        column: "value_minor",
        kind: FieldKind::Number,
    },
    Field {
        name: "date",
        column: "date",
        kind: FieldKind::Date,
    },
];

/// Sortable columns of the ledger table view.
pub const LEDGER_SORTABLE: &[SortField] = &[
    SortField {
        name: "description",
        column: "description",
    },
    SortField {
        name: "category",
        column: "category",
    },
    SortField {
        name: "flow",
        column: "flow",
    },
    SortField {
        name: "value",
        column: "value_minor",
    },
    SortField {
        name: "date",
        column: "date",
    },
    SortField {
        name: "createdAt",
        column: "created_at",
    },
];

#[derive(Clone, Debug)]
pub struct LedgerEntryNew {
    pub flow: Flow,
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub value_minor: i64,
}

#[derive(Clone, Debug, Default)]
pub struct LedgerEntryUpdate {
    pub flow: Option<Flow>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub value_minor: Option<i64>,
}

impl Engine {
    pub async fn create_ledger_entry(&self, new: LedgerEntryNew) -> ResultEngine<LedgerEntry> {
        let entry = LedgerEntry {
            id: Uuid::new_v4(),
            sale_id: None,
            flow: new.flow,
            date: tz::day_start(new.date),
            description: new.description,
            category: new.category,
            value_minor: new.value_minor,
            created_at: Utc::now(),
        };
        ledger::ActiveModel::from(&entry).insert(&self.database).await?;
        Ok(entry)
    }

    pub async fn update_ledger_entry(
        &self,
        entry_id: Uuid,
        update: LedgerEntryUpdate,
    ) -> ResultEngine<LedgerEntry> {
        let model = ledger::Entity::find_by_id(entry_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("ledger entry not exists".to_string()))?;

        let mut active: ledger::ActiveModel = model.into();
        if let Some(flow) = update.flow {
            active.flow = ActiveValue::Set(flow.as_str().to_string());
        }
        if let Some(date) = update.date {
            active.date = ActiveValue::Set(tz::day_start(date));
        }
        if let Some(description) = update.description {
            active.description = ActiveValue::Set(description);
        }
        if let Some(category) = update.category {
            active.category = ActiveValue::Set(category);
        }
        if let Some(value_minor) = update.value_minor {
            active.value_minor = ActiveValue::Set(value_minor);
        }

        let updated = active.update(&self.database).await?;
        LedgerEntry::try_from(updated)
    }

    /// Deletes a ledger entry. An entry that recorded a payment against a
    /// sale takes the sale (and its items and remaining entries) with it.
    pub async fn delete_ledger_entry(&self, entry_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = ledger::Entity::find_by_id(entry_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("ledger entry not exists".to_string()))?;

            let sale_id = model.sale_id.clone();
            ledger::Entity::delete_by_id(model.id).exec(&db_tx).await?;

            if let Some(sale_id) = sale_id {
                sales::Entity::delete_by_id(sale_id).exec(&db_tx).await?;
            }
            Ok(())
        })
    }

    pub async fn delete_ledger_entries(&self, entry_ids: &[Uuid]) -> ResultEngine<()> {
        let ids: Vec<String> = entry_ids.iter().map(Uuid::to_string).collect();
        ledger::Entity::delete_many()
            .filter(ledger::Column::Id.is_in(ids))
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// The ledger table: compiled filters plus a description prefix
    /// search, against the `ledger_stats` view.
    pub async fn list_ledger_entries(
        &self,
        query: &ListQuery,
    ) -> ResultEngine<ListPage<views::ledger_stats::Model>> {
        let compiled = filter::compile(&query.filter, LEDGER_FIELDS)?;
        let order = sort::compile(&query.sort, LEDGER_SORTABLE)?;
        let page = pagination::compute(query.page, query.mode);

        let mut condition = Condition::all().add(compiled);
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            condition = condition.add(
                Expr::col(Alias::new("description"))
                    .like(filter::like_pattern("", search, "%")),
            );
        }

        list::fetch_page::<views::ledger_stats::Entity>(
            &self.database,
            condition,
            order,
            "created_at",
            page,
        )
        .await
    }
}
