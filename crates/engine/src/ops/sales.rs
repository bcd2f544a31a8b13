//! Sale operations.
//!
//! Creating a sale records the economic event (the sale row and its
//! items) together with the first cash movement against it: the full
//! total for cash sales, or the first installment for installment sales.
//! Later installments append further inflow entries linked to the sale.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    Condition, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, SaleItem, customers,
    filter::{self, Field, FieldKind},
    ledger::{self, Flow, LedgerEntry},
    models, pagination, sale_items, sales,
    sort::{self, SortField},
    tz, views,
};

use super::{Engine, ListPage, ListQuery, list, payment_status, prorated_profit, with_tx};

/// Filterable columns of the sales table view.
pub const SALE_FIELDS: &[Field] = &[
    Field {
        name: "customerName",
        column: "customer_name",
        kind: FieldKind::Text,
    },
    Field {
        name: "status",
        column: "status",
        kind: FieldKind::Text,
    },
    Field {
        name: "total",
        column: "total_minor",
        kind: FieldKind::Number,
    },
    Field {
        name: "profit",
        column: "profit_minor",
        kind: FieldKind::Number,
    },
    Field {
        name: "itemCount",
        column: "item_count",
        kind: FieldKind::Number,
    },
    Field {
        name: "purchasedAt",
        column: "purchased_at",
        kind: FieldKind::Date,
    },
];

/// Sortable columns of the sales table view.
pub const SALE_SORTABLE: &[SortField] = &[
    SortField {
        name: "customerName",
        column: "customer_name",
    },
    SortField {
        name: "total",
        column: "total_minor",
    },
    SortField {
        name: "profit",
        column: "profit_minor",
    },
    SortField {
        name: "itemCount",
        column: "item_count",
    },
    SortField {
        name: "purchasedAt",
        column: "purchased_at",
    },
    SortField {
        name: "createdAt",
        column: "created_at",
    },
];

#[derive(Clone, Debug)]
pub struct SaleItemNew {
    pub model_id: Uuid,
    pub size: String,
    pub color: String,
    pub print: String,
    pub cost_price_minor: i64,
    pub sale_price_minor: i64,
}

#[derive(Clone, Debug)]
pub struct InstallmentNew {
    pub value_minor: i64,
    pub paid_at: NaiveDate,
}

#[derive(Clone, Debug)]
pub struct SaleNew {
    pub customer_id: Option<Uuid>,
    pub purchased_at: NaiveDate,
    pub items: Vec<SaleItemNew>,
    pub installment: Option<InstallmentNew>,
}

#[derive(Clone, Debug)]
pub struct SaleOverview {
    pub status: String,
    pub customer: Option<super::CustomerRef>,
    pub purchased_at: DateTime<Utc>,
    pub total_minor: i64,
    pub total_received_minor: i64,
    pub profit_minor: i64,
    pub profit_received_minor: i64,
}

#[derive(Clone, Debug)]
pub struct InstallmentView {
    pub id: Uuid,
    pub paid_at: DateTime<Utc>,
    pub value_minor: i64,
}

impl Engine {
    /// Records a sale: the sale row, its items and the initial inflow
    /// ledger entry, in one transaction.
    pub async fn create_sale(&self, new: SaleNew) -> ResultEngine<Uuid> {
        if new.items.is_empty() {
            return Err(EngineError::InvalidAmount(
                "a sale needs at least one item".to_string(),
            ));
        }

        let total_minor: i64 = new.items.iter().map(|item| item.sale_price_minor).sum();
        let profit_minor: i64 = new
            .items
            .iter()
            .map(|item| item.sale_price_minor - item.cost_price_minor)
            .sum();

        let sale_kind = if new.installment.is_some() {
            "Parcela 1"
        } else {
            "À vista"
        };

        with_tx!(self, |db_tx| {
            let description = match new.customer_id {
                Some(customer_id) => {
                    let customer = customers::Entity::find_by_id(customer_id.to_string())
                        .one(&db_tx)
                        .await?
                        .ok_or_else(|| {
                            EngineError::KeyNotFound("customer not exists".to_string())
                        })?;
                    let first_name = customer.name.split(' ').next().unwrap_or(&customer.name);
                    format!("Compra de {first_name} - {sale_kind}")
                }
                None => format!("Compra [sem cliente] - {sale_kind}"),
            };

            // Denormalize model and category names onto the items.
            let model_ids: Vec<String> = new
                .items
                .iter()
                .map(|item| item.model_id.to_string())
                .collect();
            let model_rows: Vec<(models::Model, Option<crate::categories::Model>)> =
                models::Entity::find()
                    .filter(models::Column::Id.is_in(model_ids))
                    .find_also_related(crate::categories::Entity)
                    .all(&db_tx)
                    .await?;

            let now = Utc::now();
            let sale = crate::Sale {
                id: Uuid::new_v4(),
                customer_id: new.customer_id,
                total_minor,
                profit_minor,
                is_installment: new.installment.is_some(),
                purchased_at: tz::day_start(new.purchased_at),
                created_at: now,
            };
            sales::ActiveModel::from(&sale).insert(&db_tx).await?;

            for item in &new.items {
                let (model, category) = model_rows
                    .iter()
                    .find(|(model, _)| model.id == item.model_id.to_string())
                    .ok_or_else(|| EngineError::KeyNotFound("model not exists".to_string()))?;
                let category_name = category
                    .as_ref()
                    .map(|category| category.name.clone())
                    .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;

                let sale_item = SaleItem {
                    id: Uuid::new_v4(),
                    sale_id: sale.id,
                    model_id: Some(item.model_id),
                    model_name: model.name.clone(),
                    category_name,
                    size: item.size.clone(),
                    color: item.color.clone(),
                    print: item.print.clone(),
                    cost_price_minor: item.cost_price_minor,
                    sale_price_minor: item.sale_price_minor,
                };
                sale_items::ActiveModel::from(&sale_item).insert(&db_tx).await?;
            }

            let (entry_date, entry_value) = match &new.installment {
                Some(installment) => (tz::day_start(installment.paid_at), installment.value_minor),
                None => (sale.purchased_at, total_minor),
            };
            let entry = LedgerEntry {
                id: Uuid::new_v4(),
                sale_id: Some(sale.id),
                flow: Flow::Inflow,
                date: entry_date,
                description,
                category: ledger::SALES_REVENUE.to_string(),
                value_minor: entry_value,
                created_at: now,
            };
            ledger::ActiveModel::from(&entry).insert(&db_tx).await?;

            Ok(sale.id)
        })
    }

    pub async fn sale_overview(&self, sale_id: Uuid) -> ResultEngine<SaleOverview> {
        let (sale, customer) = sales::Entity::find_by_id(sale_id.to_string())
            .find_also_related(customers::Entity)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("sale not exists".to_string()))?;

        let received_minor = self.sale_received(sale_id).await?;
        let customer = match customer {
            Some(model) => {
                let customer = crate::Customer::try_from(model)?;
                Some(super::CustomerRef {
                    id: customer.id,
                    name: customer.name,
                })
            }
            None => None,
        };

        Ok(SaleOverview {
            status: payment_status(received_minor, sale.total_minor).to_string(),
            customer,
            purchased_at: sale.purchased_at,
            total_minor: sale.total_minor,
            total_received_minor: received_minor,
            profit_minor: sale.profit_minor,
            profit_received_minor: prorated_profit(
                received_minor,
                sale.profit_minor,
                sale.total_minor,
            ),
        })
    }

    pub async fn sale_items(&self, sale_id: Uuid) -> ResultEngine<Vec<SaleItem>> {
        let models = sale_items::Entity::find()
            .filter(sale_items::Column::SaleId.eq(sale_id.to_string()))
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(SaleItem::try_from(model)?);
        }
        Ok(out)
    }

    /// The inflow entries recorded against a sale, newest first.
    pub async fn sale_installments(&self, sale_id: Uuid) -> ResultEngine<Vec<InstallmentView>> {
        let models = ledger::Entity::find()
            .filter(ledger::Column::SaleId.eq(sale_id.to_string()))
            .filter(ledger::Column::Flow.eq(Flow::Inflow.as_str()))
            .filter(ledger::Column::Category.eq(ledger::SALES_REVENUE))
            .order_by_desc(ledger::Column::Date)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let entry = LedgerEntry::try_from(model)?;
            out.push(InstallmentView {
                id: entry.id,
                paid_at: entry.date,
                value_minor: entry.value_minor,
            });
        }
        Ok(out)
    }

    /// Appends an installment payment to a sale.
    pub async fn create_installment(
        &self,
        sale_id: Uuid,
        new: InstallmentNew,
    ) -> ResultEngine<InstallmentView> {
        with_tx!(self, |db_tx| {
            let (sale, customer) = sales::Entity::find_by_id(sale_id.to_string())
                .find_also_related(customers::Entity)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("sale not exists".to_string()))?;

            let existing = ledger::Entity::find()
                .filter(ledger::Column::SaleId.eq(sale.id.clone()))
                .count(&db_tx)
                .await?;
            let installment_number = existing + 1;

            let payer = customer
                .map(|customer| customer.name)
                .unwrap_or_else(|| "[sem cliente]".to_string());
            let entry = LedgerEntry {
                id: Uuid::new_v4(),
                sale_id: Some(sale_id),
                flow: Flow::Inflow,
                date: tz::day_start(new.paid_at),
                description: format!("Compra de {payer} - Parcela {installment_number}"),
                category: ledger::SALES_REVENUE.to_string(),
                value_minor: new.value_minor,
                created_at: Utc::now(),
            };
            ledger::ActiveModel::from(&entry).insert(&db_tx).await?;

            Ok(InstallmentView {
                id: entry.id,
                paid_at: entry.date,
                value_minor: entry.value_minor,
            })
        })
    }

    /// Removes an installment entry. Only inflow entries recorded as sales
    /// revenue qualify; anything else is reported as missing.
    pub async fn delete_installment(&self, installment_id: Uuid) -> ResultEngine<()> {
        let deleted = ledger::Entity::delete_many()
            .filter(ledger::Column::Id.eq(installment_id.to_string()))
            .filter(ledger::Column::Flow.eq(Flow::Inflow.as_str()))
            .filter(ledger::Column::Category.eq(ledger::SALES_REVENUE))
            .exec(&self.database)
            .await?;

        if deleted.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(
                "installment not exists".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn delete_sale(&self, sale_id: Uuid) -> ResultEngine<()> {
        self.delete_sales(&[sale_id]).await
    }

    pub async fn delete_sales(&self, sale_ids: &[Uuid]) -> ResultEngine<()> {
        let ids: Vec<String> = sale_ids.iter().map(Uuid::to_string).collect();
        sales::Entity::delete_many()
            .filter(sales::Column::Id.is_in(ids))
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// The sales table against the `sale_stats` view.
    pub async fn list_sales(
        &self,
        query: &ListQuery,
    ) -> ResultEngine<ListPage<views::sale_stats::Model>> {
        let compiled = filter::compile(&query.filter, SALE_FIELDS)?;
        let order = sort::compile(&query.sort, SALE_SORTABLE)?;
        let page = pagination::compute(query.page, query.mode);

        list::fetch_page::<views::sale_stats::Entity>(
            &self.database,
            Condition::all().add(compiled),
            order,
            "created_at",
            page,
        )
        .await
    }

    /// Total inflow recorded against a sale.
    async fn sale_received(&self, sale_id: Uuid) -> ResultEngine<i64> {
        let backend = self.database.get_database_backend();
        let stmt = sea_orm::Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(SUM(value_minor), 0) AS sum \
             FROM ledger_entries \
             WHERE sale_id = ? AND flow = ?",
            vec![sale_id.to_string().into(), Flow::Inflow.as_str().into()],
        );
        let row = self.database.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0))
    }
}
