//! Customer operations.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
    TransactionTrait,
    prelude::*,
    sea_query::{Alias, Expr},
};
use uuid::Uuid;

use crate::{
    Customer, EngineError, ResultEngine, customers,
    filter::{self, Field, FieldKind},
    ledger, pagination, sales,
    sort::{self, SortField},
    views,
};

use super::{Engine, ListPage, ListQuery, list, payment_status, prorated_profit, with_tx};

/// Filterable columns of the customer table view.
pub const CUSTOMER_FIELDS: &[Field] = &[
    Field {
        name: "name",
        column: "name",
        kind: FieldKind::Text,
    },
    Field {
        name: "phone",
        column: "phone",
        kind: FieldKind::Text,
    },
    Field {
        name: "debt",
        column: "debt",
        kind: FieldKind::Number,
    },
    Field {
        name: "totalSpent",
        column: "total_spent",
        kind: FieldKind::Number,
    },
    Field {
        name: "lastPurchaseAt",
        column: "last_purchase_at",
        kind: FieldKind::Date,
    },
];

/// Sortable columns of the customer table view.
pub const CUSTOMER_SORTABLE: &[SortField] = &[
    SortField {
        name: "name",
        column: "name",
    },
    SortField {
        name: "phone",
        column: "phone",
    },
    SortField {
        name: "debt",
        column: "debt",
    },
    SortField {
        name: "totalSpent",
        column: "total_spent",
    },
    SortField {
        name: "lastPurchaseAt",
        column: "last_purchase_at",
    },
    SortField {
        name: "createdAt",
        column: "created_at",
    },
];

/// Minimal customer reference, for create responses and autocomplete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomerRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Clone, Debug, Default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub note: Option<String>,
}

#[derive(Clone, Debug)]
pub struct CustomerOverview {
    pub name: String,
    pub phone: Option<String>,
    pub last_purchase_at: Option<DateTime<Utc>>,
}

/// One sale of a customer, annotated with payment progress.
#[derive(Clone, Debug)]
pub struct PurchaseSummary {
    pub id: Uuid,
    pub item_count: i64,
    pub installment_count: i64,
    pub status: String,
    pub purchased_at: DateTime<Utc>,
    pub total_minor: i64,
    pub total_received_minor: i64,
    pub profit_minor: i64,
    pub profit_received_minor: i64,
}

impl Engine {
    pub async fn create_customer(
        &self,
        name: &str,
        phone: Option<&str>,
        note: Option<&str>,
    ) -> ResultEngine<Customer> {
        let customer = Customer::new(
            name.trim().to_string(),
            phone.map(str::to_string),
            note.map(str::to_string),
            Utc::now(),
        );
        customers::ActiveModel::from(&customer)
            .insert(&self.database)
            .await?;
        Ok(customer)
    }

    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        update: CustomerUpdate,
    ) -> ResultEngine<Customer> {
        let model = customers::Entity::find_by_id(customer_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("customer not exists".to_string()))?;

        let mut active: customers::ActiveModel = model.into();
        if let Some(name) = update.name {
            active.name = ActiveValue::Set(name);
        }
        if let Some(phone) = update.phone {
            active.phone = ActiveValue::Set(Some(phone));
        }
        if let Some(note) = update.note {
            active.note = ActiveValue::Set(Some(note));
        }
        let updated = active.update(&self.database).await?;
        Customer::try_from(updated)
    }

    /// Name, phone and most recent purchase date of a customer.
    pub async fn customer_overview(&self, customer_id: Uuid) -> ResultEngine<CustomerOverview> {
        let model = customers::Entity::find_by_id(customer_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("customer not exists".to_string()))?;

        let last_purchase = sales::Entity::find()
            .filter(sales::Column::CustomerId.eq(customer_id.to_string()))
            .order_by_desc(sales::Column::PurchasedAt)
            .one(&self.database)
            .await?;

        Ok(CustomerOverview {
            name: model.name,
            phone: model.phone,
            last_purchase_at: last_purchase.map(|sale| sale.purchased_at),
        })
    }

    /// All sales of a customer with per-sale payment progress.
    ///
    /// `profit_received` is the sale's profit pro-rata to the amount
    /// already received.
    pub async fn customer_purchases(
        &self,
        customer_id: Uuid,
    ) -> ResultEngine<Vec<PurchaseSummary>> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT s.id, s.total_minor, s.profit_minor, s.purchased_at, \
               (SELECT COUNT(*) FROM sale_items si WHERE si.sale_id = s.id) AS item_count, \
               (SELECT COUNT(*) FROM ledger_entries le WHERE le.sale_id = s.id) AS installment_count, \
               COALESCE((SELECT SUM(le.value_minor) FROM ledger_entries le \
                 WHERE le.sale_id = s.id AND le.flow = ?), 0) AS received_minor \
             FROM sales s \
             WHERE s.customer_id = ? \
             ORDER BY s.purchased_at DESC",
            vec![
                ledger::Flow::Inflow.as_str().into(),
                customer_id.to_string().into(),
            ],
        );

        let rows = self.database.query_all(stmt).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("", "id")?;
            let total_minor: i64 = row.try_get("", "total_minor")?;
            let profit_minor: i64 = row.try_get("", "profit_minor")?;
            let purchased_at: DateTime<Utc> = row.try_get("", "purchased_at")?;
            let item_count: i64 = row.try_get("", "item_count")?;
            let installment_count: i64 = row.try_get("", "installment_count")?;
            let received_minor: i64 = row.try_get("", "received_minor")?;

            out.push(PurchaseSummary {
                id: Uuid::parse_str(&id)
                    .map_err(|_| EngineError::KeyNotFound("sale not exists".to_string()))?,
                item_count,
                installment_count,
                status: payment_status(received_minor, total_minor).to_string(),
                purchased_at,
                total_minor,
                total_received_minor: received_minor,
                profit_minor,
                profit_received_minor: prorated_profit(received_minor, profit_minor, total_minor),
            });
        }
        Ok(out)
    }

    /// Narrow contains-search over name and phone, newest five first.
    pub async fn autocomplete_customers(&self, search: &str) -> ResultEngine<Vec<CustomerRef>> {
        let matches = Condition::any()
            .add(
                Expr::col(Alias::new("name"))
                    .like(filter::like_pattern("%", search, "%")),
            )
            .add(
                Expr::col(Alias::new("phone"))
                    .like(filter::like_pattern("%", search, "%")),
            );

        let models = customers::Entity::find()
            .filter(matches)
            .order_by_desc(customers::Column::CreatedAt)
            .limit(5)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let customer = Customer::try_from(model)?;
            out.push(CustomerRef {
                id: customer.id,
                name: customer.name,
            });
        }
        Ok(out)
    }

    /// The customers table: compiled filters plus a name/phone prefix
    /// search, against the `customer_stats` view.
    pub async fn list_customers(
        &self,
        query: &ListQuery,
    ) -> ResultEngine<ListPage<views::customer_stats::Model>> {
        let compiled = filter::compile(&query.filter, CUSTOMER_FIELDS)?;
        let order = sort::compile(&query.sort, CUSTOMER_SORTABLE)?;
        let page = pagination::compute(query.page, query.mode);

        let mut condition = Condition::all().add(compiled);
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            condition = condition.add(
                Condition::any()
                    .add(
                        Expr::col(Alias::new("name"))
                            .like(filter::like_pattern("", search, "%")),
                    )
                    .add(
                        Expr::col(Alias::new("phone"))
                            .like(filter::like_pattern("", search, "%")),
                    ),
            );
        }

        list::fetch_page::<views::customer_stats::Entity>(
            &self.database,
            condition,
            order,
            "created_at",
            page,
        )
        .await
    }

    /// Deletes a customer; with `delete_sales` the customer's sales (and
    /// their items and ledger entries) go too, otherwise the sales are
    /// kept unassigned.
    pub async fn delete_customer(&self, customer_id: Uuid, delete_sales: bool) -> ResultEngine<()> {
        self.delete_customers(&[customer_id], delete_sales).await
    }

    pub async fn delete_customers(
        &self,
        customer_ids: &[Uuid],
        delete_sales: bool,
    ) -> ResultEngine<()> {
        let ids: Vec<String> = customer_ids.iter().map(Uuid::to_string).collect();
        with_tx!(self, |db_tx| {
            if delete_sales {
                sales::Entity::delete_many()
                    .filter(sales::Column::CustomerId.is_in(ids.clone()))
                    .exec(&db_tx)
                    .await?;
            }
            customers::Entity::delete_many()
                .filter(customers::Column::Id.is_in(ids))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
