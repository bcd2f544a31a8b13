use sea_orm::DatabaseConnection;

mod catalog;
mod customers;
mod ledger;
mod list;
mod sales;
mod stats;

pub use catalog::{CategoryWithModels, ModelNew, ModelUpdate};
pub use customers::{
    CUSTOMER_FIELDS, CUSTOMER_SORTABLE, CustomerRef, CustomerOverview, CustomerUpdate,
    PurchaseSummary,
};
pub use ledger::{LEDGER_FIELDS, LEDGER_SORTABLE, LedgerEntryNew, LedgerEntryUpdate};
pub use list::{ListPage, ListQuery};
pub use sales::{
    SALE_FIELDS, SALE_SORTABLE, InstallmentNew, InstallmentView, SaleItemNew, SaleNew,
    SaleOverview,
};
pub use stats::{
    AccountingMethod, AccrualCards, Cards, CashCards, CategoryCount, ChartPoint, MetricPoint,
    StatsReport, TOP_CATEGORIES_LIMIT,
};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(crate) fn database(&self) -> &DatabaseConnection {
        &self.database
    }
}

fn payment_status(received_minor: i64, total_minor: i64) -> &'static str {
    if received_minor == total_minor {
        "paid"
    } else {
        "pending"
    }
}

/// `received * profit / total` in minor units, 0 for zero-total sales.
/// Widened to i128 so large sales cannot overflow the product.
fn prorated_profit(received_minor: i64, profit_minor: i64, total_minor: i64) -> i64 {
    if total_minor == 0 {
        return 0;
    }
    let prorated = i128::from(received_minor) * i128::from(profit_minor) / i128::from(total_minor);
    prorated as i64
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profit_prorates_to_amount_received() {
        // Half received, half of the profit recognized.
        assert_eq!(prorated_profit(5_000, 4_000, 10_000), 2_000);
        assert_eq!(prorated_profit(10_000, 4_000, 10_000), 4_000);
        assert_eq!(prorated_profit(0, 4_000, 10_000), 0);
        assert_eq!(prorated_profit(5_000, 4_000, 0), 0);
    }

    #[test]
    fn status_is_paid_only_when_fully_received() {
        assert_eq!(payment_status(10_000, 10_000), "paid");
        assert_eq!(payment_status(9_999, 10_000), "pending");
        assert_eq!(payment_status(0, 10_000), "pending");
    }
}
