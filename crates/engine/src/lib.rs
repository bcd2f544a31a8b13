pub use categories::Category;
pub use customers::Customer;
pub use error::EngineError;
pub use filter::{Field, FieldKind, FilterSpec, Logical, SingleFilter};
pub use ledger::{
    Flow, LedgerEntry, OPERATIONAL_EXPENSE, OTHER_INCOME, PERSONNEL_EXPENSE,
    RECOGNIZED_CATEGORIES, SALES_REVENUE, TAX_EXPENSE,
};
pub use models::ProductModel;
pub use money::{MoneyCents, from_cents, to_cents};
pub use ops::{
    AccountingMethod, AccrualCards, CUSTOMER_FIELDS, CUSTOMER_SORTABLE, Cards, CashCards,
    CategoryCount, CategoryWithModels, ChartPoint, CustomerOverview, CustomerRef, CustomerUpdate,
    Engine, EngineBuilder, InstallmentNew, InstallmentView, LEDGER_FIELDS, LEDGER_SORTABLE,
    LedgerEntryNew, LedgerEntryUpdate, ListPage, ListQuery, MetricPoint, ModelNew, ModelUpdate,
    PurchaseSummary, SALE_FIELDS, SALE_SORTABLE, SaleItemNew, SaleNew, SaleOverview, StatsReport,
    TOP_CATEGORIES_LIMIT,
};
pub use pagination::{Page, PageMode};
pub use periods::{Period, PeriodBucket};
pub use sale_items::SaleItem;
pub use sales::Sale;
pub use sort::{OrderDirective, SortDir, SortField, SortSpec};
pub use tz::{DateRange, REPORTING_TZ};

mod categories;
mod customers;
mod error;
pub mod filter;
mod ledger;
mod models;
mod money;
mod ops;
pub mod pagination;
pub mod periods;
mod sale_items;
mod sales;
pub mod sort;
pub mod tz;
pub mod views;

type ResultEngine<T> = Result<T, EngineError>;
