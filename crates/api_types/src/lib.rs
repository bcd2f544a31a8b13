use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shared list-endpoint types: filter body, query-string knobs and the
/// page envelope.
pub mod list {
    use super::*;

    /// Top-level connective joining the filters of one request.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum Logical {
        And,
        Or,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct SingleFilter {
        pub field: String,
        pub operator: String,
        pub value: Option<String>,
    }

    /// Request body of the `/list` endpoints: a flat filter list under one
    /// connective (`AND` when absent).
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct FilterBody {
        pub logical: Option<Logical>,
        pub filters: Option<Vec<SingleFilter>>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum SortDir {
        Asc,
        Desc,
    }

    /// Query-string parameters of the `/list` endpoints.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListQuery {
        pub page: Option<i64>,
        pub search: Option<String>,
        pub sort_by: Option<String>,
        pub sort_dir: Option<SortDir>,
        /// `"true"` switches to the narrow autocomplete page size.
        pub autocomplete: Option<String>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListResponse<T> {
        pub row_count: u64,
        pub page_count: u64,
        pub rows: Vec<T>,
    }
}

pub mod customer {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CustomerNew {
        pub name: String,
        pub phone: Option<String>,
        pub note: Option<String>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct CustomerUpdate {
        pub name: Option<String>,
        pub phone: Option<String>,
        pub note: Option<String>,
    }

    /// Minimal customer reference (create responses, autocomplete,
    /// embedded in sale rows).
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CustomerRef {
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CustomerOverview {
        pub name: String,
        pub phone: Option<String>,
        /// RFC3339 timestamp in the reporting timezone offset.
        pub last_purchase_at: Option<DateTime<FixedOffset>>,
    }

    /// One row of the customers table.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CustomerRow {
        pub id: Uuid,
        pub name: String,
        pub phone: Option<String>,
        pub total_spent: i64,
        pub debt: i64,
        pub last_purchase_at: Option<DateTime<FixedOffset>>,
        pub created_at: DateTime<FixedOffset>,
    }

    /// One sale of a customer with its payment progress.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PurchaseRow {
        pub id: Uuid,
        pub item_count: i64,
        pub installment_count: i64,
        pub status: String,
        pub purchased_at: DateTime<FixedOffset>,
        pub total: i64,
        pub total_received: i64,
        pub profit: i64,
        pub profit_received: i64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct DeleteMany {
        pub ids: Vec<Uuid>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DeleteQuery {
        /// Also remove the customer's sales instead of unassigning them.
        pub delete_sales: Option<bool>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct AutocompleteQuery {
        pub search: Option<String>,
    }
}

pub mod sale {
    use super::*;

    /// One item of a new sale. Prices are decimal amounts; the server
    /// converts them to minor units.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SaleItemNew {
        pub model_id: Uuid,
        pub color: String,
        pub print: String,
        pub size: String,
        pub cost_price: f64,
        pub sale_price: f64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct InstallmentNew {
        pub value: f64,
        pub paid_at: NaiveDate,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SaleNew {
        pub customer_id: Option<Uuid>,
        pub purchased_at: NaiveDate,
        pub items: Vec<SaleItemNew>,
        pub installment: Option<InstallmentNew>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct SaleCreated {
        pub id: Uuid,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SaleOverview {
        pub status: String,
        pub customer: Option<super::customer::CustomerRef>,
        pub purchased_at: DateTime<FixedOffset>,
        pub total: i64,
        pub total_received: i64,
        pub profit: i64,
        pub profit_received: i64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SaleItemView {
        pub id: Uuid,
        pub category_name: String,
        pub model_name: String,
        pub size: String,
        pub color: String,
        pub print: String,
        pub cost_price: i64,
        pub sale_price: i64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct InstallmentView {
        pub id: Uuid,
        pub paid_at: DateTime<FixedOffset>,
        pub value: i64,
    }

    /// One row of the sales table.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SaleRow {
        pub id: Uuid,
        pub customer: Option<super::customer::CustomerRef>,
        pub total: i64,
        pub profit: i64,
        pub item_count: i64,
        pub status: String,
        pub is_installment: bool,
        pub purchased_at: DateTime<FixedOffset>,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct DeleteMany {
        pub ids: Vec<Uuid>,
    }
}

pub mod ledger {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Flow {
        Inflow,
        Outflow,
    }

    /// A new manual cash movement. `value` is a decimal amount; the
    /// server converts it to minor units.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct LedgerEntryNew {
        pub flow: Flow,
        pub date: NaiveDate,
        pub description: String,
        pub category: String,
        pub value: f64,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct LedgerEntryUpdate {
        pub flow: Option<Flow>,
        pub date: Option<NaiveDate>,
        pub description: Option<String>,
        pub category: Option<String>,
        pub value: Option<f64>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LedgerEntryView {
        pub id: Uuid,
        pub sale_id: Option<Uuid>,
        pub flow: Flow,
        pub date: DateTime<FixedOffset>,
        pub description: String,
        pub category: String,
        pub value: i64,
        pub created_at: DateTime<FixedOffset>,
    }

    /// One row of the cash-flow table.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LedgerRow {
        pub id: Uuid,
        pub sale_id: Option<Uuid>,
        pub flow: String,
        pub date: DateTime<FixedOffset>,
        pub description: String,
        pub category: String,
        pub value: i64,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct DeleteMany {
        pub ids: Vec<Uuid>,
    }
}

pub mod catalog {
    use super::*;

    /// A new product model. Prices are decimal amounts; the server
    /// converts them to minor units.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ModelNew {
        pub name: String,
        pub cost_price: Option<f64>,
        pub sale_price: Option<f64>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ModelUpdate {
        pub name: Option<String>,
        pub cost_price: Option<f64>,
        pub sale_price: Option<f64>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ModelView {
        pub id: Uuid,
        pub name: String,
        pub cost_price: Option<i64>,
        pub sale_price: Option<i64>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub models: Option<Vec<ModelNew>>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub models: Vec<ModelView>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CatalogQuery {
        pub search: Option<String>,
        /// `"true"` embeds each category's models in the response.
        pub fetch_models: Option<String>,
    }
}

pub mod stats {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Period {
        Today,
        Week,
        Month,
        Year,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Method {
        CashBasis,
        AccrualBasis,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StatsQuery {
        pub period: Period,
        pub method: Method,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
    }

    /// One chart point. Column meaning depends on the accounting method:
    /// inflow/outflow for cash basis, revenue/costs for accrual basis.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ChartPoint {
        pub label: String,
        pub col_1: i64,
        pub col_2: i64,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccrualCards {
        pub sale_count: i64,
        pub invoicing: i64,
        pub avg_ticket: i64,
        pub gross_profit: i64,
        pub net_profit: i64,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CashCards {
        pub receipt: i64,
        pub period_result: i64,
        pub inflow: i64,
        pub outflow: i64,
        pub balance: i64,
    }

    /// Card set of the stats response; the shape follows the requested
    /// accounting method.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum Cards {
        Accrual(AccrualCards),
        Cash(CashCards),
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryCount {
        pub category: String,
        pub count: i64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StatsResponse {
        pub cards: Cards,
        pub top_categories: Vec<CategoryCount>,
        pub metrics_chart: Vec<ChartPoint>,
    }
}
