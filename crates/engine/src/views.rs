//! Read models over the reporting SQL views.
//!
//! The list endpoints filter and sort against denormalized views instead
//! of the base tables, so computed columns (`debt`, `status`, `item_count`)
//! are filterable like any other field. The views are created by the
//! migration crate; these entities only map them.

/// `customer_stats`: customers plus spend/debt/last-purchase columns.
pub mod customer_stats {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "customer_stats")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub name: String,
        pub phone: Option<String>,
        pub total_spent: i64,
        pub debt: i64,
        pub last_purchase_at: Option<DateTimeUtc>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// `sale_stats`: sales plus customer name, item count and payment status.
pub mod sale_stats {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "sale_stats")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub customer_id: Option<String>,
        pub customer_name: Option<String>,
        pub total_minor: i64,
        pub profit_minor: i64,
        pub item_count: i64,
        pub status: String,
        pub is_installment: bool,
        pub purchased_at: DateTimeUtc,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// `ledger_stats`: pass-through of `ledger_entries`.
pub mod ledger_stats {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "ledger_stats")]
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
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
