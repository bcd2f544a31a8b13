//! Shared plumbing for the table list operations.

use sea_orm::{
    Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
    sea_query::{Alias, Expr, SimpleExpr},
};

use crate::{
    ResultEngine,
    filter::FilterSpec,
    pagination::{Page, PageMode},
    sort::{OrderDirective, SortSpec},
};

/// One table-list request: filter body plus the query-string knobs.
#[derive(Clone, Debug, Default)]
pub struct ListQuery {
    pub filter: FilterSpec,
    pub sort: SortSpec,
    pub page: Option<i64>,
    pub mode: PageMode,
    pub search: Option<String>,
}

/// One page of a table list, with the total row/page counts for the
/// paginator widget.
#[derive(Clone, Debug)]
pub struct ListPage<T> {
    pub row_count: u64,
    pub page_count: u64,
    pub rows: Vec<T>,
}

/// Runs the count + page queries for a compiled list request.
///
/// `default_order` is used when the request carries no explicit sort;
/// lists default to newest-first.
pub(crate) async fn fetch_page<E>(
    db: &DatabaseConnection,
    condition: Condition,
    order: Option<OrderDirective>,
    default_order: &'static str,
    page: Page,
) -> ResultEngine<ListPage<E::Model>>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let row_count = E::find().filter(condition.clone()).count(db).await?;
    let page_count = row_count.div_ceil(page.limit);

    let order = order.unwrap_or(OrderDirective {
        column: default_order,
        direction: Order::Desc,
    });
    let order_expr: SimpleExpr = Expr::col(Alias::new(order.column)).into();

    let rows = E::find()
        .filter(condition)
        .order_by(order_expr, order.direction)
        .offset(page.offset)
        .limit(page.limit)
        .all(db)
        .await?;

    Ok(ListPage {
        row_count,
        page_count,
        rows,
    })
}
