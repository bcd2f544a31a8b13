use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, FixedOffset, Utc};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod catalog;
mod customers;
mod ledger;
mod sales;
mod server;
mod statistics;
mod user;

pub mod types {
    pub mod list {
        pub use api_types::list::{FilterBody, ListQuery, ListResponse, Logical, SortDir};
    }

    pub mod customer {
        pub use api_types::customer::{
            CustomerNew, CustomerOverview, CustomerRef, CustomerRow, CustomerUpdate, PurchaseRow,
        };
    }

    pub mod sale {
        pub use api_types::sale::{
            InstallmentNew, InstallmentView, SaleCreated, SaleItemNew, SaleItemView, SaleNew,
            SaleOverview, SaleRow,
        };
    }

    pub mod ledger {
        pub use api_types::ledger::{Flow, LedgerEntryNew, LedgerEntryUpdate, LedgerEntryView, LedgerRow};
    }

    pub mod catalog {
        pub use api_types::catalog::{CategoryNew, CategoryUpdate, CategoryView, ModelNew, ModelView};
    }

    pub mod stats {
        pub use api_types::stats::{Cards, ChartPoint, StatsQuery, StatsResponse};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

//TODO: Find a better solution
#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) | EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidField(_)
        | EngineError::InvalidOperator(_)
        | EngineError::InvalidSortField(_)
        | EngineError::InvalidDate(_)
        | EngineError::InvalidValue(_)
        | EngineError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Internal(detail) => {
            tracing::error!("internal error: {detail}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Renders a stored UTC instant in the reporting timezone offset.
pub(crate) fn to_local(at: DateTime<Utc>) -> DateTime<FixedOffset> {
    at.with_timezone(&engine::REPORTING_TZ).fixed_offset()
}

/// Maps the wire-level list request (query string + filter body) onto the
/// engine's list query.
pub(crate) fn to_list_query(
    query: api_types::list::ListQuery,
    body: api_types::list::FilterBody,
) -> engine::ListQuery {
    engine::ListQuery {
        filter: engine::FilterSpec {
            logical: match body.logical {
                Some(api_types::list::Logical::Or) => engine::Logical::Or,
                _ => engine::Logical::And,
            },
            filters: body
                .filters
                .unwrap_or_default()
                .into_iter()
                .map(|filter| engine::SingleFilter {
                    field: filter.field,
                    operator: filter.operator,
                    value: filter.value,
                })
                .collect(),
        },
        sort: engine::SortSpec {
            sort_by: query.sort_by,
            sort_dir: query.sort_dir.map(|dir| match dir {
                api_types::list::SortDir::Asc => engine::SortDir::Asc,
                api_types::list::SortDir::Desc => engine::SortDir::Desc,
            }),
        },
        page: query.page,
        mode: if query.autocomplete.as_deref() == Some("true") {
            engine::PageMode::Narrow
        } else {
            engine::PageMode::Normal
        },
        search: query.search,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn filter_errors_map_to_400() {
        let res = ServerError::from(EngineError::InvalidField("debt!".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res =
            ServerError::from(EngineError::InvalidOperator("contains".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res =
            ServerError::from(EngineError::InvalidSortField("secret".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_errors_map_to_500() {
        let res = ServerError::from(EngineError::Database(sea_orm::DbErr::Custom(
            "boom".to_string(),
        )))
        .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn autocomplete_flag_selects_narrow_mode() {
        let query = api_types::list::ListQuery {
            autocomplete: Some("true".to_string()),
            ..Default::default()
        };
        let compiled = to_list_query(query, api_types::list::FilterBody::default());
        assert_eq!(compiled.mode, engine::PageMode::Narrow);

        let compiled = to_list_query(
            api_types::list::ListQuery::default(),
            api_types::list::FilterBody::default(),
        );
        assert_eq!(compiled.mode, engine::PageMode::Normal);
    }
}
