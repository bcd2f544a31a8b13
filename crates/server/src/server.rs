use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{catalog, customers, ledger, sales, statistics, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user = if let Some(user) = user {
        user
    } else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/customers",
            post(customers::create).delete(customers::delete_many),
        )
        .route("/customers/list", post(customers::list))
        .route("/customers/autocomplete", get(customers::autocomplete))
        .route(
            "/customers/{id}",
            axum::routing::patch(customers::update).delete(customers::delete),
        )
        .route("/customers/{id}/overview", get(customers::overview))
        .route("/customers/{id}/purchases", get(customers::purchases))
        .route("/sales", post(sales::create).delete(sales::delete_many))
        .route("/sales/list", post(sales::list))
        .route("/sales/{id}", axum::routing::delete(sales::delete))
        .route("/sales/{id}/overview", get(sales::overview))
        .route("/sales/{id}/items", get(sales::items))
        .route(
            "/sales/{id}/installments",
            get(sales::installments).post(sales::create_installment),
        )
        .route(
            "/sales/{sale_id}/installments/{id}",
            axum::routing::delete(sales::delete_installment),
        )
        .route("/ledger", post(ledger::create).delete(ledger::delete_many))
        .route("/ledger/list", post(ledger::list))
        .route(
            "/ledger/{id}",
            axum::routing::patch(ledger::update).delete(ledger::delete),
        )
        .route("/categories", get(catalog::list).post(catalog::create))
        .route("/categories/autocomplete", get(catalog::autocomplete))
        .route(
            "/categories/{id}",
            axum::routing::patch(catalog::update_category).delete(catalog::delete_category),
        )
        .route("/categories/{id}/models", post(catalog::create_model))
        .route(
            "/categories/{id}/models/{model_id}",
            axum::routing::patch(catalog::update_model).delete(catalog::delete_model),
        )
        .route("/stats", get(statistics::get_stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Database, Statement};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let backend = db.get_database_backend();
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec!["alice".into(), "password".into()],
        ))
        .await
        .unwrap();

        let state = ServerState {
            engine: Arc::new(Engine::builder().database(db.clone()).build()),
            db,
        };
        router(state)
    }

    // alice:password
    const AUTH: &str = "Basic YWxpY2U6cGFzc3dvcmQ=";

    fn request(method: &str, uri: &str, body: Option<&str>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, AUTH)
            .header(header::CONTENT_TYPE, "application/json");
        match body {
            Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn requests_without_credentials_are_rejected() {
        let app = test_router().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/categories")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn wrong_credentials_are_unauthorized() {
        let app = test_router().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/categories")
                    // alice:wrong
                    .header(header::AUTHORIZATION, "Basic YWxpY2U6d3Jvbmc=")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn customer_create_and_list_round_trip() {
        let app = test_router().await;

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/customers",
                Some(r#"{"name":"Ana Souza","phone":"11 99999-0001"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = json_body(response).await;
        assert_eq!(created["name"], "Ana Souza");

        let response = app
            .oneshot(request("POST", "/customers/list?page=1", Some("{}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = json_body(response).await;
        assert_eq!(page["rowCount"], 1);
        assert_eq!(page["pageCount"], 1);
        assert_eq!(page["rows"][0]["name"], "Ana Souza");
        assert_eq!(page["rows"][0]["debt"], 0);
    }

    #[tokio::test]
    async fn invalid_filter_fields_return_bad_request() {
        let app = test_router().await;

        let response = app
            .oneshot(request(
                "POST",
                "/customers/list",
                Some(r#"{"filters":[{"field":"bogus","operator":"equals","value":"x"}]}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("bogus"));
    }

    #[tokio::test]
    async fn stats_endpoint_reports_an_empty_day() {
        let app = test_router().await;

        let response = app
            .oneshot(request(
                "GET",
                "/stats?period=today&method=cash_basis&startDate=2024-03-12&endDate=2024-03-12",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["metricsChart"], serde_json::json!([]));
        assert_eq!(body["cards"]["inflow"], 0);
        assert_eq!(body["cards"]["balance"], 0);
        assert_eq!(body["topCategories"], serde_json::json!([]));
    }
}
