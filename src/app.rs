use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment, SecurityConfig};
use crate::database::SharedStore;
use crate::graphql::{build_schema, AppSchema};
use crate::handlers;
use crate::middleware::{identity_middleware, IdentityExtractor};

/// Shared, read-only state built once at startup
#[derive(Clone)]
pub struct AppState {
    pub schema: AppSchema,
    pub store: SharedStore,
    pub identity: Arc<IdentityExtractor>,
    pub playground: bool,
}

impl AppState {
    pub fn new(store: SharedStore, config: &AppConfig) -> Self {
        Self {
            schema: build_schema(store.clone(), &config.graphql),
            store,
            identity: Arc::new(IdentityExtractor::from_config(&config.security)),
            playground: config.graphql.enable_playground,
        }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // GraphQL, principal resolved per request
        .merge(graphql_routes(state.identity.clone()))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security, config.environment));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

fn graphql_routes(identity: Arc<IdentityExtractor>) -> Router<AppState> {
    Router::new()
        .route(
            "/query",
            get(handlers::graphql_handler).post(handlers::graphql_handler),
        )
        .route_layer(middleware::from_fn_with_state(identity, identity_middleware))
}

fn cors_layer(security: &SecurityConfig, environment: Environment) -> CorsLayer {
    if environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::database::MemoryStore;

    fn router(config: &AppConfig) -> Router {
        app(AppState::new(Arc::new(MemoryStore::new()), config), config)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = router(&AppConfig::development())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn root_describes_service_without_playground() {
        let response = router(&AppConfig::production())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["endpoints"]["graphql"], "/query (GET, POST)");
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let response = router(&AppConfig::development())
            .oneshot(Request::get("/api/data/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn role_header_reaches_the_guard() {
        let request = Request::post("/query")
            .header("content-type", "application/json")
            .header("X-User-Role", "EMPLOYEE")
            .body(Body::from(
                json!({ "query": "{ me { role } employeeByEmail(email: \"a@b.c\") { id } }" }).to_string(),
            ))
            .unwrap();

        let response = router(&AppConfig::development()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["me"]["role"], "EMPLOYEE");
        assert_eq!(body["data"]["employeeByEmail"], Value::Null);
        assert_eq!(body["errors"][0]["extensions"]["code"], "FORBIDDEN");
    }
}
