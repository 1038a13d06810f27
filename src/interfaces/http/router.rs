//! API Router with Swagger UI

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::UserRepositoryInterface;
use crate::interfaces::http::error::{ErrorBody, MessageBody};
use crate::interfaces::http::modules::health::{self, HealthState};
use crate::interfaces::http::modules::metrics::{
    http_metrics_middleware, prometheus_metrics, MetricsState,
};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::users::{
    self, UserDto, UserHandlerState, UserRequest, USERS_ENDPOINT, USER_ENDPOINT,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users Service API",
        description = "CRUD over the user resource"
    ),
    paths(
        health::health_check,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
    ),
    components(schemas(
        UserDto,
        UserRequest,
        ErrorBody,
        MessageBody,
        health::HealthResponse,
    )),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Users", description = "User management")
    )
)]
pub struct ApiDoc;

/// Create the API router.
///
/// The correlation middleware wraps the whole routed service, so every
/// request gets its id before route dispatch or any other processing.
pub fn create_api_router(
    users: Arc<dyn UserRepositoryInterface>,
    prometheus_handle: PrometheusHandle,
) -> Router {
    let user_routes = Router::new()
        .route(USERS_ENDPOINT, get(users::list_users).post(users::create_user))
        .route(
            USER_ENDPOINT,
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .with_state(UserHandlerState::new(users));

    let metrics_routes = Router::new()
        .route("/metrics", get(prometheus_metrics))
        .with_state(MetricsState {
            handle: prometheus_handle,
        });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(HealthState::new());

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Spans only: handlers own the single per-request log entry
    let trace = TraceLayer::new_for_http()
        .on_request(())
        .on_response(())
        .on_failure(());

    let routes = Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .merge(user_routes)
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(cors)
        .layer(trace);

    // Correlation wraps route matching, not individual routes
    Router::new()
        .fallback_service(routes)
        .layer(middleware::from_fn(request_id_middleware))
}
