//! Route table and the layers wrapped around it.

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::health_handler::{health, root};
use super::handlers::{
    auth_routes, cart_routes, coupon_admin_routes, coupon_routes, order_routes,
    product_admin_routes, product_routes, user_routes,
};
use super::middleware::{auth_middleware, rate_limit_auth_middleware, rate_limit_middleware};
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::Config;

/// `/api/*` is rate limited; `/`, `/health` and the docs are not.
pub fn create_router(state: AppState, config: &Config) -> Router {
    let authenticated = || middleware::from_fn_with_state(state.clone(), auth_middleware);

    // Public account routes get the stricter limit, the rest needs a token
    let users = Router::new()
        .merge(auth_routes().route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_auth_middleware,
        )))
        .merge(user_routes().route_layer(authenticated()));

    let products = Router::new()
        .merge(product_routes())
        .merge(product_admin_routes().route_layer(authenticated()));

    let coupons = Router::new()
        .merge(coupon_routes())
        .merge(coupon_admin_routes().route_layer(authenticated()));

    let api = Router::new()
        .nest("/users", users)
        .nest("/products", products)
        .nest("/cart", cart_routes().route_layer(authenticated()))
        .nest("/orders", order_routes().route_layer(authenticated()))
        .nest("/coupons", coupons)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config.frontend_url.as_deref())),
        )
        .with_state(state)
}

/// Restrict browsers to the storefront origin when one is configured.
fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    match frontend_url.map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Invalid FRONTEND_URL, allowing any origin");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}
