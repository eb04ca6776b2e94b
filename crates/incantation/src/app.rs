use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::get,
    Router,
};
use incantation_auth::auth_routes;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use url::Url;

use crate::{handlers::health::livez, state::AppState};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.auth.config.app_url);

    Router::new()
        .route("/livez", get(livez))
        .merge(auth_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}

/// CORS for the application origin, with cookies.
///
/// Other origins get no `Access-Control-Allow-Origin` header at all.
fn cors_layer(app_url: &Url) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(&app_url.origin().ascii_serialization()) {
        Ok(origin) => cors.allow_origin(AllowOrigin::list([origin])),
        Err(err) => {
            tracing::warn!(error = %err, "APP_URL has no usable origin, cross-origin requests disabled");
            cors
        }
    }
}
