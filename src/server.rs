//! Router assembly and server startup.

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::config::RelayConfig;
use crate::ws::handler::ws_handler;

/// Builds the full application: REST monitoring, `/ws` signaling socket,
/// tracing and CORS layers.
pub fn build_app(state: AppState, config: &RelayConfig) -> Router {
    let router = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::openapi::ApiDoc::openapi()),
        )
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.frontend_url))
        .with_state(state)
}

/// Serves `app` on an already-bound listener until the task is dropped.
///
/// # Errors
///
/// Returns an error if the underlying accept loop fails.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app).await
}

/// CORS policy allowing the configured browser origin.
fn cors_layer(frontend_url: &str) -> CorsLayer {
    if frontend_url == "*" {
        return CorsLayer::permissive();
    }
    match HeaderValue::from_str(frontend_url) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST]),
        Err(err) => {
            tracing::warn!(frontend_url, error = %err, "invalid FRONTEND_URL, cross-origin requests disabled");
            CorsLayer::new()
        }
    }
}
