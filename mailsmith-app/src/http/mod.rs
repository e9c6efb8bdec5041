mod error;
mod generate;
pub mod metrics;
mod send;

use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use mailsmith_core::dispatch::DispatchPolicy;
use mailsmith_core::generator::ContentGenerator;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
pub struct HttpExtensions {
    pub generator: Arc<ContentGenerator>,
    pub dispatcher: Arc<DispatchPolicy>,
}

#[derive(OpenApi)]
#[openapi(info(
    title = "Mailsmith API",
    description = "Generate an email from a short description, then send it to one or more recipients.",
    version = "0.1.0"
))]
struct ApiDoc;

pub fn router(ext: HttpExtensions) -> Router {
    let app = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(generate::generate_email))
        .routes(routes!(send::send_email))
        .layer(Extension(ext));

    let (app, api) = app.split_for_parts();
    app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(CorsLayer::permissive())
}

/// Serves the API until `shutdown` resolves, then lets in-flight requests finish.
pub async fn start<F>(
    bind: SocketAddr,
    ext: HttpExtensions,
    metrics: Option<PrometheusMetricLayer<'static>>,
    shutdown: F,
) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    // Bind everything now to catch any errors before spinning up the coroutines
    let listener = TcpListener::bind(bind)
        .await
        .expect("failed to bind HTTP listener");

    let mut app = router(ext);
    if let Some(layer) = metrics {
        app = app.layer(layer);
    }

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .expect("HTTP server failed")
    })
}
