// src/bin/api_server.rs

use anyhow::Context;
use battery_passport_gateway::transport;
use battery_passport_gateway::{init_tracing, AppContext, Settings};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing("info,tower_http=info");

    let settings = Settings::from_env().context("invalid configuration")?;
    let bind_addr = settings.bind_addr;

    // --- Service Initialization ---
    info!(orgs = settings.orgs.len(), wallet = %settings.wallet_dir.display(), "loading connection profiles");
    let context = AppContext::build(settings).context("failed to initialize gateway")?;

    // --- Enrollment (blocks readiness) ---
    if let Err(e) = context.enroller.enroll_all().await {
        error!(error = %e, "enrollment failed");
        return Err(e).context("enrollment failed; refusing to serve");
    }

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(context.app_state())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!(%bind_addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    info!("graceful shutdown complete");
    Ok(())
}
