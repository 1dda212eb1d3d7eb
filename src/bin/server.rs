use axum::routing::get;
use axum::Router;
use tracing_subscriber::EnvFilter;

use git_diffmap::api;
use git_diffmap::config::ServerConfig;
use git_diffmap::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!("Working directory: {}", config.work_dir.display());
    tracing::info!("Analyzer binary: {}", config.analyzer_bin);

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config);

    // The catch-all serves generated artifacts (treemap JSON, container
    // files) out of the working directory; it needs state, so it is
    // registered before with_state.
    let app = Router::new()
        .route("/", get(api::index))
        .route("/generation", get(api::generation_page))
        .route("/full_backend_generation", get(api::full_backend_generation))
        .fallback(get(api::serve_workdir_file))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on http://{bind_addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
