use retrowave::orchestrator::Orchestrator;
use retrowave::providers::openai::OpenAiProvider;
use retrowave::tools::ToolRegistry;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

mod configuration;
mod error;
mod routes;
mod sessions;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let settings = configuration::Settings::new()?;
    let addr = settings.server.socket_addr()?;

    let provider = OpenAiProvider::new(settings.provider.into_config())?;
    let model = provider.model().to_string();
    let registry = ToolRegistry::with_defaults(settings.tools.into_config())?;
    let orchestrator = Orchestrator::new(Box::new(provider), registry)?;

    // Create app state
    let state = state::AppState::new(orchestrator, model.clone());

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(model = %model, "listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
