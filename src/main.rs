use storybook::{AppState, config::AppConfig, router};
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // The catalog is read once and shared read-only by every request
    let catalog = config.load_catalog()?;
    tracing::info!(
        templates = catalog.template_count(),
        source = %config
            .catalog_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "embedded".to_string()),
        "Loaded story catalog"
    );

    let listener = TcpListener::bind(config.bind_address()).await?;
    let app = router(AppState::new(catalog, config));

    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
