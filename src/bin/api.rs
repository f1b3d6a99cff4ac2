use sec_research_agent::{
    api::{start_server, ApiState},
    config::AgentConfig,
    envelope::Manifest,
    pipeline::QueryPipeline,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AgentConfig::from_env()?;

    info!("SEC Research Agent - API Server");
    info!("Port: {}", config.port);
    info!("Speaker URI: {}", config.speaker_uri);
    info!(
        "EDGAR: {} (min interval {} ms)",
        config.sec_base_url,
        config.min_request_interval.as_millis()
    );

    let pipeline = Arc::new(QueryPipeline::from_config(&config)?);
    let state = ApiState::new(pipeline, Manifest::for_agent(&config));

    info!("Pipeline initialized, starting API server...");

    start_server(state, config.port).await?;

    Ok(())
}
