use sec_research_agent::{config::AgentConfig, models::ResearchQuery, pipeline::QueryPipeline};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Answer one research query from the command line and print the report.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let text = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if text.trim().is_empty() {
        eprintln!("usage: research <query>");
        eprintln!("example: research \"Show me Apple's recent SEC filings\"");
        std::process::exit(2);
    }

    let config = AgentConfig::from_env()?;
    let pipeline = QueryPipeline::from_config(&config)?;

    let query = ResearchQuery::new(text);
    info!(query = %query.raw_text, "Running research query");

    println!("{}", pipeline.answer(&query).await);

    Ok(())
}
