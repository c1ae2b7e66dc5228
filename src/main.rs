use anyhow::Result;
use jobscout::{start_web_server, ConfigManager};
use std::fs::OpenOptions;

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging first
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open("job_scraper.log")
        .expect("Failed to open log file");

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file).with_ansi(false))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jobscout=info,rocket::server=off")),
        )
        .init();

    let config = ConfigManager::load()?;

    info!("Starting job aggregation API server");
    info!("Groq model: {}", config.groq.model);
    info!(
        "Batch size: {}, LinkedIn limit: {}, Indeed pages: {}, Glassdoor limit: {}",
        config.scrape.batch_size,
        config.scrape.linkedin_limit,
        config.scrape.indeed_pages,
        config.scrape.glassdoor_limit
    );

    start_web_server(config).await
}
