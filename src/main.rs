use std::{net::TcpListener, sync::Arc};

use actix_web::web;
use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use jobs_dash::{
    configuration::get_configuration,
    services::{BoardScraper, SearchService, SessionStore},
    startup::run,
};

#[derive(Parser)]
#[command(about = "serves the job search dashboard")]
struct Cli {
    /// Overrides application.host from configuration
    #[arg(long)]
    host: Option<String>,
    /// Overrides application.port from configuration
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let configuration = get_configuration().context("Failed to read configuration.")?;

    let scraper = BoardScraper::new(&configuration.scraper).context("Failed to build scraper.")?;
    let search_service = SearchService::new(
        Arc::new(scraper),
        &configuration.cache,
        configuration.scraper.default_results_wanted,
    );
    let session_store = SessionStore::new(&configuration.session);

    let address = format!(
        "{}:{}",
        cli.host.unwrap_or(configuration.application.host),
        cli.port.unwrap_or(configuration.application.port)
    );
    let listener = TcpListener::bind(&address).with_context(|| format!("Failed to bind {}", address))?;
    log::info!("Dashboard listening on http://{}", address);

    run(
        listener,
        web::Data::new(search_service),
        web::Data::new(session_store),
    )?
    .await?;

    Ok(())
}
