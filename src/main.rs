use tracing_subscriber::EnvFilter;

mod apis;
mod config;
mod diagnostics;
mod enrich;
mod link;
mod publication;
mod render;

use config::Config;
use enrich::Enricher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = Config::from_env().with_output_arg(std::env::args().nth(1));
    tracing::info!(
        "Harvesting publications for project {} from {}",
        config.project_id,
        config.base_url
    );

    let enricher = Enricher::new(config.build_source()?, config.workers);
    let status = enricher.run(&config.project_id, &config.output_target()).await;

    std::process::exit(status.exit_code());
}
