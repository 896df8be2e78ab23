use anyhow::Result;
use clap::Parser;

use rxtract::cli::{Cli, Commands};
use rxtract::config::CliConfig;
use rxtract::store::RecordStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CliConfig::from_env()?.with_overrides(cli.store_path, None);

    dispatch(cli.command, config).await
}

async fn dispatch(command: Commands, config: CliConfig) -> Result<()> {
    let store = RecordStore::new(config.store_path.clone());

    match command {
        Commands::Extract {
            path,
            extractor,
            store: persist,
            compact,
        } => rxtract::cli::extract::run(
            path.as_deref(),
            extractor.unwrap_or(config.extractor),
            persist.then_some(&store),
            compact,
        ),
        Commands::Clean { path } => rxtract::cli::clean::run(path.as_deref()),
        Commands::Batch {
            paths,
            extractor,
            store: persist,
        } => {
            rxtract::cli::batch::run(
                &paths,
                extractor.unwrap_or(config.extractor),
                persist.then_some(&store),
            )
            .await
        }
        Commands::List { limit } => rxtract::cli::list::run(&store, limit),
    }
}
