//! Postgen - Collection editor entry point
//!
//! Parses the command line, loads the configuration and runs one
//! subcommand against the collection service or a local directory.

mod cli;
mod commands;

use clap::Parser;
use postgen_application::EditorSession;
use postgen_infrastructure::{
    FileCollectionStore, OfflineGenerationService, PostgenConfig, ReqwestCollectionStore,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = PostgenConfig::load(cli.config.as_deref()).await?;

    match cli.file_store.or(config.collections_dir.clone()) {
        Some(root) => {
            tracing::debug!(root = %root.display(), "using local collections");
            let session =
                EditorSession::new(FileCollectionStore::new(root), OfflineGenerationService::new());
            commands::run(cli.command, session).await
        }
        None => {
            tracing::debug!(base_url = %config.base_url, "using collection service");
            let store = ReqwestCollectionStore::new(&config)?;
            let session = EditorSession::new(store.clone(), store);
            commands::run(cli.command, session).await
        }
    }
}
