use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use datachat_app::DataChat;
use datachat_config::DataChatConfig;
use datachat_infra::GeminiOracle;
use datachat_main::{Cli, UI};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so answers on stdout stay pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = DataChatConfig::from_env().context("Failed to load configuration")?;
    tracing::debug!(model = %config.model, table = %config.table_name, "Configuration loaded");

    let oracle = Arc::new(GeminiOracle::new(&config)?);
    let chat = DataChat::new(oracle, &config);

    let mut ui = UI::new(cli, chat);
    ui.run().await
}
