use anyhow::{Context, Result};
use clap::Parser;
use nextaction::cli::Args;
use nextaction::client::TodoistClient;
use nextaction::config::Config;
use nextaction::context::{AppContext, SharedContext, StandardContext};
use nextaction::controller::SyncController;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::sync::Arc;

fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log_config = ConfigBuilder::new()
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("rustls")
        .build();
    // A logger may already be installed when embedded; keep going either way.
    let _ = TermLogger::init(level, log_config, TerminalMode::Stderr, ColorChoice::Auto);
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let ctx: SharedContext = Arc::new(StandardContext::new(args.root.clone()));

    let mut config = Config::load_or_default(ctx.as_ref())?;
    args.apply(&mut config);
    init_logging(config.debug);

    if let Ok(path) = ctx.get_config_file_path() {
        log::debug!("Using config file {}", path.display());
    }
    config.validate()?;

    log::debug!("Connecting to the Todoist API");
    let cache_ctx = if config.nocache {
        log::debug!("Disabling local caching");
        None
    } else {
        Some(ctx.clone())
    };
    let client = TodoistClient::new(&config.api_url, config.token()?, cache_ctx)
        .context("Failed to set up the API client")?;

    SyncController::new(client, config).run().await
}
