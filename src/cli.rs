// File: ./src/cli.rs
//! Command-line flags. Anything given here overrides `config.toml`.
use crate::config::Config;
use crate::model::Sequencing;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(
    name = "nextaction",
    version,
    about = "Keeps a next action label on the right tasks of parallel (.) and serial (_) projects",
    long_about = None
)]
pub struct Args {
    /// Todoist API token.
    #[arg(short = 'a', long = "api-key", env = "TODOIST_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the sync API.
    #[arg(long)]
    pub api_url: Option<String>,

    /// The next action label to use.
    #[arg(short, long)]
    pub label: Option<String>,

    /// Label that prevents an item from becoming a next action.
    #[arg(short, long)]
    pub skip_label: Option<String>,

    /// Delay in seconds between syncs.
    #[arg(short, long)]
    pub delay: Option<u64>,

    /// How the Inbox project is processed: parallel, serial or none.
    #[arg(long)]
    pub inbox: Option<Sequencing>,

    #[arg(long)]
    pub parallel_suffix: Option<String>,

    #[arg(long)]
    pub serial_suffix: Option<String>,

    /// Hide next actions due more than this many days ahead (0 disables).
    #[arg(long)]
    pub hide_future: Option<u32>,

    /// Update once and exit.
    #[arg(long)]
    pub onetime: bool,

    /// Do not persist sync state to disk.
    #[arg(long)]
    pub nocache: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,

    /// Use a different directory for config and cache.
    #[arg(short, long)]
    pub root: Option<PathBuf>,
}

impl Args {
    pub fn apply(self, config: &mut Config) {
        if let Some(key) = self.api_key {
            config.api_token = Some(key);
        }
        if let Some(url) = self.api_url {
            config.api_url = url;
        }
        if let Some(label) = self.label {
            config.label = label;
        }
        if let Some(skip) = self.skip_label {
            config.skip_label = skip;
        }
        if let Some(delay) = self.delay {
            config.delay = delay;
        }
        if let Some(inbox) = self.inbox {
            config.inbox = inbox;
        }
        if let Some(suffix) = self.parallel_suffix {
            config.parallel_suffix = suffix;
        }
        if let Some(suffix) = self.serial_suffix {
            config.serial_suffix = suffix;
        }
        if let Some(days) = self.hide_future {
            config.hide_future = days;
        }
        config.onetime |= self.onetime;
        config.nocache |= self.nocache;
        config.debug |= self.debug;
    }
}
