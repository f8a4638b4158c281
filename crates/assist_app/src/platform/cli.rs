use std::path::PathBuf;

use assist_core::ControlKind;
use clap::{Parser, ValueEnum};

use super::config::DEFAULT_CONFIG_FILE;

/// Runs the compose assistant against a saved page snapshot.
#[derive(Debug, Parser)]
#[command(name = "assist_app", version)]
pub(crate) struct Cli {
    /// Saved HTML page to load.
    pub page: PathBuf,

    /// RON configuration file. A missing file means defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Click one of the injected controls once they are attached.
    #[arg(long, value_enum)]
    pub click: Option<ClickTarget>,

    /// Print the whole document instead of the compose text.
    #[arg(long)]
    pub dump: bool,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ClickTarget {
    Reply,
    Summarize,
}

impl From<ClickTarget> for ControlKind {
    fn from(target: ClickTarget) -> Self {
        match target {
            ClickTarget::Reply => ControlKind::Reply,
            ClickTarget::Summarize => ControlKind::Summarize,
        }
    }
}
