use std::path::PathBuf;

use clap::Parser;
use pagetext_core::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "pagetext")]
#[command(about = "Extract the main text of a web page or document")]
#[command(version)]
pub struct Cli {
    /// Page to extract (https only)
    pub url: Option<String>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// First-stage readiness timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub onload_timeout_ms: Option<u64>,

    /// Total readiness timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub total_timeout_ms: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(ms) = self.onload_timeout_ms {
            config.onload_timeout_ms = ms;
        }
        if let Some(ms) = self.total_timeout_ms {
            config.total_timeout_ms = ms;
        }
        if self.headful {
            config.headless = false;
        }
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
