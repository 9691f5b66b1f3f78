//! pagetext entry point.
//!
//! Extracts the main text of one URL per invocation and writes it to stdout.
//! Logging goes to stderr so the output stays exactly the extracted text.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use pagetext_client::{
    ChromeNavigator, ExtractionRequest, FetchClient, FetchConfig, LectitoOracle, ReadabilityOracle, RenderOptions,
    StrategyTable, run_extraction,
};
use pagetext_core::{AppConfig, Error, ExitStatus};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(ExitStatus::InvalidInput.code())
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_logging(&cli);

    match run(&cli).await {
        Ok(text) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
                tracing::error!("failed to write output: {e}");
                return ExitCode::from(ExitStatus::Failure.code());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            let status = ExitStatus::from(&err);
            if err.is_expected() {
                tracing::info!(code = status.code(), "{err}");
            } else {
                eprintln!("pagetext: {err}");
            }
            ExitCode::from(status.code())
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: &Cli) -> Result<String, Error> {
    // Input is checked before anything else is set up.
    let url = cli.url.as_deref().ok_or_else(|| Error::InvalidInput("missing URL argument".into()))?;
    let request = ExtractionRequest::parse(url)?;

    // Validated once, after flag overrides.
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    let oracle: Arc<dyn ReadabilityOracle> = Arc::new(LectitoOracle::default());
    let fetcher = Arc::new(FetchClient::new(FetchConfig::from_config(&config))?);
    let table = StrategyTable::from_config(&config, Arc::clone(&oracle), fetcher)?;

    let navigator = ChromeNavigator::launch(RenderOptions::from_config(&config)).await?;
    let result = run_extraction(&navigator, &table, oracle.as_ref(), &config, &request).await?;
    Ok(result.text)
}
