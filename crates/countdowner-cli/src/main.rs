mod pipeline;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use countdowner_mailer::{BodyFormat, MailgunClient};
use tracing_subscriber::EnvFilter;

use crate::pipeline::{apply_mailgun_overrides, check_watchlist, run_pipeline, RunOptions};

#[derive(Debug, Parser)]
#[command(name = "countdownit")]
#[command(about = "Track Countdown prices for a watchlist and email the sales")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect prices for a watchlist, write them to CSV, and email any sales
    Run {
        /// Path to the watchlist YAML file
        watchlist_path: PathBuf,

        /// Directory the price CSV is written to (created if missing)
        out_dir: PathBuf,

        /// Mailgun API key; overrides `COUNTDOWNER_MAILGUN_API_KEY`
        #[arg(long)]
        key: Option<String>,

        /// Mailgun sending domain; overrides `COUNTDOWNER_MAILGUN_DOMAIN`
        #[arg(long)]
        domain: Option<String>,

        /// Send the email as plain text instead of HTML
        #[arg(long)]
        as_text: bool,
    },
    /// Validate a watchlist file without fetching anything
    Check {
        /// Path to the watchlist YAML file
        watchlist_path: PathBuf,
    },
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            watchlist_path,
            out_dir,
            key,
            domain,
            as_text,
        } => {
            let mut config = countdowner_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            apply_mailgun_overrides(&mut config, key, domain);

            let mailer = match config.mailgun_credentials() {
                Some((domain, api_key)) => Some(MailgunClient::new(
                    domain,
                    api_key,
                    config.request_timeout_secs,
                )?),
                None => {
                    tracing::info!("mailgun credentials not configured; email disabled");
                    None
                }
            };

            let options = RunOptions {
                watchlist_path,
                out_dir,
                format: if as_text {
                    BodyFormat::Text
                } else {
                    BodyFormat::Html
                },
            };
            let summary = run_pipeline(&config, &options, mailer.as_ref()).await?;
            println!(
                "wrote {} products ({} on sale) to {}",
                summary.products,
                summary.sales,
                summary.csv_path.display()
            );
        }
        Commands::Check { watchlist_path } => {
            init_tracing(countdowner_core::DEFAULT_LOG_LEVEL)?;
            let watchlist = check_watchlist(&watchlist_path)?;
            println!(
                "{}: {} products, notifying {}",
                watchlist.name,
                watchlist.products.len(),
                watchlist.email_address
            );
        }
    }

    Ok(())
}
