use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use repo_metrics::application::{CollectOptions, collect};
use repo_metrics::config::Settings;
use repo_metrics::export::{BASE_NAME, OutputFormat};
use repo_metrics::github::DEFAULT_API_URL;
use repo_metrics::http::{MAX_RETRIES, RETRY_DELAY};
use repo_metrics::logging::{self, LogLevel};
use repo_metrics::runtime::RealRuntime;

/// repo-metrics - GitHub repository metrics collector
///
/// Collects stars, forks, watchers, open issues, traffic and fork details for
/// one repository and writes them as CSV and/or JSON.
///
/// The repository and credentials come from the environment:
///   GITHUB_TOKEN   personal access token (push access is needed for traffic)
///   GITHUB_OWNER   repository owner
///   GITHUB_REPO    repository name
#[derive(Parser, Debug)]
#[command(author, version = env!("REPO_METRICS_VERSION"), about)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv, ignore_case = true)]
    format: OutputFormat,

    /// Logging level
    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Info, ignore_case = true)]
    log_level: LogLevel,

    /// Directory to store output and log files
    #[arg(long = "output-dir", value_name = "PATH", default_value = ".")]
    output_dir: PathBuf,

    /// GitHub API URL
    #[arg(long = "api-url", value_name = "URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Maximum retries for rate-limited or failed requests
    #[arg(long = "max-retries", default_value_t = MAX_RETRIES)]
    max_retries: u32,

    /// Base delay in seconds for exponential backoff on network errors
    #[arg(long = "retry-delay", value_name = "SECONDS", default_value_t = RETRY_DELAY.as_secs())]
    retry_delay: u64,

    /// Timeout in seconds for a single HTTP request
    #[arg(long, value_name = "SECONDS", default_value_t = 30)]
    timeout: u64,
}

impl Cli {
    fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            settings: Settings {
                api_url: self.api_url.clone(),
                max_retries: self.max_retries,
                retry_delay: Duration::from_secs(self.retry_delay),
                timeout: Duration::from_secs(self.timeout),
            },
            format: self.format,
            output_dir: self.output_dir.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let runtime = RealRuntime;

    logging::init(
        &runtime,
        cli.log_level,
        &cli.output_dir,
        BASE_NAME,
        Local::now().naive_local(),
    )?;

    collect(&runtime, &cli.collect_options()).await?;
    Ok(())
}
