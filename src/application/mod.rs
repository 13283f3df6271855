//! Collect action - orchestrates one metrics run.
//!
//! This action coordinates:
//! - Loading credentials from the environment
//! - Building the request executor and collector
//! - Collecting the metrics record
//! - Exporting it in every requested format

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use log::{error, info};
use reqwest::Client;
use tracing::info_span;

use crate::config::{Credentials, Settings};
use crate::export::{BASE_NAME, OutputFormat, export_record};
use crate::http::{ApiError, RequestExecutor, format_reset_time};
use crate::metrics::{MetricsCollector, MetricsRecord};
use crate::runtime::Runtime;

/// Options for a single collection run.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub settings: Settings,
    pub format: OutputFormat,
    pub output_dir: PathBuf,
}

/// Runs one collection and returns the paths of the files written.
///
/// Configuration errors surface before any request is sent, and nothing is
/// written unless the full record was collected.
pub async fn collect<R: Runtime>(runtime: &R, options: &CollectOptions) -> Result<Vec<PathBuf>> {
    let credentials = Credentials::from_env(runtime)?;
    let client = options
        .settings
        .build_client(&credentials)
        .context("Failed to build HTTP client")?;

    let record = collect_record(client, &credentials, &options.settings)
        .await
        .map_err(|e| {
            report_failure(&e);
            anyhow::Error::new(e)
        })
        .with_context(|| format!("Failed to collect metrics for {}", credentials.repo))?;

    let at = Local::now().naive_local();
    let mut written = Vec::new();
    for format in options.format.formats() {
        let path = export_record(runtime, &record, &options.output_dir, BASE_NAME, *format, at)?;
        written.push(path);
    }

    Ok(written)
}

async fn collect_record(
    client: Client,
    credentials: &Credentials,
    settings: &Settings,
) -> Result<MetricsRecord, ApiError> {
    let executor = RequestExecutor::new(
        client,
        settings.retry_policy(),
        info_span!("executor", api_url = %settings.api_url),
    );
    let collector = MetricsCollector::new(
        executor,
        settings.api_url.clone(),
        info_span!("collector", repository = %credentials.repo),
    );

    info!("Starting metrics collection");
    collector.collect_all(&credentials.repo).await
}

fn report_failure(e: &ApiError) {
    match e {
        ApiError::RateLimitExceeded { reset_time } => {
            error!(
                "Rate limit exceeded. Resets at {}",
                format_reset_time(*reset_time)
            );
        }
        ApiError::Http { .. } => error!("HTTP error occurred: {}", e),
        _ => error!("An unexpected error occurred: {}", e),
    }
}
