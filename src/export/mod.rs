//! Writes a [`MetricsRecord`] to CSV and/or JSON files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use log::{error, info};
use serde::Serialize;

use crate::metrics::{ForkDetail, MetricsRecord};
use crate::runtime::Runtime;

/// Base name shared by data and log files.
pub const BASE_NAME: &str = "github_metrics";

/// Output format selected on the command line.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Both,
}

impl OutputFormat {
    pub fn formats(self) -> &'static [ExportFormat] {
        match self {
            OutputFormat::Csv => &[ExportFormat::Csv],
            OutputFormat::Json => &[ExportFormat::Json],
            OutputFormat::Both => &[ExportFormat::Csv, ExportFormat::Json],
        }
    }
}

/// A single file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// `{base_name}_{YYYYmmdd_HHMMSS}.{extension}`
pub fn generate_filename(base_name: &str, extension: &str, at: NaiveDateTime) -> String {
    format!("{}_{}.{}", base_name, at.format("%Y%m%d_%H%M%S"), extension)
}

/// Writes `record` into `output_dir`, creating the directory when needed.
/// Returns the path of the file written.
pub fn export_record<R: Runtime>(
    runtime: &R,
    record: &MetricsRecord,
    output_dir: &Path,
    base_name: &str,
    format: ExportFormat,
    at: NaiveDateTime,
) -> Result<PathBuf> {
    if !runtime.exists(output_dir) {
        runtime.create_dir_all(output_dir)?;
    }

    let path = output_dir.join(generate_filename(base_name, format.extension(), at));
    info!("Exporting data to {}", path.display());

    let written = render(record, format).and_then(|contents| runtime.write(&path, &contents));
    if let Err(e) = written {
        error!("Error exporting data: {:#}", e);
        return Err(e);
    }

    info!("Data exported successfully to {}", path.display());
    Ok(path)
}

fn render(record: &MetricsRecord, format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => render_csv(record),
        ExportFormat::Json => render_json(record),
    }
}

/// One row per record; fork details become one JSON text column.
#[derive(Serialize)]
struct CsvRow<'a> {
    timestamp: NaiveDateTime,
    repository: &'a str,
    stars: u64,
    forks: u64,
    watchers: u64,
    open_issues: u64,
    last_updated: &'a str,
    total_views: u64,
    unique_visitors: u64,
    total_clones: u64,
    unique_cloners: u64,
    fork_count: usize,
    fork_details: String,
}

impl<'a> CsvRow<'a> {
    fn new(record: &'a MetricsRecord) -> Result<Self> {
        Ok(Self {
            timestamp: record.timestamp,
            repository: &record.repository,
            stars: record.stars,
            forks: record.forks,
            watchers: record.watchers,
            open_issues: record.open_issues,
            last_updated: &record.last_updated,
            total_views: record.total_views,
            unique_visitors: record.unique_visitors,
            total_clones: record.total_clones,
            unique_cloners: record.unique_cloners,
            fork_count: record.fork_count,
            fork_details: render_fork_details(&record.fork_details)?,
        })
    }
}

fn render_fork_details(forks: &[ForkDetail]) -> Result<String> {
    serde_json::to_string(forks).context("Failed to render fork details")
}

fn render_csv(record: &MetricsRecord) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .serialize(CsvRow::new(record)?)
        .context("Failed to serialize CSV row")?;
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))
}

fn render_json(record: &MetricsRecord) -> Result<Vec<u8>> {
    let mut contents =
        serde_json::to_vec_pretty(record).context("Failed to serialize metrics to JSON")?;
    contents.push(b'\n');
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::GitHubRepo;
    use crate::metrics::{BasicMetrics, TrafficMetrics};
    use crate::runtime::{MockRuntime, RealRuntime};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 15)
            .unwrap()
    }

    fn record() -> MetricsRecord {
        MetricsRecord::new(
            at(),
            &GitHubRepo::new("octo", "hello"),
            BasicMetrics {
                stars: 42,
                forks: 2,
                watchers: 5,
                open_issues: 3,
                last_updated: "2024-04-30T10:00:00Z".to_string(),
            },
            TrafficMetrics {
                total_views: 0,
                unique_visitors: 0,
                total_clones: 5,
                unique_cloners: 2,
            },
            vec![
                ForkDetail {
                    owner: "alice".to_string(),
                    created_at: "2024-01-01T00:00:00Z".to_string(),
                    last_updated: "2024-03-01T00:00:00Z".to_string(),
                    stars: 1,
                },
                ForkDetail {
                    owner: "bob".to_string(),
                    created_at: "2024-02-01T00:00:00Z".to_string(),
                    last_updated: "2024-04-01T00:00:00Z".to_string(),
                    stars: 0,
                },
            ],
        )
    }

    #[test]
    fn test_generate_filename() {
        assert_eq!(
            generate_filename("github_metrics", "csv", at()),
            "github_metrics_20240501_093015.csv"
        );
    }

    #[test]
    fn test_output_format_expands() {
        assert_eq!(OutputFormat::Csv.formats(), &[ExportFormat::Csv]);
        assert_eq!(OutputFormat::Json.formats(), &[ExportFormat::Json]);
        assert_eq!(
            OutputFormat::Both.formats(),
            &[ExportFormat::Csv, ExportFormat::Json]
        );
    }

    #[test]
    fn test_export_csv_flattens_fork_details() {
        let dir = tempdir().unwrap();
        let path = export_record(
            &RealRuntime,
            &record(),
            dir.path(),
            BASE_NAME,
            ExportFormat::Csv,
            at(),
        )
        .unwrap();

        assert_eq!(path, dir.path().join("github_metrics_20240501_093015.csv"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec![
                "timestamp",
                "repository",
                "stars",
                "forks",
                "watchers",
                "open_issues",
                "last_updated",
                "total_views",
                "unique_visitors",
                "total_clones",
                "unique_cloners",
                "fork_count",
                "fork_details",
            ]
        );

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "octo/hello");
        assert_eq!(&rows[0][11], "2");

        let forks: serde_json::Value = serde_json::from_str(&rows[0][12]).unwrap();
        assert_eq!(forks[0]["owner"], "alice");
        assert_eq!(forks[1]["owner"], "bob");
    }

    #[test]
    fn test_export_json_keeps_nested_fork_details() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested/out");
        let path = export_record(
            &RealRuntime,
            &record(),
            &out,
            BASE_NAME,
            ExportFormat::Json,
            at(),
        )
        .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(value["repository"], "octo/hello");
        assert_eq!(value["timestamp"], "2024-05-01T09:30:15");
        assert_eq!(value["total_clones"], 5);
        assert_eq!(value["fork_count"], 2);
        let forks = value["fork_details"].as_array().unwrap();
        assert_eq!(forks.len(), 2);
        assert_eq!(forks[1]["owner"], "bob");
        assert_eq!(forks[1]["last_updated"], "2024-04-01T00:00:00Z");
    }

    #[test]
    fn test_export_creates_missing_directory() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);
        runtime
            .expect_create_dir_all()
            .times(1)
            .returning(|_| Ok(()));
        runtime.expect_write().times(1).returning(|_, _| Ok(()));

        let path = export_record(
            &runtime,
            &record(),
            Path::new("/tmp/metrics"),
            BASE_NAME,
            ExportFormat::Json,
            at(),
        )
        .unwrap();

        assert_eq!(
            path,
            Path::new("/tmp/metrics/github_metrics_20240501_093015.json")
        );
    }

    #[test]
    fn test_export_propagates_write_failure() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_write()
            .returning(|_, _| Err(anyhow::anyhow!("disk full")));

        let result = export_record(
            &runtime,
            &record(),
            Path::new("/tmp/metrics"),
            BASE_NAME,
            ExportFormat::Csv,
            at(),
        );

        assert!(result.unwrap_err().to_string().contains("disk full"));
    }
}
