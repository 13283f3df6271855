//! Sequences the repository, traffic and fork endpoints into one record.

use chrono::{Local, SubsecRound};
use tracing::{Instrument, Span, error, info, warn};

use super::record::{BasicMetrics, ForkDetail, MetricsRecord, TrafficMetrics};
use crate::github::{ForkInfo, GitHubRepo, RepoInfo, TrafficSummary};
use crate::http::{ApiError, RequestExecutor, Timer, TokioTimer};

pub struct MetricsCollector<T: Timer = TokioTimer> {
    executor: RequestExecutor<T>,
    api_url: String,
    span: Span,
}

impl<T: Timer> MetricsCollector<T> {
    pub fn new(executor: RequestExecutor<T>, api_url: impl Into<String>, span: Span) -> Self {
        Self {
            executor,
            api_url: api_url.into(),
            span,
        }
    }

    /// Stars, forks, watchers, open issues and last update. Failures propagate.
    pub async fn fetch_basic_metrics(&self, repo: &GitHubRepo) -> Result<BasicMetrics, ApiError> {
        let url = repo.api_path(&self.api_url, "");
        let info: RepoInfo = self
            .executor
            .get_json(&url)
            .instrument(self.span.clone())
            .await?;
        Ok(info.into())
    }

    /// Views and clones over the trailing window.
    ///
    /// Each endpoint that answers with an HTTP error (typically 403 without push
    /// access) counts as zero. Rate-limit and network failures still propagate.
    pub async fn fetch_traffic(&self, repo: &GitHubRepo) -> Result<TrafficMetrics, ApiError> {
        let views = self
            .fetch_traffic_summary(&repo.api_path(&self.api_url, "/traffic/views"), "view")
            .instrument(self.span.clone())
            .await?;
        let clones = self
            .fetch_traffic_summary(&repo.api_path(&self.api_url, "/traffic/clones"), "clone")
            .instrument(self.span.clone())
            .await?;

        Ok(TrafficMetrics::from_summaries(views, clones))
    }

    async fn fetch_traffic_summary(
        &self,
        url: &str,
        kind: &str,
    ) -> Result<TrafficSummary, ApiError> {
        match self.executor.get_json::<TrafficSummary>(url).await {
            Ok(summary) => Ok(summary),
            Err(e) if e.is_http() => {
                warn!("Could not fetch {} data: {}", kind, e);
                Ok(TrafficSummary::default())
            }
            Err(e) => Err(e),
        }
    }

    /// First page of forks, in API order. Failures propagate.
    pub async fn fetch_fork_details(
        &self,
        repo: &GitHubRepo,
    ) -> Result<Vec<ForkDetail>, ApiError> {
        let url = repo.api_path(&self.api_url, "/forks");
        let forks: Vec<ForkInfo> = self
            .executor
            .get_json(&url)
            .instrument(self.span.clone())
            .await?;
        Ok(forks.into_iter().map(ForkDetail::from).collect())
    }

    /// Basic metrics, then traffic, then forks, merged into one record stamped
    /// with the local time to the microsecond. Any failure is logged and
    /// returned; no partial record is produced.
    pub async fn collect_all(&self, repo: &GitHubRepo) -> Result<MetricsRecord, ApiError> {
        let span = self.span.clone();
        async {
            info!("Collecting all metrics for {}", repo);

            let result: Result<MetricsRecord, ApiError> = async {
                let basic = self.fetch_basic_metrics(repo).await?;
                let traffic = self.fetch_traffic(repo).await?;
                let forks = self.fetch_fork_details(repo).await?;
                Ok(MetricsRecord::new(
                    Local::now().naive_local().trunc_subsecs(6),
                    repo,
                    basic,
                    traffic,
                    forks,
                ))
            }
            .await;

            if let Err(e) = &result {
                error!(repository = %repo, error = ?e, "Error collecting metrics: {}", e);
            }
            result
        }
        .instrument(span)
        .await
    }
}
