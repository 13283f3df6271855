use chrono::NaiveDateTime;
use serde::Serialize;

use crate::github::{ForkInfo, GitHubRepo, RepoInfo, TrafficSummary};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BasicMetrics {
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub last_updated: String,
}

impl From<RepoInfo> for BasicMetrics {
    fn from(info: RepoInfo) -> Self {
        Self {
            stars: info.stargazers_count,
            forks: info.forks_count,
            watchers: info.subscribers_count,
            open_issues: info.open_issues_count,
            last_updated: info.updated_at,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrafficMetrics {
    pub total_views: u64,
    pub unique_visitors: u64,
    pub total_clones: u64,
    pub unique_cloners: u64,
}

impl TrafficMetrics {
    pub fn from_summaries(views: TrafficSummary, clones: TrafficSummary) -> Self {
        Self {
            total_views: views.count,
            unique_visitors: views.uniques,
            total_clones: clones.count,
            unique_cloners: clones.uniques,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ForkDetail {
    pub owner: String,
    pub created_at: String,
    pub last_updated: String,
    pub stars: u64,
}

impl From<ForkInfo> for ForkDetail {
    fn from(fork: ForkInfo) -> Self {
        Self {
            owner: fork.owner.login,
            created_at: fork.created_at,
            last_updated: fork.updated_at,
            stars: fork.stargazers_count,
        }
    }
}

/// Everything collected in one run, in output column order.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MetricsRecord {
    pub timestamp: NaiveDateTime,
    pub repository: String,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub last_updated: String,
    pub total_views: u64,
    pub unique_visitors: u64,
    pub total_clones: u64,
    pub unique_cloners: u64,
    pub fork_count: usize,
    pub fork_details: Vec<ForkDetail>,
}

impl MetricsRecord {
    pub fn new(
        timestamp: NaiveDateTime,
        repo: &GitHubRepo,
        basic: BasicMetrics,
        traffic: TrafficMetrics,
        fork_details: Vec<ForkDetail>,
    ) -> Self {
        Self {
            timestamp,
            repository: repo.to_string(),
            stars: basic.stars,
            forks: basic.forks,
            watchers: basic.watchers,
            open_issues: basic.open_issues,
            last_updated: basic.last_updated,
            total_views: traffic.total_views,
            unique_visitors: traffic.unique_visitors,
            total_clones: traffic.total_clones,
            unique_cloners: traffic.unique_cloners,
            fork_count: fork_details.len(),
            fork_details,
        }
    }
}
