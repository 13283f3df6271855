use serde::Deserialize;

/// Subset of `GET /repos/{owner}/{repo}`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RepoInfo {
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub subscribers_count: u64,
    pub open_issues_count: u64,
    pub updated_at: String,
}

/// Body of `/traffic/views` and `/traffic/clones`. Per-day breakdowns are ignored.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrafficSummary {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub uniques: u64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ForkOwner {
    pub login: String,
}

/// One entry of `GET /repos/{owner}/{repo}/forks`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ForkInfo {
    pub owner: ForkOwner,
    pub created_at: String,
    pub updated_at: String,
    pub stargazers_count: u64,
}
