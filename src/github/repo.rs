/// Identity of the repository whose metrics are collected.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct GitHubRepo {
    pub owner: String,
    pub repo: String,
}

impl GitHubRepo {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// `{api_url}/repos/{owner}/{repo}` followed by `suffix`.
    pub fn api_path(&self, api_url: &str, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            api_url.trim_end_matches('/'),
            self.owner,
            self.repo,
            suffix
        )
    }
}

impl std::fmt::Display for GitHubRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
