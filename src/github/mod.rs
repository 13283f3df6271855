//! GitHub repository identity and the response shapes consumed from the REST API.

mod repo;
mod types;

pub use repo::GitHubRepo;
pub use types::{ForkInfo, ForkOwner, RepoInfo, TrafficSummary};

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Media type pinning the v3 REST API.
pub const ACCEPT_V3: &str = "application/vnd.github.v3+json";
