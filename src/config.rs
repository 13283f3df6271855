//! Credentials from the environment and HTTP settings from the command line.

use std::time::Duration;

use anyhow::Result;
use log::debug;
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue},
};

use crate::github::{ACCEPT_V3, DEFAULT_API_URL, GitHubRepo};
use crate::http::{MAX_RETRIES, RETRY_DELAY, RetryPolicy};
use crate::runtime::Runtime;

pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const OWNER_VAR: &str = "GITHUB_OWNER";
pub const REPO_VAR: &str = "GITHUB_REPO";

/// Default timeout for a single HTTP attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Please set {0} environment variable")]
    MissingVar(&'static str),
}

/// Token and target repository, fixed for the whole run.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub repo: GitHubRepo,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &mask_token(&self.token))
            .field("repo", &self.repo)
            .finish()
    }
}

impl Credentials {
    /// Reads token, owner and repository name. A missing or empty variable is
    /// an error naming the first one absent.
    pub fn from_env<R: Runtime>(runtime: &R) -> Result<Self, ConfigError> {
        let token = required_var(runtime, TOKEN_VAR)?;
        let owner = required_var(runtime, OWNER_VAR)?;
        let repo = required_var(runtime, REPO_VAR)?;

        debug!("Using {} for authentication: {}", TOKEN_VAR, mask_token(&token));

        Ok(Self {
            token,
            repo: GitHubRepo::new(owner, repo),
        })
    }
}

fn required_var<R: Runtime>(runtime: &R, key: &'static str) -> Result<String, ConfigError> {
    match runtime.env_var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(key)),
    }
}

/// Shows only the edges of a token, enough to tell two tokens apart.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*********".to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}

/// Executor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            max_retries: MAX_RETRIES,
            retry_delay: RETRY_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Settings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_delay)
    }

    /// Client carrying the bearer token, the v3 media type and a user agent.
    pub fn build_client(&self, credentials: &Credentials) -> Result<Client> {
        let mut headers = HeaderMap::new();
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", credentials.token))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V3));

        let client = Client::builder()
            .user_agent(concat!("repo-metrics/", env!("REPO_METRICS_VERSION")))
            .default_headers(headers)
            .timeout(self.timeout)
            .build()?;

        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use mockito::{Matcher, Server};

    fn runtime_with(vars: &[(&'static str, Option<&'static str>)]) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        for (key, value) in vars {
            let value = value.map(|v| v.to_string());
            runtime
                .expect_env_var()
                .with(eq(*key))
                .returning(move |_| value.clone().ok_or(std::env::VarError::NotPresent));
        }
        runtime
    }

    #[test]
    fn test_credentials_from_env() {
        let runtime = runtime_with(&[
            (TOKEN_VAR, Some("ghp_abcdefghijklmnop")),
            (OWNER_VAR, Some("octo")),
            (REPO_VAR, Some("hello")),
        ]);

        let credentials = Credentials::from_env(&runtime).unwrap();

        assert_eq!(credentials.token, "ghp_abcdefghijklmnop");
        assert_eq!(credentials.repo, GitHubRepo::new("octo", "hello"));
    }

    #[test]
    fn test_credentials_missing_token() {
        let runtime = runtime_with(&[(TOKEN_VAR, None)]);
        assert_eq!(
            Credentials::from_env(&runtime).unwrap_err(),
            ConfigError::MissingVar(TOKEN_VAR)
        );
    }

    #[test]
    fn test_credentials_empty_repo_is_missing() {
        let runtime = runtime_with(&[
            (TOKEN_VAR, Some("token")),
            (OWNER_VAR, Some("octo")),
            (REPO_VAR, Some("")),
        ]);
        let err = Credentials::from_env(&runtime).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(REPO_VAR));
        assert_eq!(err.to_string(), "Please set GITHUB_REPO environment variable");
    }

    #[test]
    fn test_credentials_whitespace_values_are_kept() {
        let runtime = runtime_with(&[
            (TOKEN_VAR, Some(" ")),
            (OWNER_VAR, Some("octo")),
            (REPO_VAR, Some("hello")),
        ]);
        let credentials = Credentials::from_env(&runtime).unwrap();
        assert_eq!(credentials.token, " ");
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("ghp_1234567890abcdef"), "ghp_1234*********cdef");
        assert_eq!(mask_token("short"), "*********");
    }

    #[test]
    fn test_credentials_debug_hides_token() {
        let credentials = Credentials {
            token: "ghp_supersecretvalue1234".to_string(),
            repo: GitHubRepo::new("o", "r"),
        };
        assert!(!format!("{:?}", credentials).contains("supersecret"));
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.api_url, "https://api.github.com");
        assert_eq!(settings.retry_policy(), RetryPolicy::default());
    }

    #[tokio::test]
    async fn test_client_sends_auth_and_accept_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_header("Authorization", Matcher::Exact("Bearer test_token".to_string()))
            .match_header("Accept", Matcher::Exact(ACCEPT_V3.to_string()))
            .match_header("User-Agent", Matcher::Regex("^repo-metrics/".to_string()))
            .create_async()
            .await;

        let credentials = Credentials {
            token: "test_token".to_string(),
            repo: GitHubRepo::new("o", "r"),
        };
        let client = Settings::default().build_client(&credentials).unwrap();
        let _ = client.get(server.url()).send().await;

        mock.assert_async().await;
    }
}
