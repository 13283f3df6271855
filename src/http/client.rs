//! Request executor with rate-limit and network-failure recovery.

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::{Instrument, Span, debug, error, warn};

use super::error::ApiError;
use super::response::ApiResponse;
use super::retry::{
    Outcome, RATE_LIMIT_REMAINING_HEADER, RATE_LIMIT_RESET_HEADER, RetryDecision, RetryPolicy,
    header_value,
};
use super::timer::{Timer, TokioTimer};

/// Optional request extras: query pairs and a JSON body.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Executes logical API requests against a rate-limited service.
///
/// The wrapped [`Client`] must already carry the authentication and `Accept`
/// headers. The executor is immutable after construction; every call keeps
/// its own retry counter.
pub struct RequestExecutor<T: Timer = TokioTimer> {
    client: Client,
    policy: RetryPolicy,
    timer: T,
    span: Span,
}

impl RequestExecutor<TokioTimer> {
    pub fn new(client: Client, policy: RetryPolicy, span: Span) -> Self {
        Self::with_timer(client, policy, TokioTimer, span)
    }
}

impl<T: Timer> RequestExecutor<T> {
    pub fn with_timer(client: Client, policy: RetryPolicy, timer: T, span: Span) -> Self {
        Self {
            client,
            policy,
            timer,
            span,
        }
    }

    pub async fn get(&self, url: &str) -> Result<ApiResponse, ApiError> {
        self.execute(Method::GET, url, &RequestOptions::default()).await
    }

    /// GETs `url` and decodes the JSON body.
    pub async fn get_json<D: DeserializeOwned>(&self, url: &str) -> Result<D, ApiError> {
        self.get(url).await?.json()
    }

    /// Runs one logical request, retrying rate limits and network failures
    /// according to the policy.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.execute_with_retry(method, url, options)
            .instrument(self.span.clone())
            .await
    }

    async fn execute_with_retry(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let max_retries = self.policy.max_retries;
        let mut retries = 0;

        while retries <= max_retries {
            let attempt = self.send_once(method.clone(), url, options).await;

            if let Ok(response) = &attempt {
                let remaining =
                    header_value(&response.headers, RATE_LIMIT_REMAINING_HEADER).unwrap_or("N/A");
                let reset =
                    header_value(&response.headers, RATE_LIMIT_RESET_HEADER).unwrap_or("N/A");
                debug!("Rate limit remaining: {}, Reset time: {}", remaining, reset);
            }

            match self.policy.classify(attempt) {
                Outcome::Success(response) => return Ok(response),
                Outcome::HttpFailure(response) => {
                    debug!("{} {} failed with HTTP {}", method, url, response.status);
                    return Err(ApiError::Http {
                        status: response.status,
                        body: response.text(),
                    });
                }
                Outcome::RateLimited { reset_time } => {
                    match self
                        .policy
                        .on_rate_limit(retries, reset_time, self.timer.now())
                    {
                        RetryDecision::RetryAfter(wait) => {
                            warn!(
                                "Rate limit hit. Waiting {:.0} seconds. Retry {}/{}",
                                wait.as_secs_f64(),
                                retries + 1,
                                max_retries
                            );
                            self.timer.sleep(wait).await;
                            retries += 1;
                        }
                        RetryDecision::GiveUp => {
                            return Err(ApiError::RateLimitExceeded { reset_time });
                        }
                    }
                }
                Outcome::Transient(e) => match self.policy.on_network_error(retries) {
                    RetryDecision::RetryAfter(wait) => {
                        warn!(
                            "Request failed: {}. Retrying in {} seconds. Retry {}/{}",
                            e,
                            wait.as_secs_f64(),
                            retries + 1,
                            max_retries
                        );
                        self.timer.sleep(wait).await;
                        retries += 1;
                    }
                    RetryDecision::GiveUp => {
                        error!("Request failed after {} retries: {}", max_retries, e);
                        return Err(ApiError::Network(e));
                    }
                },
            }
        }

        Err(ApiError::RetriesExhausted)
    }

    /// Single attempt, including the full body transfer.
    async fn send_once(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse, reqwest::Error> {
        let mut request = self.client.request(method, url);
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        ApiResponse::read(response).await
    }
}
