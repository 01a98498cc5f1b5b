//! HTTP reachability checking with retry and backoff
//!
//! One `HttpChecker` is built per run and shared by every worker. It owns
//! the reqwest client (and with it the connection pool) plus a global
//! semaphore bounding in-flight requests across the whole run, so outbound
//! load is capped no matter how many workers are processing chunks.
//!
//! Redirects are never followed by the transport; they are resolved
//! manually so the final location is known and can be handed back to the
//! transformer.

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode, header};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{Duration, sleep};

use crate::config::Config;
use crate::core::constants::{defaults, http_status};
use crate::core::error::Result;

/// The classified result of attempting to reach one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// 2xx answer; the URL stays as-is
    Valid,
    /// 301/302/307/308 answer; carries the resolved target URL
    Redirected(String),
    /// 404/410 answer; the resource is gone
    NotFound,
    /// All attempts timed out
    TimedOut,
    /// The value is not an absolute http(s) URL
    InvalidSyntax,
    /// Connection failure or unexpected status after all attempts
    NetworkError,
}

/// Capability to check one URL. The pipeline only sees this trait, which
/// keeps the transformer and workers testable without a network.
#[async_trait]
pub trait CheckUrls: Send + Sync {
    async fn check(&self, url: &str) -> CheckOutcome;
}

/// Result of a single attempt, before the retry loop resolves it.
enum Attempt {
    Done(CheckOutcome),
    RetryTimeout,
    RetryNetwork,
}

pub struct HttpChecker {
    client: Client,
    permits: Arc<Semaphore>,
    retry_attempts: u8,
    retry_delay: Duration,
    max_backoff: Duration,
    follow_redirects: bool,
    max_hops: usize,
}

impl HttpChecker {
    pub fn new(config: &Config) -> Result<Self> {
        let user_agent = config.user_agent.as_deref().unwrap_or(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));

        let client = Client::builder()
            .timeout(config.timeout_duration())
            // Redirects are resolved manually below
            .redirect(Policy::none())
            .user_agent(user_agent)
            .pool_max_idle_per_host(config.max_connections().min(20))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(config.max_connections())),
            retry_attempts: config.retry_attempts().max(1),
            retry_delay: config.retry_delay_duration(),
            max_backoff: Duration::from_millis(defaults::MAX_BACKOFF_MS),
            follow_redirects: config.follow_redirects(),
            max_hops: defaults::MAX_REDIRECT_HOPS,
        })
    }

    /// One request with HEAD→GET fallback for servers that reject HEAD.
    async fn probe(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        let response = self.client.request(Method::HEAD, url).send().await?;
        match response.status() {
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => {
                self.client.request(Method::GET, url).send().await
            }
            _ => Ok(response),
        }
    }

    /// `base_delay * 2^failures`, capped so misbehaving hosts cannot
    /// stretch a run indefinitely.
    fn backoff_delay(&self, failures: u8) -> Duration {
        let factor = 2u32.saturating_pow(u32::from(failures));
        self.retry_delay.saturating_mul(factor).min(self.max_backoff)
    }

    /// Resolve the Location header against the URL that answered, since
    /// servers are allowed to send relative targets.
    fn resolve_location(base: &str, response: &reqwest::Response) -> Option<String> {
        let location = response.headers().get(header::LOCATION)?.to_str().ok()?;
        match url::Url::parse(location) {
            Ok(absolute) => Some(absolute.into()),
            Err(_) => url::Url::parse(base)
                .ok()?
                .join(location)
                .ok()
                .map(Into::into),
        }
    }

    /// Follow a redirect chain starting from the first hop's target,
    /// bounded by the hop cap. Failures along the chain keep the last
    /// resolved target rather than losing the redirect entirely.
    async fn follow_chain(&self, first_target: String) -> String {
        let mut current = first_target;
        for _ in 1..self.max_hops {
            let response = match self.probe(&current).await {
                Ok(response) => response,
                Err(_) => break,
            };
            if !is_redirect(response.status()) {
                break;
            }
            match Self::resolve_location(&current, &response) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    async fn attempt(&self, url: &str) -> Attempt {
        let response = match self.probe(url).await {
            Ok(response) => response,
            // A URL the client cannot even build is not transient
            Err(err) if err.is_builder() => return Attempt::Done(CheckOutcome::InvalidSyntax),
            Err(err) if err.is_timeout() => return Attempt::RetryTimeout,
            Err(_) => return Attempt::RetryNetwork,
        };

        let status = response.status();
        if status.is_success() {
            return Attempt::Done(CheckOutcome::Valid);
        }
        if is_redirect(status) {
            return Attempt::Done(match Self::resolve_location(url, &response) {
                Some(target) if self.follow_redirects => {
                    CheckOutcome::Redirected(self.follow_chain(target).await)
                }
                Some(target) => CheckOutcome::Redirected(target),
                // A redirect without a target still answers for the URL
                None => CheckOutcome::Valid,
            });
        }
        match status.as_u16() {
            http_status::NOT_FOUND | http_status::GONE => Attempt::Done(CheckOutcome::NotFound),
            // 5xx and anything unexpected share the timeout backoff
            // schedule, then resolve to NetworkError
            _ => Attempt::RetryNetwork,
        }
    }
}

#[async_trait]
impl CheckUrls for HttpChecker {
    async fn check(&self, url: &str) -> CheckOutcome {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            // The semaphore is only closed during shutdown
            Err(_) => return CheckOutcome::NetworkError,
        };

        let mut failures = 0u8;
        loop {
            match self.attempt(url).await {
                Attempt::Done(outcome) => return outcome,
                retry => {
                    failures += 1;
                    if failures >= self.retry_attempts {
                        return match retry {
                            Attempt::RetryTimeout => CheckOutcome::TimedOut,
                            _ => CheckOutcome::NetworkError,
                        };
                    }
                    sleep(self.backoff_delay(failures - 1)).await;
                }
            }
        }
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}
