//! Activity lookup for one resolved entry
//!
//! [`ActivityFetcher`] executes the lookup-with-retry protocol for a single
//! [`ResolvedTarget`] and produces the entry's activity date fragment:
//!
//! - Unknown targets and registry packages short-circuit without touching
//!   the network (registry packages get the configured sentinel date).
//! - Repository targets go through the API with the full retry protocol:
//!   rate-limit waits (unbounded unless budgeted), bounded exponential
//!   backoff for access denials, immediate degradation for permanent and
//!   unclassified failures.
//!
//! No failure escapes this module: every fetch terminates with `Some(date)`
//! or `None`, and degradations are logged with the offending identifier.

use crate::config::Config;
use crate::error::ApiError;
use crate::github::ActivityApi;
use crate::retry::{RetryDecision, RetryPolicy};
use crate::types::{ResolvedTarget, TargetKind};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Performs the lookup-with-retry protocol for resolved targets
///
/// Holds only an immutable reference to the shared API client plus the
/// relevant configuration; all per-fetch state lives in a fresh
/// [`RetryPolicy`] per call, so one fetcher is safely shared across
/// concurrent workers.
pub struct ActivityFetcher<A> {
    api: Arc<A>,
    retry: crate::config::RetryConfig,
    courtesy_delay: Duration,
    registry_sentinel: NaiveDate,
}

impl<A: ActivityApi> ActivityFetcher<A> {
    /// Create a fetcher over the shared API client
    pub fn new(api: Arc<A>, config: &Config) -> Self {
        Self {
            api,
            retry: config.retry.clone(),
            courtesy_delay: config.batch.courtesy_delay,
            registry_sentinel: config.registry_sentinel,
        }
    }

    /// Determine the most recent activity date for one target
    ///
    /// Returns `None` when the target is unknown or the lookup degraded.
    pub async fn fetch(&self, target: &ResolvedTarget) -> Option<NaiveDate> {
        match target.kind {
            TargetKind::Unknown => None,
            TargetKind::PackageRegistry => Some(self.registry_sentinel),
            TargetKind::GitRepo => self.fetch_repo(&target.identifier).await,
        }
    }

    async fn fetch_repo(&self, repo: &str) -> Option<NaiveDate> {
        // Courtesy delay before the first lookup only; retries are already
        // spaced by the protocol's own waits
        tokio::time::sleep(self.courtesy_delay).await;

        let mut policy = RetryPolicy::new(&self.retry);

        loop {
            match self.api.repository_metadata(repo).await {
                Ok(metadata) => {
                    if policy.attempts() > 0 {
                        tracing::info!(
                            repo,
                            attempts = policy.attempts() + 1,
                            "Lookup succeeded after retry"
                        );
                    }
                    return Some(metadata.latest_commit.date_naive());
                }
                Err(error) => match policy.decide(&error) {
                    RetryDecision::WaitForReset => {
                        let reset = match self.api.rate_limit_reset().await {
                            Ok(reset) => Some(reset),
                            Err(e) => {
                                tracing::warn!(repo, error = %e, "Could not query rate limit reset");
                                None
                            }
                        };
                        let wait = policy.reset_wait(reset, Utc::now());
                        tracing::warn!(
                            repo,
                            wait_secs = wait.as_secs(),
                            "Rate limit exceeded, waiting for reset"
                        );
                        tokio::time::sleep(wait).await;
                    }
                    RetryDecision::Backoff(delay) => {
                        tracing::warn!(
                            repo,
                            attempt = policy.attempts(),
                            max_retries = self.retry.max_retries,
                            delay_ms = delay.as_millis(),
                            "Access denied, backing off"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    RetryDecision::GiveUp => {
                        log_degradation(repo, &error, policy.attempts());
                        return None;
                    }
                },
            }
        }
    }
}

fn log_degradation(repo: &str, error: &ApiError, attempts: u32) {
    match error {
        ApiError::NotFound { .. } => {
            tracing::warn!(repo, "Repository not found");
        }
        ApiError::Forbidden { .. } => {
            tracing::error!(repo, attempts, "Access denied after all retry attempts");
        }
        ApiError::RateLimited { .. } => {
            tracing::error!(repo, "Rate limit wait budget exhausted");
        }
        other => {
            tracing::error!(repo, error = %other, "Lookup failed");
        }
    }
}
