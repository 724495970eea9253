//! Token rotation
//!
//! Drives the obtain, validate and publish loop over a fixed backoff schedule.

use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::media::{AccessToken, MediaApiError, MediaApiInstance, StreamUrl};
use crate::publisher::{PublishStatus, SecretPublisher};

const DEFAULT_ACTIVATION_DELAY: Duration = Duration::from_secs(3);

/// Something that can wait between rotation steps
#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Ordered waits applied after a failed attempt, one entry per attempt.
///
/// Entries are used positionally; the wait does not depend on earlier outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffSchedule(Vec<Duration>);

impl BackoffSchedule {
    pub fn new(waits: Vec<Duration>) -> Self {
        Self(waits)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn attempts(&self) -> impl Iterator<Item = RotationAttempt> + '_ {
        self.0
            .iter()
            .enumerate()
            .map(|(index, backoff)| RotationAttempt {
                ordinal: index + 1,
                backoff: *backoff,
            })
    }
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self::new(vec![
            Duration::from_secs(3),
            Duration::from_secs(5),
            Duration::from_secs(10),
        ])
    }
}

/// One pass through the rotate-and-validate loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationAttempt {
    /// 1-based position in the schedule
    pub ordinal: usize,
    pub backoff: Duration,
}

/// The resource looked up to prove a token works
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub host: String,
    pub user_agent: String,
    pub resource_id: String,
}

/// How a probe lookup judged a freshly issued token
#[derive(Debug)]
pub enum Validation {
    Validated { stream_url: Option<StreamUrl> },
    Rejected(MediaApiError),
}

/// Decide whether a probe result proves the token is accepted.
///
/// A not-found/gone response only happens after authentication succeeded, so
/// it counts as validated. Every other error rejects the token.
pub fn classify_probe(result: Result<StreamUrl, MediaApiError>) -> Validation {
    match result {
        Ok(url) => Validation::Validated {
            stream_url: Some(url),
        },
        Err(e) if e.is_not_found() => Validation::Validated { stream_url: None },
        Err(e) => Validation::Rejected(e),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    /// A token validated on `attempt` and was handed to the publisher
    Published {
        attempt: usize,
        status: PublishStatus,
    },
    /// Every attempt failed; nothing was published
    Exhausted { attempts: usize },
}

impl RotationOutcome {
    pub fn published(&self) -> bool {
        matches!(self, RotationOutcome::Published { .. })
    }
}

/// Obtains, validates and publishes a new access token
pub struct Rotator {
    api: MediaApiInstance,
    publisher: SecretPublisher,
    sleeper: Box<dyn Sleeper>,
    schedule: BackoffSchedule,
    activation_delay: Duration,
    probe: ProbeTarget,
}

impl Rotator {
    pub fn new(
        api: MediaApiInstance,
        publisher: SecretPublisher,
        schedule: BackoffSchedule,
        probe: ProbeTarget,
    ) -> Self {
        Self {
            api,
            publisher,
            sleeper: Box::new(TokioSleeper),
            schedule,
            activation_delay: DEFAULT_ACTIVATION_DELAY,
            probe,
        }
    }

    pub fn from_config(config: &Config, api: MediaApiInstance, publisher: SecretPublisher) -> Self {
        let probe = ProbeTarget {
            host: config.media_api.probe_host.clone(),
            user_agent: config.media_api.user_agent.clone(),
            resource_id: config.media_api.probe_id.clone(),
        };

        Self::new(
            api,
            publisher,
            BackoffSchedule::new(config.rotation.backoff()),
            probe,
        )
        .with_activation_delay(config.rotation.activation_delay())
    }

    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_activation_delay(mut self, delay: Duration) -> Self {
        self.activation_delay = delay;
        self
    }

    pub fn schedule(&self) -> &BackoffSchedule {
        &self.schedule
    }

    /// Run one rotation sequence to completion.
    ///
    /// Never fails: exhausting the schedule leaves the stored token untouched.
    pub async fn run(&self) -> RotationOutcome {
        info!(
            "Starting {} token rotation ({} attempts)",
            self.api.api_name(),
            self.schedule.len()
        );

        for attempt in self.schedule.attempts() {
            let token = match self.api.request_new_access_token().await {
                Ok(token) => token,
                Err(e) => {
                    warn!(
                        "Attempt {}: failed to obtain access token: {}. Retrying in {:?}",
                        attempt.ordinal, e, attempt.backoff
                    );
                    self.sleeper.sleep(attempt.backoff).await;
                    continue;
                }
            };

            // New tokens take a moment to become active upstream
            self.sleeper.sleep(self.activation_delay).await;

            match self.validate(&token).await {
                Validation::Validated { stream_url } => {
                    info!(
                        "Attempt {}: token validated against '{}' ({})",
                        attempt.ordinal,
                        self.probe.resource_id,
                        if stream_url.is_some() { "resolved" } else { "not found" }
                    );
                    let status = self.publisher.publish(&token).await;
                    return RotationOutcome::Published {
                        attempt: attempt.ordinal,
                        status,
                    };
                }
                Validation::Rejected(e) => {
                    warn!(
                        "Attempt {}: token validation failed: {}. Retrying in {:?}",
                        attempt.ordinal, e, attempt.backoff
                    );
                    self.sleeper.sleep(attempt.backoff).await;
                }
            }
        }

        warn!(
            "Token rotation gave up after {} attempts; '{}' left unchanged",
            self.schedule.len(),
            self.publisher.secret_id()
        );
        RotationOutcome::Exhausted {
            attempts: self.schedule.len(),
        }
    }

    async fn validate(&self, token: &AccessToken) -> Validation {
        let result = self
            .api
            .lookup_stream_url(
                &self.probe.host,
                &self.probe.user_agent,
                &self.probe.resource_id,
                token,
            )
            .await;
        classify_probe(result)
    }
}
