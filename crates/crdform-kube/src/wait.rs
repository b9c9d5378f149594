//! Waiting for objects after apply or delete
//!
//! [`poll_until`] is the generic loop: it runs a check at `t = 0`, then every
//! poll interval, with the last sleep clamped so a final check happens at the
//! deadline. A zero timeout means a single check. Checks and sleeps race
//! the caller's [`CancellationToken`].

use std::future::Future;
use std::time::Duration;

use crdform_core::{ValueError, parse_duration_or};
use serde_json::Value;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::client::{DynamicClient, ObjectRef};
use crate::error::ProviderError;
use crate::jsonpath::{JsonPath, JsonPathError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Lower bound for the poll interval, so a `"0s"` interval cannot spin
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Errors raised while waiting
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("timed out after {waited:?} waiting for {condition} ({attempts} attempts)")]
    Timeout {
        condition: String,
        waited: Duration,
        attempts: u32,
    },

    #[error("cancelled while waiting for {condition}")]
    Cancelled { condition: String },

    #[error("invalid wait condition: {0}")]
    InvalidCondition(#[from] JsonPathError),

    #[error("failed to fetch object while waiting: {0}")]
    Fetch(#[source] Box<ProviderError>),
}

/// Timeout and poll interval of one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Parse duration attributes, falling back to the defaults
    pub fn parse(timeout: Option<&str>, poll_interval: Option<&str>) -> Result<Self, ValueError> {
        Ok(Self {
            timeout: parse_duration_or(timeout, DEFAULT_TIMEOUT)?,
            poll_interval: parse_duration_or(poll_interval, DEFAULT_POLL_INTERVAL)?,
        })
    }
}

/// A `wait_for_upsert` entry: poll until `jsonpath` selects `value`
#[derive(Debug, Clone, PartialEq)]
pub struct WaitCondition {
    pub jsonpath: String,
    pub value: String,
    pub poll: PollConfig,
}

/// Run `check` until it yields `Some`, the deadline passes, or `cancel` fires.
///
/// `check` returning an error aborts the wait immediately. Each check is
/// raced against the deadline and `cancel`; a check that starts at or after
/// the deadline (zero timeout, final check) gets one poll interval to answer.
/// A timeout too large to represent waits without a deadline.
pub async fn poll_until<T, F, Fut>(
    condition: &str,
    config: PollConfig,
    cancel: &CancellationToken,
    mut check: F,
) -> Result<T, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, ProviderError>>,
{
    let cancelled = || WaitError::Cancelled {
        condition: condition.to_string(),
    };
    if cancel.is_cancelled() {
        return Err(cancelled());
    }

    let start = Instant::now();
    let deadline = start.checked_add(config.timeout);
    let interval = config.poll_interval.max(MIN_POLL_INTERVAL);
    let mut attempts: u32 = 0;
    let timed_out = |attempts| WaitError::Timeout {
        condition: condition.to_string(),
        waited: start.elapsed(),
        attempts,
    };

    loop {
        attempts += 1;
        tracing::debug!(
            condition,
            attempt = attempts,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "polling"
        );

        let now = Instant::now();
        let check_deadline = match deadline {
            Some(deadline) if deadline > now => Some(deadline),
            Some(_) => now.checked_add(interval),
            None => None,
        };
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled()),
            result = check() => result.map_err(|e| WaitError::Fetch(Box::new(e)))?,
            _ = sleep_until(check_deadline) => return Err(timed_out(attempts)),
        };
        if let Some(done) = outcome {
            return Ok(done);
        }

        let now = Instant::now();
        let pause = match deadline {
            Some(deadline) if now >= deadline => return Err(timed_out(attempts)),
            Some(deadline) => interval.min(deadline - now),
            None => interval,
        };
        tokio::select! {
            _ = cancel.cancelled() => return Err(cancelled()),
            _ = tokio::time::sleep(pause) => {}
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Poll until `condition.jsonpath` selects `condition.value`.
///
/// Missing objects count as not yet ready. Returns the matching object.
pub async fn wait_for_condition(
    client: &dyn DynamicClient,
    target: &ObjectRef,
    condition: &WaitCondition,
    cancel: &CancellationToken,
) -> Result<Value, WaitError> {
    let path = JsonPath::parse(&condition.jsonpath)?;
    let path = &path;
    let description = format!("{target} to have {}={}", condition.jsonpath, condition.value);
    let expected = condition.value.as_str();

    poll_until(&description, condition.poll, cancel, move || async move {
        match client.get(target).await {
            Ok(object) if path.matches(&object, expected) => Ok(Some(object)),
            Ok(_) => Ok(None),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await
}

/// Poll until the object is gone
pub async fn wait_for_deletion(
    client: &dyn DynamicClient,
    target: &ObjectRef,
    config: PollConfig,
    cancel: &CancellationToken,
) -> Result<(), WaitError> {
    let description = format!("{target} to be deleted");

    poll_until(&description, config, cancel, move || async move {
        match client.get(target).await {
            Ok(_) => Ok(None),
            Err(e) if e.is_not_found() => Ok(Some(())),
            Err(e) => Err(e),
        }
    })
    .await
}
