use crate::error::NetworkError;
use crate::traits::{TaskOutcome, TerminalReason};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(2500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts,
            delay: Duration::from_millis(delay_ms),
        }
    }
}

/// Attempt bookkeeping for a single `with_retry` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    max_attempts: u32,
}

impl RetryState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts,
        }
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Records a retryable failure. Returns `false` once the budget is spent.
    pub fn record_failure(&mut self) -> bool {
        self.attempt = (self.attempt + 1).min(self.max_attempts);
        self.attempt < self.max_attempts
    }
}

/// What one attempt produced, as seen by the retry loop.
#[derive(Debug)]
pub enum Attempt<T> {
    Done(T),
    Stop(TerminalReason),
    Retry(NetworkError),
}

/// Drives `operation` until it succeeds, hits a terminal condition, or the
/// policy's attempt budget is spent. `operation` receives the 1-based
/// attempt number.
///
/// No call is made after a terminal result or after the last attempt, and
/// there is no pause after the final failure.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> TaskOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let mut state = RetryState::new(policy.max_attempts.max(1));

    loop {
        match operation(state.attempt() + 1).await {
            Attempt::Done(value) => {
                if state.attempt() > 0 {
                    debug!(
                        "{} succeeded on attempt {}",
                        operation_name,
                        state.attempt() + 1
                    );
                }
                return TaskOutcome::Success(value);
            }
            Attempt::Stop(reason) => {
                match &reason {
                    TerminalReason::Authentication { status } => {
                        error!(
                            target: "task_result",
                            "Error encountered during {}: Authentication Error: {} | Please check your token or credentials.",
                            operation_name,
                            status
                        );
                    }
                    TerminalReason::AlreadySatisfied { message } => {
                        info!(target: "task_result", "{}", message);
                    }
                }
                return TaskOutcome::TerminalFailure(reason);
            }
            Attempt::Retry(e) => {
                warn!(
                    target: "task_result",
                    "Error encountered during {}: {}",
                    operation_name,
                    e
                );

                if !state.record_failure() {
                    error!(
                        target: "task_result",
                        "{}: Max retries reached. Giving up :(",
                        operation_name
                    );
                    return TaskOutcome::ExhaustedRetries {
                        attempts: state.attempt(),
                    };
                }

                warn!(
                    target: "task_result",
                    "Wait {:.1} seconds before retrying... (Retry #{})",
                    policy.delay.as_secs_f64(),
                    state.attempt()
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_state_never_exceeds_budget() {
        let mut state = RetryState::new(2);
        assert!(state.record_failure());
        assert!(!state.record_failure());
        assert!(!state.record_failure());
        assert_eq!(state.attempt(), 2);
    }

    #[test]
    fn default_policy_is_five_attempts_two_and_a_half_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay, Duration::from_millis(2500));
    }
}
