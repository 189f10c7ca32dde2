use crate::accounts::Account;
use crate::client::ResilientHttpInvoker;
use crate::tasks::{default_tasks, KaisarTask, TaskContext, TaskOutcome};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Per-account tally of one pipeline run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub already_done: usize,
    pub failed: usize,
}

impl PipelineReport {
    fn record(&mut self, outcome: &TaskOutcome) {
        self.attempted += 1;
        match outcome {
            TaskOutcome::Success(_) => self.succeeded += 1,
            o if o.is_error() => self.failed += 1,
            _ => self.already_done += 1,
        }
    }
}

/// Runs every task, in order, for one account.
///
/// A task's outcome never affects whether the next one runs.
pub struct AccountTaskPipeline {
    tasks: Vec<Box<KaisarTask>>,
    invoker: Arc<ResilientHttpInvoker>,
    timezone: Tz,
}

impl AccountTaskPipeline {
    pub fn new(invoker: Arc<ResilientHttpInvoker>, timezone: Tz) -> Self {
        Self::with_tasks(default_tasks(), invoker, timezone)
    }

    pub fn with_tasks(
        tasks: Vec<Box<KaisarTask>>,
        invoker: Arc<ResilientHttpInvoker>,
        timezone: Tz,
    ) -> Self {
        Self {
            tasks,
            invoker,
            timezone,
        }
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    pub async fn run(&self, account: &Account) -> PipelineReport {
        info!(target: "task_result", "Running for email: {}", account.email);

        let ctx = TaskContext::new(account.clone(), self.invoker.clone(), self.timezone);
        let mut report = PipelineReport::default();

        for task in &self.tasks {
            info!(target: "task_result", "{}...", task.label());
            let start = Instant::now();
            let outcome = task.run(&ctx).await;
            let duration = start.elapsed();

            match &outcome {
                TaskOutcome::Success(Some(message)) => info!(
                    target: "task_result",
                    "Success | {} | {:.2}s | {}",
                    task.name(),
                    duration.as_secs_f64(),
                    message
                ),
                TaskOutcome::Success(None) => info!(
                    target: "task_result",
                    "Success | {} | {:.2}s",
                    task.name(),
                    duration.as_secs_f64()
                ),
                TaskOutcome::TerminalFailure(reason) if !reason.is_error() => info!(
                    target: "task_result",
                    "Skipped | {} | {}",
                    task.name(),
                    reason
                ),
                TaskOutcome::TerminalFailure(reason) => warn!(
                    target: "task_result",
                    "Failed | {} | {}",
                    task.name(),
                    reason
                ),
                TaskOutcome::ExhaustedRetries { attempts } => warn!(
                    target: "task_result",
                    "Failed | {} | gave up after {} attempts",
                    task.name(),
                    attempts
                ),
            }

            report.record(&outcome);
        }

        report
    }
}
