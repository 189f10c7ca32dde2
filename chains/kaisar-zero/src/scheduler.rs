use crate::accounts::Account;
use crate::pipeline::{AccountTaskPipeline, PipelineReport};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Totals for one pass over every account.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub session: u64,
    pub accounts: usize,
    pub tasks: PipelineReport,
}

impl SessionReport {
    fn absorb(&mut self, report: &PipelineReport) {
        self.accounts += 1;
        self.tasks.attempted += report.attempted;
        self.tasks.succeeded += report.succeeded;
        self.tasks.already_done += report.already_done;
        self.tasks.failed += report.failed;
    }
}

/// Repeats the pipeline over all accounts, sleeping a fixed interval
/// between passes.
///
/// Accounts run one after another in list order; nothing overlaps. The
/// sleep is always the full interval, however long the pass took.
pub struct SessionScheduler {
    accounts: Vec<Account>,
    pipeline: AccountTaskPipeline,
    interval: Duration,
    session: u64,
}

impl SessionScheduler {
    pub fn new(accounts: Vec<Account>, pipeline: AccountTaskPipeline, interval: Duration) -> Self {
        Self {
            accounts,
            pipeline,
            interval,
            session: 1,
        }
    }

    /// Index of the session that runs next (or is running).
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Runs until `shutdown` is cancelled. Cancellation drops whatever call
    /// or wait is in flight.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        let stopped = tokio::select! {
            _ = shutdown.cancelled() => true,
            _ = self.run_forever() => false,
        };
        if stopped {
            info!(target: "task_result", "Stopped during session {}", self.session);
        }
    }

    async fn run_forever(&mut self) {
        loop {
            self.cycle().await;
        }
    }

    /// Drives exactly `count` session-plus-sleep cycles.
    pub async fn run_sessions(&mut self, count: usize) -> Vec<SessionReport> {
        let mut reports = Vec::with_capacity(count);
        for _ in 0..count {
            reports.push(self.cycle().await);
        }
        reports
    }

    async fn cycle(&mut self) -> SessionReport {
        let report = self.run_session().await;
        tokio::time::sleep(self.interval).await;
        self.session += 1;
        report
    }

    /// One pass over every account, without the trailing sleep.
    pub async fn run_session(&self) -> SessionReport {
        let equals = "=".repeat(100);
        let dash = "-".repeat(100);

        info!(target: "task_result", "{}", equals);
        info!(target: "task_result", "Starting session {}...", self.session);

        let mut report = SessionReport {
            session: self.session,
            ..Default::default()
        };

        for account in &self.accounts {
            info!(target: "task_result", "{}", dash);
            let pipeline_report = self.pipeline.run(account).await;
            report.absorb(&pipeline_report);
        }

        info!(target: "task_result", "{}", dash);
        info!(
            target: "task_result",
            "End of session {} | {} accounts | {} tasks ok, {} already done, {} failed",
            self.session,
            report.accounts,
            report.tasks.succeeded,
            report.tasks.already_done,
            report.tasks.failed
        );
        info!(
            target: "task_result",
            "Wait {} for the next session {} | Stop code execution \"Ctrl+C\"",
            describe_interval(self.interval),
            self.session + 1
        );
        info!(target: "task_result", "{}", equals);

        report
    }
}

fn describe_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    match secs {
        3600 => "1 hour".to_string(),
        s if s % 3600 == 0 => format!("{} hours", s / 3600),
        s if s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{} seconds", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_intervals() {
        assert_eq!(describe_interval(Duration::from_secs(3600)), "1 hour");
        assert_eq!(describe_interval(Duration::from_secs(7200)), "2 hours");
        assert_eq!(describe_interval(Duration::from_secs(300)), "5 minutes");
        assert_eq!(describe_interval(Duration::from_secs(45)), "45 seconds");
    }
}
