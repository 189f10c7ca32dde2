use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

/// Why an invocation stopped before its retry budget ran out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalReason {
    /// 401/403. Credentials are wrong; retrying cannot help.
    Authentication { status: u16 },
    /// The remote side already reflects the desired state (e.g. checked in).
    AlreadySatisfied { message: String },
}

impl TerminalReason {
    /// `AlreadySatisfied` is reported but not counted as an error.
    pub fn is_error(&self) -> bool {
        matches!(self, TerminalReason::Authentication { .. })
    }
}

impl fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalReason::Authentication { status } => {
                write!(f, "Authentication Error: {}", status)
            }
            TerminalReason::AlreadySatisfied { message } => f.write_str(message),
        }
    }
}

/// Result of one task (or one resilient call).
///
/// Created per invocation, consumed immediately for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<T = Option<String>> {
    Success(T),
    TerminalFailure(TerminalReason),
    ExhaustedRetries { attempts: u32 },
}

impl<T> TaskOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }

    /// Anything other than success or an "already done" terminal.
    pub fn is_error(&self) -> bool {
        match self {
            TaskOutcome::Success(_) => false,
            TaskOutcome::TerminalFailure(reason) => reason.is_error(),
            TaskOutcome::ExhaustedRetries { .. } => true,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> TaskOutcome<U> {
        match self {
            TaskOutcome::Success(value) => TaskOutcome::Success(f(value)),
            TaskOutcome::TerminalFailure(reason) => TaskOutcome::TerminalFailure(reason),
            TaskOutcome::ExhaustedRetries { attempts } => {
                TaskOutcome::ExhaustedRetries { attempts }
            }
        }
    }

    pub fn success(self) -> Option<T> {
        match self {
            TaskOutcome::Success(value) => Some(value),
            _ => None,
        }
    }
}

#[async_trait]
pub trait Task<Ctx>: Send + Sync {
    /// Returns the name of the task
    fn name(&self) -> &str;

    /// Human-readable progress label; defaults to the name.
    fn label(&self) -> &str {
        self.name()
    }

    /// Executes the task. Failures are reported through the outcome,
    /// never as a panic or an early return of the caller.
    async fn run(&self, ctx: &Ctx) -> TaskOutcome;
}

#[async_trait]
pub trait AccountLoader: Send + Sync {
    type Account;

    /// Load the ordered account list (read once at startup).
    async fn load_accounts(&self) -> Result<Vec<Self::Account>>;
}
