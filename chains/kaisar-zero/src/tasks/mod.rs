//! Tasks Module - the per-account operations run each session
//!
//! Each task is a thin configuration over [`ResilientHttpInvoker`]: an
//! endpoint, a payload, which bearer token to send, how to read HTTP 412,
//! and what a usable success body looks like.
//!
//! [`default_tasks`] returns them in pipeline order:
//!
//! 1. ping
//! 2. daily check-in
//! 3. mission fetch-and-claim
//! 4. claim mining reward
//! 5. start mining
//! 6. point/node summary

use crate::accounts::Account;
use crate::client::ResilientHttpInvoker;
use chrono_tz::Tz;
use serde_json::Value;
use std::sync::Arc;

pub mod t01_ping;
pub mod t02_daily_checkin;
pub mod t03_missions;
pub mod t04_claim_mine;
pub mod t05_start_mine;
pub mod t06_summary;

pub use self::t01_ping::PingTask;
pub use self::t02_daily_checkin::DailyCheckInTask;
pub use self::t03_missions::MissionTask;
pub use self::t04_claim_mine::ClaimMineTask;
pub use self::t05_start_mine::StartMineTask;
pub use self::t06_summary::SummaryTask;

pub use core_logic::traits::{Task, TaskOutcome};

/// Everything a task needs for one account.
#[derive(Clone)]
pub struct TaskContext {
    pub account: Account,
    pub invoker: Arc<ResilientHttpInvoker>,
    /// Zone used when displaying mining-window timestamps
    pub timezone: Tz,
}

impl TaskContext {
    pub fn new(account: Account, invoker: Arc<ResilientHttpInvoker>, timezone: Tz) -> Self {
        Self {
            account,
            invoker,
            timezone,
        }
    }

    /// `{extension: nodeId}` body shared by the node endpoints.
    pub fn extension_payload(&self) -> Value {
        serde_json::json!({ "extension": self.account.node_id })
    }
}

// Trait alias
pub type KaisarTask = dyn Task<TaskContext> + Send + Sync;

/// The six tasks in the order every account runs them.
pub fn default_tasks() -> Vec<Box<KaisarTask>> {
    vec![
        Box::new(PingTask),
        Box::new(DailyCheckInTask),
        Box::new(MissionTask),
        Box::new(ClaimMineTask),
        Box::new(StartMineTask),
        Box::new(SummaryTask),
    ]
}

/// Renders a JSON scalar without quotes around strings.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
