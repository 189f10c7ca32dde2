use crate::client::{response_data, PreconditionRule, RequestSpec};
use crate::tasks::{display_value, Task, TaskContext, TaskOutcome};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

/// Mission status the API uses for "completed, reward not yet claimed".
pub const CLAIMABLE_STATUS: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mission {
    pub id: String,
    pub name: String,
    pub status: i64,
}

impl Mission {
    pub fn is_claimable(&self) -> bool {
        self.status == CLAIMABLE_STATUS
    }
}

/// Reads `{data: [{_id, name?, status}]}`.
pub fn parse_missions(body: &Value) -> Result<Vec<Mission>> {
    let entries = response_data(body)?
        .as_array()
        .ok_or_else(|| anyhow!("mission list is not an array"))?;

    entries
        .iter()
        .map(|entry| {
            let id = entry
                .get("_id")
                .map(display_value)
                .ok_or_else(|| anyhow!("mission without _id"))?;
            let status = entry
                .get("status")
                .and_then(Value::as_i64)
                .ok_or_else(|| anyhow!("mission {} without numeric status", id))?;
            let name = entry
                .get("name")
                .or_else(|| entry.get("title"))
                .map(display_value)
                .unwrap_or_else(|| id.clone());
            Ok(Mission { id, name, status })
        })
        .collect()
}

/// Orders failed claim outcomes; the highest one stands for the task.
fn failure_rank(outcome: &TaskOutcome<()>) -> u8 {
    match outcome {
        TaskOutcome::Success(_) => 0,
        TaskOutcome::TerminalFailure(reason) if !reason.is_error() => 1,
        TaskOutcome::ExhaustedRetries { .. } => 2,
        TaskOutcome::TerminalFailure(_) => 3,
    }
}

/// Lists missions and claims every one that is ready.
///
/// Each claim is its own resilient call; a failed claim does not stop the
/// rest.
pub struct MissionTask;

#[async_trait]
impl Task<TaskContext> for MissionTask {
    async fn run(&self, ctx: &TaskContext) -> TaskOutcome {
        let token = &ctx.account.user_token;
        let listing = RequestSpec::get("/mission/tasks", token);

        let missions = match ctx
            .invoker
            .invoke(self.name(), &listing, &PreconditionRule::Retry, parse_missions)
            .await
        {
            TaskOutcome::Success(missions) => missions,
            other => return other.map(|_| None),
        };

        let claimable: Vec<&Mission> = missions.iter().filter(|m| m.is_claimable()).collect();
        if claimable.is_empty() {
            return TaskOutcome::Success(Some(format!(
                "No missions to claim ({} listed)",
                missions.len()
            )));
        }

        let mut claimed = 0;
        let mut worst: Option<TaskOutcome<()>> = None;
        for mission in &claimable {
            info!(target: "task_result", "Claiming mission: {}", mission.name);
            let spec = RequestSpec::post(format!("/mission/tasks/{}/claim", mission.id), token);
            let rule = PreconditionRule::already_satisfied(format!(
                "Mission {} is already claimed.",
                mission.name
            ));

            let label = format!("{} ({})", self.name(), mission.name);
            let outcome = ctx.invoker.invoke(&label, &spec, &rule, |_| Ok(())).await;
            if outcome.is_success() {
                claimed += 1;
            } else if worst
                .as_ref()
                .map_or(true, |w| failure_rank(&outcome) > failure_rank(w))
            {
                worst = Some(outcome);
            }
        }

        // Nothing claimed: report why instead of an empty success
        match worst {
            Some(outcome) if claimed == 0 => outcome.map(|_| None),
            _ => TaskOutcome::Success(Some(format!(
                "Claimed {}/{} missions",
                claimed,
                claimable.len()
            ))),
        }
    }

    fn name(&self) -> &str {
        "03_missions"
    }

    fn label(&self) -> &str {
        "Fetching missions"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_logic::TerminalReason;
    use serde_json::json;

    #[test]
    fn parses_mission_list() {
        let body = json!({"data": [
            {"_id": "m1", "name": "Follow on X", "status": 1},
            {"_id": "m2", "status": 0},
            {"_id": 7, "title": "Join Discord", "status": 2}
        ]});

        let missions = parse_missions(&body).unwrap();
        assert_eq!(missions.len(), 3);
        assert!(missions[0].is_claimable());
        assert_eq!(missions[1].name, "m2");
        assert!(!missions[1].is_claimable());
        assert_eq!(missions[2].id, "7");
        assert_eq!(missions[2].name, "Join Discord");
    }

    #[test]
    fn rejects_malformed_listing() {
        assert!(parse_missions(&json!({"data": {"not": "a list"}})).is_err());
        assert!(parse_missions(&json!({"data": [{"status": 1}]})).is_err());
        assert!(parse_missions(&json!({"data": [{"_id": "x"}]})).is_err());
        assert!(parse_missions(&Value::Null).is_err());
    }

    #[test]
    fn authentication_outranks_other_failures() {
        let auth = TaskOutcome::TerminalFailure(TerminalReason::Authentication { status: 401 });
        let done = TaskOutcome::TerminalFailure(TerminalReason::AlreadySatisfied {
            message: "claimed".to_string(),
        });
        let exhausted = TaskOutcome::ExhaustedRetries { attempts: 5 };
        assert!(failure_rank(&auth) > failure_rank(&exhausted));
        assert!(failure_rank(&exhausted) > failure_rank(&done));
    }

    #[test]
    fn empty_listing_is_valid() {
        assert!(parse_missions(&json!({"data": []})).unwrap().is_empty());
    }
}
