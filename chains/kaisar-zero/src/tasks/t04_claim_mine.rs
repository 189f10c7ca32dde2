use crate::client::{response_data, PreconditionRule, RequestSpec};
use crate::tasks::{display_value, Task, TaskContext, TaskOutcome};
use anyhow::anyhow;
use async_trait::async_trait;

/// Claims the reward of the last mining window.
pub struct ClaimMineTask;

#[async_trait]
impl Task<TaskContext> for ClaimMineTask {
    async fn run(&self, ctx: &TaskContext) -> TaskOutcome {
        let spec = RequestSpec::post("/mining/claim", &ctx.account.node_token)
            .with_json(ctx.extension_payload());
        let rule = PreconditionRule::already_satisfied("Mining process is currently running...");

        ctx.invoker
            .invoke(self.name(), &spec, &rule, |body| {
                let claim = response_data(body)?
                    .get("claim")
                    .ok_or_else(|| anyhow!("claim missing from response"))?;
                Ok(Some(format!("Points Claimed: {}", display_value(claim))))
            })
            .await
    }

    fn name(&self) -> &str {
        "04_claimMine"
    }

    fn label(&self) -> &str {
        "Claiming mining rewards"
    }
}
