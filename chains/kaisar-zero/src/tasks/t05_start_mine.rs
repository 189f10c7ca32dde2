use crate::client::{PreconditionRule, RequestSpec};
use crate::tasks::{Task, TaskContext, TaskOutcome};
use async_trait::async_trait;

pub struct StartMineTask;

#[async_trait]
impl Task<TaskContext> for StartMineTask {
    async fn run(&self, ctx: &TaskContext) -> TaskOutcome {
        let spec = RequestSpec::post("/mining/start", &ctx.account.node_token)
            .with_json(ctx.extension_payload());
        let rule = PreconditionRule::already_satisfied("Mining is already running.");

        ctx.invoker
            .invoke(self.name(), &spec, &rule, |_| {
                Ok(Some("Mining process started".to_string()))
            })
            .await
    }

    fn name(&self) -> &str {
        "05_startMine"
    }

    fn label(&self) -> &str {
        "Starting mining process"
    }
}
