use crate::client::{PreconditionRule, RequestSpec};
use crate::tasks::{Task, TaskContext, TaskOutcome};
use async_trait::async_trait;

/// Liveness signal for the node extension.
///
/// Unlike check-in and claim, a 412 here has no "already done" meaning and
/// is retried like any other server error.
pub struct PingTask;

#[async_trait]
impl Task<TaskContext> for PingTask {
    async fn run(&self, ctx: &TaskContext) -> TaskOutcome {
        let spec = RequestSpec::post("/extension/ping", &ctx.account.node_token)
            .with_json(ctx.extension_payload());

        ctx.invoker
            .invoke(self.name(), &spec, &PreconditionRule::Retry, |_| Ok(None))
            .await
    }

    fn name(&self) -> &str {
        "01_ping"
    }

    fn label(&self) -> &str {
        "Send ping"
    }
}
