use crate::client::{PreconditionRule, RequestSpec};
use crate::tasks::{Task, TaskContext, TaskOutcome};
use async_trait::async_trait;

pub struct DailyCheckInTask;

#[async_trait]
impl Task<TaskContext> for DailyCheckInTask {
    async fn run(&self, ctx: &TaskContext) -> TaskOutcome {
        let spec = RequestSpec::post("/checkin/check", &ctx.account.user_token);
        let rule = PreconditionRule::already_satisfied("Today Check-in is already done.");

        ctx.invoker
            .invoke(self.name(), &spec, &rule, |_| Ok(None))
            .await
    }

    fn name(&self) -> &str {
        "02_dailyCheckIn"
    }

    fn label(&self) -> &str {
        "Daily check-in"
    }
}
