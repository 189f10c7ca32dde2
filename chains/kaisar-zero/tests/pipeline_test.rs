use async_trait::async_trait;
use core_logic::{RetryPolicy, StaticProxy, Task, TaskOutcome, TerminalReason};
use kaisar_zero::tasks::MissionTask;
use kaisar_zero::{
    Account, AccountTaskPipeline, KaisarTask, PipelineReport, ResilientHttpInvoker, TaskContext,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn invoker(base_url: &str) -> Arc<ResilientHttpInvoker> {
    Arc::new(ResilientHttpInvoker::new(
        base_url,
        RetryPolicy::new(5, 10),
        Arc::new(StaticProxy(None)),
    ))
}

fn account() -> Account {
    Account::new("miner@example.com", "user-token", "node-1", "node-token")
}

struct ScriptedTask {
    name: &'static str,
    outcome: TaskOutcome,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Task<TaskContext> for ScriptedTask {
    async fn run(&self, ctx: &TaskContext) -> TaskOutcome {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.name, ctx.account.email));
        self.outcome.clone()
    }

    fn name(&self) -> &str {
        self.name
    }
}

#[tokio::test]
async fn test_failures_never_skip_later_tasks() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let scripted = |name, outcome| -> Box<KaisarTask> {
        Box::new(ScriptedTask {
            name,
            outcome,
            log: log.clone(),
        })
    };
    let tasks = vec![
        scripted("01_ping", TaskOutcome::ExhaustedRetries { attempts: 5 }),
        scripted(
            "02_dailyCheckIn",
            TaskOutcome::TerminalFailure(TerminalReason::Authentication { status: 401 }),
        ),
        scripted("03_missions", TaskOutcome::Success(None)),
        scripted(
            "04_claimMine",
            TaskOutcome::TerminalFailure(TerminalReason::AlreadySatisfied {
                message: "running".to_string(),
            }),
        ),
        scripted("05_startMine", TaskOutcome::ExhaustedRetries { attempts: 5 }),
        scripted("06_summary", TaskOutcome::Success(Some("ok".to_string()))),
    ];

    let pipeline =
        AccountTaskPipeline::with_tasks(tasks, invoker("http://127.0.0.1:1"), chrono_tz::UTC);
    let report = pipeline.run(&account()).await;

    assert_eq!(
        report,
        PipelineReport {
            attempted: 6,
            succeeded: 2,
            already_done: 1,
            failed: 3,
        }
    );
    let names: Vec<String> = log.lock().unwrap().clone();
    assert_eq!(
        names,
        vec![
            "01_ping:miner@example.com",
            "02_dailyCheckIn:miner@example.com",
            "03_missions:miner@example.com",
            "04_claimMine:miner@example.com",
            "05_startMine:miner@example.com",
            "06_summary:miner@example.com",
        ]
    );
}

async fn mount(server: &MockServer, verb: &str, route: &str, response: ResponseTemplate) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_default_pipeline_hits_endpoints_in_order() {
    let server = MockServer::start().await;
    let ok = |body| ResponseTemplate::new(200).set_body_json(body);

    mount(&server, "POST", "/extension/ping", ok(json!({"data": {}}))).await;
    mount(&server, "POST", "/checkin/check", ResponseTemplate::new(412)).await;
    mount(&server, "GET", "/mission/tasks", ok(json!({"data": []}))).await;
    mount(&server, "POST", "/mining/claim", ok(json!({"data": {"claim": 7}}))).await;
    mount(&server, "POST", "/mining/start", ok(json!({"data": {}}))).await;
    mount(
        &server,
        "GET",
        "/user/summary",
        ok(json!({"data": {"total": 10, "today": 1}})),
    )
    .await;
    mount(
        &server,
        "GET",
        "/mining/current",
        ok(json!({"data": {"ip": "1.1.1.1", "start": 1_700_000_000_000i64, "end": 1_700_086_400_000i64}})),
    )
    .await;

    let pipeline = AccountTaskPipeline::new(invoker(&server.uri()), chrono_tz::Asia::Jakarta);
    let report = pipeline.run(&account()).await;

    assert_eq!(
        report,
        PipelineReport {
            attempted: 6,
            succeeded: 5,
            already_done: 1,
            failed: 0,
        }
    );

    let paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(
        paths,
        vec![
            "/extension/ping",
            "/checkin/check",
            "/mission/tasks",
            "/mining/claim",
            "/mining/start",
            "/user/summary",
            "/mining/current",
        ]
    );
}

#[tokio::test]
async fn test_revoked_tokens_fail_every_task_once() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let pipeline = AccountTaskPipeline::new(invoker(&server.uri()), chrono_tz::UTC);
    let report = pipeline.run(&account()).await;

    assert_eq!(report.attempted, 6);
    assert_eq!(report.failed, 6);
    // One request per task; the summary stops after its first half
    assert_eq!(server.received_requests().await.unwrap().len(), 6);
}

#[tokio::test]
async fn test_rejected_mission_claims_count_as_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mission/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            {"_id": "m1", "status": 1},
            {"_id": "m2", "status": 1}
        ]})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let tasks: Vec<Box<KaisarTask>> = vec![Box::new(MissionTask)];
    let pipeline = AccountTaskPipeline::with_tasks(tasks, invoker(&server.uri()), chrono_tz::UTC);
    let report = pipeline.run(&account()).await;

    assert_eq!(report.attempted, 1);
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.failed, 1);
}

#[test]
fn test_task_names_follow_pipeline_order() {
    let pipeline = AccountTaskPipeline::new(invoker("http://127.0.0.1:1"), chrono_tz::UTC);
    assert_eq!(
        pipeline.task_names(),
        vec![
            "01_ping",
            "02_dailyCheckIn",
            "03_missions",
            "04_claimMine",
            "05_startMine",
            "06_summary"
        ]
    );
}
