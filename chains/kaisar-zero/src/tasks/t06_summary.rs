use crate::client::{response_data, PreconditionRule, RequestSpec};
use crate::tasks::{display_value, Task, TaskContext, TaskOutcome};
use crate::utils::{format_in_zone, parse_timestamp, zone_abbreviation};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono_tz::Tz;
use serde_json::Value;
use std::fmt;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointSummary {
    pub total: String,
    pub today: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSummary {
    pub ip: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryHalf {
    Points,
    Node,
}

impl fmt::Display for SummaryHalf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryHalf::Points => f.write_str("Point summary data"),
            SummaryHalf::Node => f.write_str("Node summary data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryFailure {
    pub half: SummaryHalf,
    pub outcome: TaskOutcome<()>,
}

/// Reads `{data: {total, today}}`.
pub fn parse_points(body: &Value) -> Result<PointSummary> {
    let data = response_data(body)?;
    let field = |name: &str| {
        data.get(name)
            .filter(|v| !v.is_null())
            .map(display_value)
            .ok_or_else(|| anyhow!("{} missing from point summary", name))
    };
    Ok(PointSummary {
        total: field("total")?,
        today: field("today")?,
    })
}

/// Reads `{data: {ip, start, end}}`, rendering both window bounds in `zone`.
pub fn parse_node(body: &Value, zone: Tz) -> Result<NodeSummary> {
    let data = response_data(body)?;
    let ip = data
        .get("ip")
        .filter(|v| !v.is_null())
        .map(display_value)
        .ok_or_else(|| anyhow!("ip missing from node summary"))?;
    let render = |name: &str| -> Result<String> {
        let value = data
            .get(name)
            .ok_or_else(|| anyhow!("{} missing from node summary", name))?;
        let ts = parse_timestamp(value)?;
        Ok(format!(
            "{} {}",
            format_in_zone(ts, zone),
            zone_abbreviation(ts, zone)
        ))
    };
    Ok(NodeSummary {
        ip,
        start: render("start")?,
        end: render("end")?,
    })
}

/// Account points plus the current mining window.
///
/// Both halves must succeed before anything is printed, so a failed node
/// fetch never shows partial node fields.
pub struct SummaryTask;

impl SummaryTask {
    pub async fn collect(
        &self,
        ctx: &TaskContext,
    ) -> Result<(PointSummary, NodeSummary), SummaryFailure> {
        let points_spec = RequestSpec::get("/user/summary", &ctx.account.user_token);
        let points = match ctx
            .invoker
            .invoke("pointSummary", &points_spec, &PreconditionRule::Retry, parse_points)
            .await
        {
            TaskOutcome::Success(points) => points,
            other => {
                return Err(SummaryFailure {
                    half: SummaryHalf::Points,
                    outcome: other.map(|_| ()),
                })
            }
        };

        let node_spec = RequestSpec::get("/mining/current", &ctx.account.node_token)
            .with_query("extension", &ctx.account.node_id);
        let zone = ctx.timezone;
        let node = match ctx
            .invoker
            .invoke("nodeSummary", &node_spec, &PreconditionRule::Retry, |body| {
                parse_node(body, zone)
            })
            .await
        {
            TaskOutcome::Success(node) => node,
            other => {
                return Err(SummaryFailure {
                    half: SummaryHalf::Node,
                    outcome: other.map(|_| ()),
                })
            }
        };

        Ok((points, node))
    }
}

#[async_trait]
impl Task<TaskContext> for SummaryTask {
    async fn run(&self, ctx: &TaskContext) -> TaskOutcome {
        match self.collect(ctx).await {
            Ok((points, node)) => {
                info!(target: "task_result", "Total: {}", points.total);
                info!(target: "task_result", "Today: {}", points.today);
                info!(target: "task_result", "Start: {}", node.start);
                info!(target: "task_result", "End: {}", node.end);
                info!(target: "task_result", "IP: {}", node.ip);
                TaskOutcome::Success(None)
            }
            Err(failure) => {
                error!(target: "task_result", "Error: {}.", failure.half);
                failure.outcome.map(|_| None)
            }
        }
    }

    fn name(&self) -> &str {
        "06_summary"
    }

    fn label(&self) -> &str {
        "Node summary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_point_summary() {
        let points = parse_points(&json!({"data": {"total": 1520.5, "today": 12}})).unwrap();
        assert_eq!(points.total, "1520.5");
        assert_eq!(points.today, "12");
    }

    #[test]
    fn point_summary_requires_both_fields() {
        assert!(parse_points(&json!({"data": {"total": 1}})).is_err());
        assert!(parse_points(&json!({"data": {"total": null, "today": 1}})).is_err());
    }

    #[test]
    fn parses_node_summary_in_display_zone() {
        let node = parse_node(
            &json!({"data": {"ip": "1.2.3.4", "start": 1_700_000_000_000i64, "end": "2023-11-15T22:13:20Z"}}),
            chrono_tz::Asia::Jakarta,
        )
        .unwrap();
        assert_eq!(node.ip, "1.2.3.4");
        assert_eq!(node.start, "15/11/2023 05:13:20 WIB");
        assert_eq!(node.end, "16/11/2023 05:13:20 WIB");
    }

    #[test]
    fn node_summary_rejects_bad_timestamps() {
        let body = json!({"data": {"ip": "1.2.3.4", "start": "soon", "end": 0}});
        assert!(parse_node(&body, chrono_tz::UTC).is_err());
    }
}
