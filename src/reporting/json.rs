//! # JSON Reporting Module / JSON 报告模块
//!
//! Machine-readable export of a run, for CI pipelines that want more than
//! the exit code.
//!
//! 运行结果的机器可读导出，供需要比退出码更多信息的 CI 流水线使用。

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::Path;

use crate::core::models::{ExecutionResult, RunSummary};
use crate::infra::fs::write_report;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Local>,
    total: usize,
    successful: usize,
    all_succeeded: bool,
    headless: bool,
    results: Vec<JsonResult<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonResult<'a> {
    name: &'a str,
    path: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
    duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a str>,
}

impl<'a> From<&'a ExecutionResult> for JsonResult<'a> {
    fn from(result: &'a ExecutionResult) -> Self {
        let reason = result.reason();
        Self {
            name: result.target_name(),
            path: result.target().path.display().to_string(),
            success: result.is_success(),
            reason: reason.map(|r| r.kind()),
            exit_code: reason.and_then(|r| r.exit_code()),
            duration_secs: result.duration().as_secs_f64(),
            output: result.output(),
        }
    }
}

/// Serializes `summary` as pretty-printed JSON.
pub fn render_json_report(summary: &RunSummary) -> Result<String> {
    let report = JsonReport {
        generated_at: Local::now(),
        total: summary.total,
        successful: summary.successful,
        all_succeeded: summary.all_succeeded(),
        headless: summary.headless,
        results: summary.results.iter().map(JsonResult::from).collect(),
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize JSON report")
}

/// Writes the JSON report to `output_path`.
pub fn write_json_report(summary: &RunSummary, output_path: &Path) -> Result<()> {
    let json = render_json_report(summary)?;
    write_report(output_path, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{FailureReason, Target};
    use std::time::Duration;

    #[test]
    fn report_carries_counts_and_reasons() {
        let mut summary = RunSummary::new(false);
        summary.record(ExecutionResult::succeeded(
            Target::new("a.sh"),
            Some("hello\n".to_string()),
            Duration::from_millis(250),
        ));
        summary.record(ExecutionResult::failed(
            Target::new("b.sh"),
            FailureReason::NonZeroExit(Some(2)),
            None,
            Duration::from_millis(10),
        ));

        let json = render_json_report(&summary).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["total"], 2);
        assert_eq!(value["successful"], 1);
        assert_eq!(value["all_succeeded"], false);
        assert_eq!(value["results"][0]["output"], "hello\n");
        assert!(value["results"][0].get("reason").is_none());
        assert_eq!(value["results"][1]["reason"], "non_zero_exit");
        assert_eq!(value["results"][1]["exit_code"], 2);
        assert!(value["generated_at"].is_string());
    }
}
