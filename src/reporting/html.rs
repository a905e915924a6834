//! # HTML Reporting Module / HTML 报告模块
//!
//! This module renders a standalone HTML report of a run with `maud`:
//! summary counters, a results table, and the recorded output of each
//! target in a collapsible block.
//!
//! 此模块使用 `maud` 渲染一次运行的独立 HTML 报告：
//! 汇总计数、结果表格，以及每个目标在可折叠区域中的记录输出。

use anyhow::Result;
use chrono::Local;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::path::Path;

use crate::core::models::RunSummary;
use crate::infra::{fs::write_report, t};

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 2rem; color: #24292f; }
h1 { margin-bottom: 0.25rem; }
.generated { color: #57606a; margin-top: 0; }
.summary-container { display: flex; gap: 1rem; margin: 1.5rem 0; }
.summary-item { border: 1px solid #d0d7de; border-radius: 6px; padding: 0.75rem 1.25rem; text-align: center; }
.summary-item .count { display: block; font-size: 1.75rem; font-weight: 600; }
.summary-item .label { color: #57606a; }
.passed-text { color: #1a7f37; }
.failed-text { color: #cf222e; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #d0d7de; padding: 0.5rem; text-align: left; vertical-align: top; }
.duration-cell { text-align: right; white-space: nowrap; }
.status-cell { display: inline-block; border-radius: 4px; padding: 0.1rem 0.5rem; color: #fff; }
.status-passed { background: #1a7f37; }
.status-failed { background: #cf222e; }
.status-timeout { background: #bc4c00; }
.status-not-found, .status-interrupted { background: #6e7781; }
pre.output-content { background: #f6f8fa; padding: 0.75rem; overflow-x: auto; white-space: pre-wrap; }
"#;

/// Renders the report markup.
///
/// # Arguments / 参数
/// * `summary` - The finished run / 已完成的运行
/// * `locale` - The locale to use for internationalization / 用于国际化的语言环境
pub fn render_html_report(summary: &RunSummary, locale: &str) -> Markup {
    let title = t!("html_report.title", locale = locale).to_string();
    let generated = t!(
        "html_report.generated_at",
        locale = locale,
        time = Local::now().format("%Y-%m-%d %H:%M:%S")
    )
    .to_string();
    let mode = if summary.headless {
        t!("html_report.mode_headless", locale = locale).to_string()
    } else {
        t!("html_report.mode_interactive", locale = locale).to_string()
    };

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (title) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (title) }
                p."generated" { (generated) " · " (mode) }

                div."summary-container" {
                    div."summary-item" {
                        span."count" { (summary.total) }
                        span."label" { (t!("html_report.summary.total", locale = locale).to_string()) }
                    }
                    div."summary-item" {
                        span."count"."passed-text" { (summary.successful) }
                        span."label" { (t!("html_report.summary.passed", locale = locale).to_string()) }
                    }
                    div."summary-item" {
                        span."count"."failed-text" { (summary.failed()) }
                        span."label" { (t!("html_report.summary.failed", locale = locale).to_string()) }
                    }
                }

                table {
                    thead {
                        tr {
                            th { (t!("html_report.table.name", locale = locale).to_string()) }
                            th { (t!("html_report.table.status", locale = locale).to_string()) }
                            th."duration-cell" { (t!("html_report.table.duration", locale = locale).to_string()) }
                            th { (t!("html_report.table.output", locale = locale).to_string()) }
                        }
                    }
                    tbody {
                        @for result in &summary.results {
                            tr {
                                td { (result.target_name()) }
                                td {
                                    div class=(format!("status-cell {}", result.status_class())) {
                                        (result.status_str(locale))
                                    }
                                    @if let Some(reason) = result.reason() {
                                        div { small { (reason.label(locale)) } }
                                    }
                                }
                                td."duration-cell" { (format!("{:.2}s", result.duration().as_secs_f64())) }
                                td {
                                    @if let Some(output) = result.output().filter(|o| !o.trim().is_empty()) {
                                        details {
                                            summary { (t!("html_report.toggle_output", locale = locale).to_string()) }
                                            pre."output-content" { (output) }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Generates the HTML report and writes it to `output_path`.
///
/// # Errors / 错误
/// Returns an error if the file or its parent directories cannot be written.
/// 如果无法写入文件或其父目录，则返回错误。
pub fn generate_html_report(summary: &RunSummary, output_path: &Path, locale: &str) -> Result<()> {
    let markup = render_html_report(summary, locale);
    write_report(output_path, &markup.into_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{ExecutionResult, FailureReason, Target};
    use std::time::Duration;

    #[test]
    fn report_lists_results_and_escapes_output() {
        let mut summary = RunSummary::new(true);
        summary.record(ExecutionResult::succeeded(
            Target::new("ok.sh"),
            Some("<b>plot saved</b>".to_string()),
            Duration::from_millis(1500),
        ));
        summary.record(ExecutionResult::failed(
            Target::new("slow.sh"),
            FailureReason::Timeout,
            Some("Timeout".to_string()),
            Duration::from_secs(1),
        ));

        let html = render_html_report(&summary, "en").into_string();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("ok.sh"));
        assert!(html.contains("slow.sh"));
        assert!(html.contains("status-timeout"));
        assert!(html.contains("1.50s"));
        assert!(html.contains("&lt;b&gt;plot saved&lt;/b&gt;"));
        assert!(!html.contains("<b>plot saved</b>"));
    }
}
