//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints the end-of-run summary to the console: a per-target
//! status table, the `successful/total` line, and the headless mode hint.
//!
//! 此模块在控制台打印运行结束摘要：每个目标的状态表、`成功数/总数` 行以及无头模式提示。

use colored::*;

use crate::core::models::{ExecutionResult, FailureReason, RunSummary};
use crate::infra::t;

/// Prints a formatted summary of the run to the console.
///
/// 在控制台打印格式化的运行摘要。
///
/// # Arguments / 参数
/// * `summary` - The finished run / 已完成的运行
/// * `locale` - The language locale to use for messages / 用于消息的语言区域设置
///
/// # Output Format / 输出格式
/// ```text
/// === Summary ===
///   - Passed       | residues_demo.py                         |     1.23s
///   - Timeout      | universality_demo.py                     |    60.00s
/// ✅ 1/2 scripts ran successfully
/// ❌ Check errors above (e.g. missing dependencies or paths).
/// 🖼️ Plots displayed via GUI (close windows to continue).
/// ```
pub fn print_summary(summary: &RunSummary, locale: &str) {
    println!("\n{}", t!("report.summary_banner", locale = locale).bold());

    for result in &summary.results {
        println!(
            "  - {:<14} | {:<40} | {:>9}",
            colored_status(result, locale),
            result.target_name(),
            format!("{:.2}s", result.duration().as_secs_f64())
        );
    }

    let counts = t!(
        "report.success_count",
        locale = locale,
        successful = summary.successful,
        total = summary.total
    );
    if summary.all_succeeded() {
        println!("{}", counts.green().bold());
        println!("{}", t!("report.all_succeeded", locale = locale).green());
    } else {
        println!("{}", counts.yellow().bold());
        println!("{}", t!("report.check_errors", locale = locale).red());
    }

    if summary.headless {
        println!("{}", t!("report.mode_headless", locale = locale));
    } else {
        println!("{}", t!("report.mode_interactive", locale = locale));
    }
}

fn colored_status(result: &ExecutionResult, locale: &str) -> ColoredString {
    let status = result.status_str(locale);
    match result.reason() {
        None => status.green(),
        Some(FailureReason::Interrupted) | Some(FailureReason::NotFound) => status.yellow(),
        Some(_) => status.red(),
    }
}

/// Prints the reason and any recorded output of each failed target.
/// Returns early when everything succeeded.
///
/// 打印每个失败目标的原因和记录的输出。全部成功时提前返回。
pub fn print_failure_details(summary: &RunSummary, locale: &str) {
    let failures: Vec<_> = summary.failures().collect();
    if failures.is_empty() {
        return;
    }

    println!("\n{}", t!("report.failure_banner", locale = locale).red().bold());
    println!("{}", "-".repeat(80));

    for (i, result) in failures.iter().enumerate() {
        let reason = result
            .reason()
            .map(|r| r.label(locale))
            .unwrap_or_default();
        println!(
            "[{}/{}] {} ({})",
            i + 1,
            failures.len(),
            result.target_name().cyan(),
            reason.red()
        );
        if let Some(output) = result.output().filter(|o| !o.trim().is_empty()) {
            println!("\n{}\n", output.trim_end());
        }
        println!("{}", "-".repeat(80));
    }
}
