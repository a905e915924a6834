//! # Data Models Module / 数据模型模块
//!
//! This module defines the in-memory data structures used by the runner:
//! the resolved [`Target`], the per-target [`ExecutionResult`] with its
//! [`FailureReason`], and the aggregate [`RunSummary`].
//!
//! 此模块定义运行器使用的内存数据结构：解析后的 [`Target`]、
//! 带有 [`FailureReason`] 的单目标 [`ExecutionResult`]，以及汇总的 [`RunSummary`]。

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::infra::t;

/// The literal output recorded for a target that exceeded its timeout.
/// 超时目标记录的字面输出。
pub const TIMEOUT_MARKER: &str = "Timeout";

/// One external program scheduled for execution.
/// Targets are produced by the planner from the run configuration and are
/// consumed exactly once by the runner.
///
/// 一个计划执行的外部程序。
/// 目标由计划器根据运行配置生成，并被运行器恰好消费一次。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    /// Display name used in console output and reports / 控制台输出和报告中使用的显示名称
    pub name: String,
    /// Path to the program or script to run / 要运行的程序或脚本的路径
    pub path: PathBuf,
    /// Whitespace-separated positional arguments / 以空白分隔的位置参数
    pub args: String,
    /// Wall-clock budget in seconds; `None` means no limit / 以秒为单位的时间预算，`None` 表示不限制
    pub timeout_secs: Option<u64>,
    /// Capture stdout/stderr into memory instead of inheriting the console.
    /// 将 stdout/stderr 捕获到内存中，而不是继承控制台。
    pub capture_output: bool,
    /// Apply the headless rendering override to the child environment.
    /// 对子进程环境应用无头渲染覆盖。
    pub headless: bool,
    /// Interpreter argv prefix, e.g. `["python3", "-u"]`. Empty runs the path directly.
    /// 解释器参数前缀，例如 `["python3", "-u"]`。为空时直接运行该路径。
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interpreter: Vec<String>,
    /// Working directory for the child; `None` inherits the runner's.
    /// 子进程的工作目录；`None` 表示继承运行器的工作目录。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl Target {
    /// Creates a target that runs `path` directly with no arguments, no
    /// timeout, no capture and no headless override.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            path,
            args: String::new(),
            timeout_secs: None,
            capture_output: false,
            headless: false,
            interpreter: Vec::new(),
            working_dir: None,
        }
    }

    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        self.args = args.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_capture(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_interpreter<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interpreter = argv.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// The configured timeout as a `Duration`.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Enumerates the possible reasons for a target failure.
/// Every variant is recovered locally: a failed target never aborts the run.
///
/// 枚举目标失败的可能原因。
/// 每种失败都在本地恢复：失败的目标永远不会中止整个运行。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// The target path did not resolve to an existing file; nothing was spawned.
    /// 目标路径不是一个存在的文件；没有派生任何进程。
    NotFound,
    /// The child exited with a non-zero code, or was terminated by a signal (`None`).
    /// 子进程以非零代码退出，或被信号终止（`None`）。
    NonZeroExit(Option<i32>),
    /// The child exceeded its timeout and was killed.
    /// 子进程超出其超时时间并被终止。
    Timeout,
    /// Spawning or waiting failed for any other reason (e.g. permission denied).
    /// 因其他原因（例如权限被拒绝）导致派生或等待失败。
    Unexpected(String),
    /// The run was interrupted (Ctrl-C) before or while this target ran.
    /// 在此目标运行之前或期间，运行被中断（Ctrl-C）。
    Interrupted,
}

impl FailureReason {
    /// Stable machine-readable identifier, used by the HTML and JSON reports.
    pub fn kind(&self) -> &'static str {
        match self {
            FailureReason::NotFound => "not_found",
            FailureReason::NonZeroExit(_) => "non_zero_exit",
            FailureReason::Timeout => "timeout",
            FailureReason::Unexpected(_) => "unexpected",
            FailureReason::Interrupted => "interrupted",
        }
    }

    /// Exit code of the child, if it exited on its own with one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            FailureReason::NonZeroExit(code) => *code,
            _ => None,
        }
    }

    /// Localized, human-readable label for the reason.
    /// 原因的本地化可读标签。
    pub fn label(&self, locale: &str) -> String {
        match self {
            FailureReason::NotFound => t!("reason.not_found", locale = locale).to_string(),
            FailureReason::NonZeroExit(Some(code)) => {
                t!("reason.non_zero_exit", locale = locale, code = code).to_string()
            }
            FailureReason::NonZeroExit(None) => t!("reason.signal", locale = locale).to_string(),
            FailureReason::Timeout => t!("reason.timeout", locale = locale).to_string(),
            FailureReason::Unexpected(message) => {
                t!("reason.unexpected", locale = locale, message = message).to_string()
            }
            FailureReason::Interrupted => t!("reason.interrupted", locale = locale).to_string(),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NotFound => write!(f, "not found"),
            FailureReason::NonZeroExit(Some(code)) => write!(f, "exit code {code}"),
            FailureReason::NonZeroExit(None) => write!(f, "terminated by signal"),
            FailureReason::Timeout => write!(f, "timeout"),
            FailureReason::Unexpected(message) => write!(f, "unexpected error: {message}"),
            FailureReason::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Represents the outcome of running a single target.
///
/// `output` carries the captured text. For `Succeeded` it is the child's
/// stdout and for a non-zero exit it is stdout followed by stderr, both only
/// when capture was requested. A timeout always records [`TIMEOUT_MARKER`]
/// and an unexpected error records its description.
///
/// 表示运行单个目标的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// The child exited with code 0 / 子进程以代码 0 退出
    Succeeded {
        target: Target,
        output: Option<String>,
        duration: Duration,
    },
    /// The target failed for the given reason / 目标因给定原因失败
    Failed {
        target: Target,
        output: Option<String>,
        reason: FailureReason,
        duration: Duration,
    },
}

impl ExecutionResult {
    pub fn succeeded(target: Target, output: Option<String>, duration: Duration) -> Self {
        ExecutionResult::Succeeded {
            target,
            output,
            duration,
        }
    }

    pub fn failed(
        target: Target,
        reason: FailureReason,
        output: Option<String>,
        duration: Duration,
    ) -> Self {
        ExecutionResult::Failed {
            target,
            output,
            reason,
            duration,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Succeeded { .. })
    }

    pub fn target(&self) -> &Target {
        match self {
            ExecutionResult::Succeeded { target, .. } | ExecutionResult::Failed { target, .. } => {
                target
            }
        }
    }

    pub fn target_name(&self) -> &str {
        &self.target().name
    }

    /// Captured output, marker, or error description, when present.
    pub fn output(&self) -> Option<&str> {
        match self {
            ExecutionResult::Succeeded { output, .. } | ExecutionResult::Failed { output, .. } => {
                output.as_deref()
            }
        }
    }

    pub fn reason(&self) -> Option<&FailureReason> {
        match self {
            ExecutionResult::Succeeded { .. } => None,
            ExecutionResult::Failed { reason, .. } => Some(reason),
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            ExecutionResult::Succeeded { duration, .. }
            | ExecutionResult::Failed { duration, .. } => *duration,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.reason(), Some(FailureReason::Timeout))
    }

    /// Gets the status of the result as a localized string for display.
    /// 以本地化字符串形式获取结果状态以供显示。
    pub fn status_str(&self, locale: &str) -> String {
        match self {
            ExecutionResult::Succeeded { .. } => {
                t!("report.status_passed", locale = locale).to_string()
            }
            ExecutionResult::Failed { reason, .. } => match reason {
                FailureReason::Timeout => t!("report.status_timeout", locale = locale).to_string(),
                FailureReason::NotFound => {
                    t!("report.status_not_found", locale = locale).to_string()
                }
                FailureReason::Interrupted => {
                    t!("report.status_interrupted", locale = locale).to_string()
                }
                _ => t!("report.status_failed", locale = locale).to_string(),
            },
        }
    }

    /// CSS class used by the HTML report for this status.
    pub fn status_class(&self) -> &'static str {
        match self.reason() {
            None => "status-passed",
            Some(FailureReason::Timeout) => "status-timeout",
            Some(FailureReason::NotFound) => "status-not-found",
            Some(FailureReason::Interrupted) => "status-interrupted",
            Some(_) => "status-failed",
        }
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionResult::Succeeded {
                target, duration, ..
            } => write!(f, "{} passed in {:.2?}", target.name, duration),
            ExecutionResult::Failed {
                target,
                reason,
                duration,
                ..
            } => write!(f, "{} failed ({}) after {:.2?}", target.name, reason, duration),
        }
    }
}

/// Aggregate over every target of a run.
/// Built incrementally through [`RunSummary::record`]; the per-target results
/// are kept so the reporters can render them once the run is finished.
///
/// 一次运行中所有目标的汇总。
/// 通过 [`RunSummary::record`] 增量构建；保留每个目标的结果，以便运行结束后由报告器渲染。
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total: usize,
    pub successful: usize,
    /// Whether the headless override was active for the run / 本次运行是否启用了无头覆盖
    pub headless: bool,
    pub results: Vec<ExecutionResult>,
}

impl RunSummary {
    pub fn new(headless: bool) -> Self {
        Self {
            headless,
            ..Self::default()
        }
    }

    /// Accounts for one finished target.
    pub fn record(&mut self, result: ExecutionResult) {
        self.total += 1;
        if result.is_success() {
            self.successful += 1;
        }
        self.results.push(result);
    }

    pub fn failed(&self) -> usize {
        self.total - self.successful
    }

    pub fn all_succeeded(&self) -> bool {
        self.successful == self.total
    }

    /// Failed results in run order.
    pub fn failures(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_successes_and_failures() {
        let mut summary = RunSummary::new(false);
        summary.record(ExecutionResult::succeeded(
            Target::new("a.sh"),
            None,
            Duration::from_millis(5),
        ));
        summary.record(ExecutionResult::failed(
            Target::new("b.sh"),
            FailureReason::NotFound,
            None,
            Duration::ZERO,
        ));

        assert_eq!(summary.total, 2);
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.all_succeeded());
        assert_eq!(summary.failures().count(), 1);
    }

    #[test]
    fn empty_summary_counts_as_all_succeeded() {
        let summary = RunSummary::new(true);
        assert_eq!(summary.total, 0);
        assert!(summary.all_succeeded());
    }

    #[test]
    fn failure_reason_exposes_exit_code_only_for_non_zero_exit() {
        assert_eq!(FailureReason::NonZeroExit(Some(3)).exit_code(), Some(3));
        assert_eq!(FailureReason::NonZeroExit(None).exit_code(), None);
        assert_eq!(FailureReason::Timeout.exit_code(), None);
        assert_eq!(FailureReason::Unexpected("x".into()).kind(), "unexpected");
    }

    #[test]
    fn labels_follow_requested_locale() {
        let reason = FailureReason::NonZeroExit(Some(2));
        assert_eq!(reason.label("en"), "exit code 2");
        assert_eq!(reason.label("zh-CN"), "退出码 2");
        assert_eq!(FailureReason::Timeout.label("en"), "timeout");
    }

    #[test]
    fn target_name_defaults_to_path() {
        let target = Target::new("scripts/plot.py").with_timeout_secs(3);
        assert_eq!(target.name, "scripts/plot.py");
        assert_eq!(target.timeout(), Some(Duration::from_secs(3)));
    }
}
