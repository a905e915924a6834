//! # Execution Engine Module / 执行引擎模块
//!
//! This module runs targets one at a time. For each target it checks that
//! the path exists, prepares an isolated environment, spawns the child with
//! a literal argument vector, waits within the timeout and classifies the
//! outcome. Every failure is recovered locally so the remaining targets
//! always run.
//!
//! 此模块逐个运行目标。对于每个目标，它检查路径是否存在，准备隔离的环境，
//! 以字面参数向量派生子进程，在超时时间内等待并对结果进行分类。
//! 每个失败都在本地恢复，因此其余目标总会运行。

use colored::*;
use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::Child;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    core::models::{ExecutionResult, FailureReason, RunSummary, TIMEOUT_MARKER, Target},
    infra::{
        command::{
            CapturedStreams, EnvOverride, LaunchSpec, ProcessLauncher, TokioLauncher, terminate,
        },
        fs::{resolve_target_path, target_exists},
        t,
    },
    reporting::console::print_summary,
};

/// How waiting on a child, or on its captured pipes, ended.
enum WaitOutcome<T> {
    Done(T),
    TimedOut,
    Interrupted,
}

/// Sequential script runner.
///
/// The runner owns the [`ProcessLauncher`] used to spawn children, the
/// variable injected into headless targets, the run-level headless decision
/// reported in the summary, and a cancellation token that stops the run
/// (Ctrl-C).
///
/// 顺序脚本运行器。
pub struct Runner<L = TokioLauncher> {
    launcher: L,
    env_override: EnvOverride,
    headless: bool,
    cancel: CancellationToken,
}

impl Runner<TokioLauncher> {
    /// A runner that spawns real processes.
    pub fn new(env_override: EnvOverride) -> Self {
        Self::with_launcher(TokioLauncher, env_override)
    }
}

impl<L: ProcessLauncher> Runner<L> {
    pub fn with_launcher(launcher: L, env_override: EnvOverride) -> Self {
        Self {
            launcher,
            env_override,
            headless: false,
            cancel: CancellationToken::new(),
        }
    }

    /// Records whether the headless override is active for this run. This is
    /// what the summary reports, independently of the targets it contains.
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Replaces the cancellation token, e.g. with one wired to Ctrl-C.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs every target in order and returns the aggregate summary.
    ///
    /// Targets run strictly one after another. Once the run is cancelled,
    /// the remaining targets are recorded as interrupted without being
    /// spawned, so the summary always holds one result per target.
    ///
    /// 按顺序运行所有目标并返回汇总结果。
    pub async fn execute_all(&self, targets: &[Target]) -> RunSummary {
        let mut summary = RunSummary::new(self.headless);

        for target in targets {
            let result = if self.cancel.is_cancelled() {
                println!("{}", t!("run.skipped_interrupted", name = &target.name).yellow());
                ExecutionResult::failed(
                    target.clone(),
                    FailureReason::Interrupted,
                    None,
                    Duration::ZERO,
                )
            } else {
                self.execute_one(target).await
            };

            info!(
                script = %result.target_name(),
                success = result.is_success(),
                duration_ms = result.duration().as_millis() as u64,
                "target finished"
            );
            summary.record(result);
        }

        print_summary(&summary, &*rust_i18n::locale());
        summary
    }

    /// Runs a single target and classifies its outcome.
    ///
    /// The timeout is one budget for the whole target: waiting for the child
    /// to exit and draining its captured output both count against it.
    ///
    /// # Arguments
    /// * `target` - The target to execute
    ///
    /// # Returns
    /// Exactly one [`ExecutionResult`]. This never returns an error: spawn
    /// and wait failures become [`FailureReason::Unexpected`].
    pub async fn execute_one(&self, target: &Target) -> ExecutionResult {
        let script = resolve_target_path(&target.path, target.working_dir.as_deref());
        if !target_exists(&script) {
            println!("{}", t!("run.not_found", path = &target.name).red());
            return ExecutionResult::failed(
                target.clone(),
                FailureReason::NotFound,
                None,
                Duration::ZERO,
            );
        }

        let command = format!("{} {}", target.name, target.args.trim());
        println!(
            "\n{}",
            t!("run.banner", command = command.trim_end()).blue().bold()
        );

        let spec = LaunchSpec::for_target(target, script, &self.env_override);
        let started = Instant::now();
        let deadline = target.timeout().map(|limit| started + limit);

        let mut child = match self.launcher.launch(&spec) {
            Ok(child) => child,
            Err(e) => return unexpected(target, e, started.elapsed()),
        };
        debug!(pid = ?child.id(), command = %spec.display_command(), "child started");

        let mut streams = CapturedStreams::attach(&mut child);
        let status = match wait_for_exit(&mut child, deadline, &self.cancel).await {
            WaitOutcome::Done(Ok(status)) => status,
            WaitOutcome::Done(Err(e)) => {
                terminate(&mut child).await;
                streams.abort();
                return unexpected(target, e, started.elapsed());
            }
            WaitOutcome::TimedOut => {
                terminate(&mut child).await;
                streams.abort();
                return timed_out(target, started.elapsed());
            }
            WaitOutcome::Interrupted => {
                terminate(&mut child).await;
                streams.abort();
                return interrupted(target, started.elapsed());
            }
        };

        // The child has exited, but a background descendant may still hold
        // the pipes open.
        match drain_output(&mut streams, deadline, &self.cancel).await {
            WaitOutcome::Done((stdout, stderr)) => {
                classify_exit(target, status, stdout, stderr, started.elapsed())
            }
            WaitOutcome::TimedOut => {
                streams.abort();
                debug!(script = %target.name, "output still open at deadline");
                timed_out(target, started.elapsed())
            }
            WaitOutcome::Interrupted => {
                streams.abort();
                interrupted(target, started.elapsed())
            }
        }
    }
}

/// Waits for `child` to exit, for the deadline to pass, or for the run to
/// be cancelled, whichever happens first.
async fn wait_for_exit(
    child: &mut Child,
    deadline: Option<Instant>,
    cancel: &CancellationToken,
) -> WaitOutcome<io::Result<ExitStatus>> {
    until_deadline(child.wait(), deadline, cancel).await
}

/// Reads the captured pipes to end-of-file within the same deadline.
async fn drain_output(
    streams: &mut CapturedStreams,
    deadline: Option<Instant>,
    cancel: &CancellationToken,
) -> WaitOutcome<(String, String)> {
    until_deadline(streams.collect(), deadline, cancel).await
}

async fn until_deadline<F: Future>(
    fut: F,
    deadline: Option<Instant>,
    cancel: &CancellationToken,
) -> WaitOutcome<F::Output> {
    let bounded = async {
        match deadline {
            Some(at) => tokio::time::timeout_at(at, fut).await.ok(),
            None => Some(fut.await),
        }
    };

    tokio::select! {
        finished = bounded => match finished {
            Some(output) => WaitOutcome::Done(output),
            None => WaitOutcome::TimedOut,
        },
        _ = cancel.cancelled() => WaitOutcome::Interrupted,
    }
}

fn timed_out(target: &Target, duration: Duration) -> ExecutionResult {
    println!("{}", t!("run.timeout", name = &target.name).red());
    ExecutionResult::failed(
        target.clone(),
        FailureReason::Timeout,
        Some(TIMEOUT_MARKER.to_string()),
        duration,
    )
}

fn interrupted(target: &Target, duration: Duration) -> ExecutionResult {
    println!("{}", t!("run.interrupted", name = &target.name).yellow());
    ExecutionResult::failed(target.clone(), FailureReason::Interrupted, None, duration)
}

fn classify_exit(
    target: &Target,
    status: ExitStatus,
    stdout: String,
    stderr: String,
    duration: Duration,
) -> ExecutionResult {
    let capture = target.capture_output;

    if status.success() {
        println!(
            "{}",
            t!("run.succeeded", name = &target.name, duration = format!("{duration:.2?}")).green()
        );
        if capture && !stdout.trim().is_empty() {
            println!("{} {}", t!("run.output_label").cyan(), stdout.trim());
        }
        return ExecutionResult::succeeded(target.clone(), capture.then_some(stdout), duration);
    }

    let code = status.code();
    let code_str = code.map_or_else(|| t!("reason.signal").to_string(), |c| c.to_string());
    println!("{}", t!("run.failed", name = &target.name, code = code_str).red());
    if capture {
        println!("{} {}", t!("run.stdout_label").cyan(), stdout.trim());
        println!("{} {}", t!("run.stderr_label").cyan(), stderr.trim());
    }

    ExecutionResult::failed(
        target.clone(),
        FailureReason::NonZeroExit(code),
        capture.then(|| format!("{stdout}{stderr}")),
        duration,
    )
}

fn unexpected(target: &Target, error: io::Error, duration: Duration) -> ExecutionResult {
    let message = error.to_string();
    println!("{}", t!("run.exception", message = &message).red());
    ExecutionResult::failed(
        target.clone(),
        FailureReason::Unexpected(message.clone()),
        Some(message),
        duration,
    )
}
