//! # Process Launch Module / 进程启动模块
//!
//! Everything that touches `tokio::process` lives here: turning a
//! [`Target`](crate::core::models::Target) into an explicit argv and
//! environment ([`LaunchSpec`]), spawning it through a [`ProcessLauncher`],
//! draining captured pipes, and terminating children.
//!
//! 所有涉及 `tokio::process` 的代码都在这里：将目标转换为显式的参数向量和环境变量
//! （[`LaunchSpec`]），通过 [`ProcessLauncher`] 派生进程，读取捕获的管道，以及终止子进程。

use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::models::Target;

/// The single environment variable injected into children that run headless.
/// 注入到无头运行子进程中的单个环境变量。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvOverride {
    pub variable: String,
    pub value: String,
}

impl EnvOverride {
    pub fn new(variable: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            value: value.into(),
        }
    }
}

impl Default for EnvOverride {
    fn default() -> Self {
        Self::new("MPLBACKEND", "Agg")
    }
}

/// A fully resolved process invocation. No shell is involved: `program` is
/// executed with `args` as a literal argument vector and `env` as its
/// complete environment.
///
/// 一个完全解析的进程调用。不涉及 shell。
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub env: HashMap<OsString, OsString>,
    pub working_dir: Option<PathBuf>,
    pub capture_output: bool,
}

impl LaunchSpec {
    /// Builds the invocation for `target`, whose path has already been
    /// resolved to `script`. The environment is a copy of the current process
    /// environment plus `headless` when the target asks for it.
    pub fn for_target(target: &Target, script: PathBuf, headless: &EnvOverride) -> Self {
        let override_var = target.headless.then_some(headless);
        let env = build_environment(std::env::vars_os(), override_var);

        let mut argv: Vec<OsString> = target.interpreter.iter().map(OsString::from).collect();
        argv.push(script.into_os_string());
        argv.extend(split_args(&target.args).into_iter().map(OsString::from));

        let program = argv.remove(0);
        Self {
            program,
            args: argv,
            env,
            working_dir: target.working_dir.clone(),
            capture_output: target.capture_output,
        }
    }

    /// The command line as one string, for logs and banners only.
    pub fn display_command(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| part.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Splits an argument string on whitespace. An empty or blank string yields
/// no arguments.
pub fn split_args(args: &str) -> Vec<String> {
    args.split_whitespace().map(str::to_owned).collect()
}

/// Derives a child environment from `base`, applying at most one override.
/// The parent's own environment is never modified.
///
/// 从 `base` 派生子进程环境，最多应用一个覆盖。父进程自身的环境永远不会被修改。
pub fn build_environment<I>(
    base: I,
    override_var: Option<&EnvOverride>,
) -> HashMap<OsString, OsString>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut env: HashMap<OsString, OsString> = base.into_iter().collect();
    if let Some(var) = override_var {
        env.insert(OsString::from(&var.variable), OsString::from(&var.value));
    }
    env
}

/// Seam between the runner and the operating system. Production code uses
/// [`TokioLauncher`]; tests wrap it to count or inspect spawns.
///
/// 运行器与操作系统之间的接缝。生产代码使用 [`TokioLauncher`]；测试可以包装它以统计或检查派生。
pub trait ProcessLauncher: Send + Sync {
    fn launch(&self, spec: &LaunchSpec) -> io::Result<Child>;
}

/// Spawns real processes with `tokio::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLauncher;

impl ProcessLauncher for TokioLauncher {
    fn launch(&self, spec: &LaunchSpec) -> io::Result<Child> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .env_clear()
            .envs(&spec.env)
            .kill_on_drop(true);

        if let Some(dir) = &spec.working_dir {
            cmd.current_dir(dir);
        }

        if spec.capture_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }

        debug!(
            command = %spec.display_command(),
            capture = spec.capture_output,
            "spawning child process"
        );
        cmd.spawn()
    }
}

/// Handles to the tasks draining a child's captured pipes.
///
/// Both pipes are read concurrently with the wait so a chatty child can
/// never block on a full pipe buffer. Readers still running when the value
/// is dropped are aborted, so an abandoned [`collect`](Self::collect) never
/// leaves a task behind.
///
/// 读取子进程捕获管道的任务句柄。两个管道与等待并发读取，避免子进程因管道缓冲区写满而阻塞。
/// 丢弃时仍在运行的读取任务会被中止。
pub struct CapturedStreams {
    stdout: Option<JoinHandle<io::Result<Vec<u8>>>>,
    stderr: Option<JoinHandle<io::Result<Vec<u8>>>>,
}

impl CapturedStreams {
    /// Takes the pipes off `child` (if it has any) and starts reading them.
    pub fn attach(child: &mut Child) -> Self {
        Self {
            stdout: child.stdout.take().map(spawn_reader),
            stderr: child.stderr.take().map(spawn_reader),
        }
    }

    /// Waits for both pipes to reach end-of-file and returns
    /// `(stdout, stderr)` as text.
    ///
    /// End-of-file only arrives once every process holding the write end has
    /// closed it, which includes background descendants of the child. Callers
    /// bound this with the target's deadline. The future is cancel-safe: a
    /// reader that has not finished stays in place for [`abort`](Self::abort).
    pub async fn collect(&mut self) -> (String, String) {
        let stdout = join_reader(&mut self.stdout, "stdout").await;
        let stderr = join_reader(&mut self.stderr, "stderr").await;
        (stdout, stderr)
    }

    /// Stops reading. Used after a kill or an expired deadline, where a
    /// descendant may still hold the write end open.
    pub fn abort(&mut self) {
        for handle in [self.stdout.take(), self.stderr.take()].into_iter().flatten() {
            handle.abort();
        }
    }
}

impl Drop for CapturedStreams {
    fn drop(&mut self) {
        self.abort();
    }
}

fn spawn_reader<R>(mut stream: R) -> JoinHandle<io::Result<Vec<u8>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await?;
        Ok(buf)
    })
}

async fn join_reader(slot: &mut Option<JoinHandle<io::Result<Vec<u8>>>>, stream: &str) -> String {
    let Some(handle) = slot.as_mut() else {
        return String::new();
    };
    let joined = handle.await;
    slot.take();

    match joined {
        Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Ok(Err(e)) => {
            warn!(stream, error = %e, "failed to read captured output");
            String::new()
        }
        Err(e) => {
            warn!(stream, error = %e, "output reader task failed");
            String::new()
        }
    }
}

/// Kills `child` and reaps it so no orphan or zombie is left behind.
/// Failures are logged rather than returned.
///
/// 终止 `child` 并回收它，确保不会留下孤儿或僵尸进程。
pub async fn terminate(child: &mut Child) {
    let pid = child.id();
    if let Err(e) = child.kill().await {
        warn!(?pid, error = %e, "failed to kill child process");
    } else {
        debug!(?pid, "child process killed");
    }
}
