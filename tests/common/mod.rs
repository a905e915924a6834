// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use script_runner::infra::command::{LaunchSpec, ProcessLauncher, TokioLauncher};
use script_runner::models::Target;
use tokio::process::Child;

/// Writes a shell script into `dir` and returns its path.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("Failed to write script");
    path
}

/// A captured target that runs `path` through `sh`.
pub fn sh_target(path: impl Into<PathBuf>) -> Target {
    Target::new(path).with_interpreter(["sh"]).with_capture(true)
}

/// Spawns real processes and counts how many were started.
#[derive(Clone, Default)]
pub struct CountingLauncher {
    spawns: Arc<AtomicUsize>,
}

impl CountingLauncher {
    pub fn spawns(&self) -> usize {
        self.spawns.load(Ordering::SeqCst)
    }
}

impl ProcessLauncher for CountingLauncher {
    fn launch(&self, spec: &LaunchSpec) -> io::Result<Child> {
        self.spawns.fetch_add(1, Ordering::SeqCst);
        TokioLauncher.launch(spec)
    }
}

/// Writes a run list into `dir` and returns its path.
pub fn write_runlist(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("Runlist.toml");
    fs::write(&path, contents).expect("Failed to write run list");
    path
}
