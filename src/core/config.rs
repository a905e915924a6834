//! # Run Configuration Module / 运行配置模块
//!
//! Defines the TOML-backed run list (`Runlist.toml`), loads it from disk and
//! validates it. When no file is present the built-in default list is used.
//!
//! 定义基于 TOML 的运行列表（`Runlist.toml`），从磁盘加载并进行校验。
//! 如果文件不存在，则使用内置的默认列表。

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::infra::t;

/// File name looked up in the current directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "Runlist.toml";

/// Environment toggle that turns on the headless override for the whole run.
pub const HEADLESS_TOGGLE_VAR: &str = "USE_AGG_BACKEND";

/// A single target entry in the run list.
/// 运行列表中的单个目标条目。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TargetConfig {
    /// Path to the script or program. `~` and `$VAR` are expanded.
    /// 脚本或程序的路径。会展开 `~` 和 `$VAR`。
    pub path: String,
    /// Optional display name; defaults to the path.
    /// 可选的显示名称；默认为路径。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whitespace-separated arguments passed literally (no shell).
    /// 以空白分隔、按字面传递的参数（不经过 shell）。
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub args: String,
    /// Timeout in seconds. Omit for no limit.
    /// 超时时间（秒）。省略表示不限制。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Capture stdout/stderr instead of streaming them live.
    /// 捕获 stdout/stderr，而不是实时输出。
    #[serde(default = "default_capture_output")]
    pub capture_output: bool,
    /// Overrides the run-level interpreter for this target. An empty string
    /// runs the path directly.
    /// 为此目标覆盖运行级别的解释器。空字符串表示直接运行该路径。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
    /// Working directory for the child process.
    /// 子进程的工作目录。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

impl TargetConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            args: String::new(),
            timeout_secs: None,
            capture_output: default_capture_output(),
            interpreter: None,
            working_dir: None,
        }
    }
}

/// `[headless]` section: the variable injected into each child when the
/// headless override is active.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeadlessConfig {
    #[serde(default = "default_headless_variable")]
    pub variable: String,
    #[serde(default = "default_headless_value")]
    pub value: String,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            variable: default_headless_variable(),
            value: default_headless_value(),
        }
    }
}

/// Represents the whole run list, loaded from a TOML file.
/// 代表从 TOML 文件加载的完整运行列表。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RunConfig {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    #[serde(default = "default_language")]
    pub language: String,

    /// Interpreter command line applied to every target that does not set
    /// its own, tokenized like a shell would (without running one).
    /// 应用于所有未单独设置解释器的目标的解释器命令行。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,

    #[serde(default)]
    pub headless: HeadlessConfig,

    /// Targets in execution order / 按执行顺序排列的目标
    #[serde(default)]
    pub targets: Vec<TargetConfig>,

    /// Directory that relative target paths are resolved against. Set to the
    /// config file's directory by [`load_run_config`].
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_capture_output() -> bool {
    true
}

fn default_headless_variable() -> String {
    "MPLBACKEND".to_string()
}

fn default_headless_value() -> String {
    "Agg".to_string()
}

/// The built-in run list used when no config file exists: the two demo
/// scripts, run with `python3`, captured, one minute each.
///
/// 不存在配置文件时使用的内置运行列表。
pub fn default_run_config() -> RunConfig {
    let demo = |path: &str| TargetConfig {
        timeout_secs: Some(60),
        ..TargetConfig::new(path)
    };

    RunConfig {
        language: default_language(),
        interpreter: Some("python3".to_string()),
        headless: HeadlessConfig::default(),
        targets: vec![demo("residues_demo.py"), demo("universality_demo.py")],
        base_dir: None,
    }
}

/// Parses a run list from TOML text without touching the filesystem.
pub fn parse_run_config(contents: &str) -> Result<RunConfig> {
    let config: RunConfig =
        toml::from_str(contents).with_context(|| t!("config.parse_failed").to_string())?;
    validate_run_config(&config)?;
    Ok(config)
}

/// Loads and validates a run list from `path`.
/// Relative target paths are later resolved against the file's directory.
///
/// 从 `path` 加载并校验运行列表。
pub fn load_run_config(path: &Path) -> Result<RunConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| t!("config.read_failed", path = path.display()).to_string())?;
    let mut config = parse_run_config(&contents)
        .with_context(|| t!("config.invalid_file", path = path.display()).to_string())?;
    config.base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf);
    Ok(config)
}

/// Picks the run list for this invocation.
///
/// - an explicit `--config` path must exist and parse;
/// - otherwise `Runlist.toml` in the current directory is used if present;
/// - otherwise the built-in list from [`default_run_config`].
pub fn resolve_run_config(explicit: Option<&Path>) -> Result<(RunConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        return Ok((load_run_config(path)?, Some(path.to_path_buf())));
    }

    let fallback = Path::new(DEFAULT_CONFIG_FILE);
    if fallback.is_file() {
        return Ok((load_run_config(fallback)?, Some(fallback.to_path_buf())));
    }

    Ok((default_run_config(), None))
}

/// Semantic checks that serde cannot express.
pub fn validate_run_config(config: &RunConfig) -> Result<()> {
    if config.targets.is_empty() {
        bail!("{}", t!("config.no_targets"));
    }
    if config.headless.variable.trim().is_empty() || config.headless.variable.contains('=') {
        bail!(
            "{}",
            t!("config.bad_headless_variable", name = &config.headless.variable)
        );
    }
    for (index, target) in config.targets.iter().enumerate() {
        if target.path.trim().is_empty() {
            bail!("{}", t!("config.empty_path", index = index + 1));
        }
        if target.timeout_secs == Some(0) {
            bail!("{}", t!("config.zero_timeout", path = &target.path));
        }
    }
    Ok(())
}

/// Interprets the value of [`HEADLESS_TOGGLE_VAR`]: only a case-insensitive
/// `"true"` turns it on.
pub fn toggle_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.to_lowercase() == "true")
}

/// Reads [`HEADLESS_TOGGLE_VAR`] from the process environment.
pub fn headless_from_env() -> bool {
    toggle_enabled(std::env::var(HEADLESS_TOGGLE_VAR).ok().as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_accepts_only_true() {
        assert!(toggle_enabled(Some("true")));
        assert!(toggle_enabled(Some("TRUE")));
        assert!(toggle_enabled(Some("True")));
        assert!(!toggle_enabled(Some("1")));
        assert!(!toggle_enabled(Some("yes")));
        assert!(!toggle_enabled(Some(" true")));
        assert!(!toggle_enabled(Some("")));
        assert!(!toggle_enabled(None));
    }

    #[test]
    fn default_config_is_valid() {
        let config = default_run_config();
        assert!(validate_run_config(&config).is_ok());
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[0].timeout_secs, Some(60));
        assert!(config.targets.iter().all(|t| t.capture_output));
    }

    #[test]
    fn minimal_target_gets_defaults() {
        let config = parse_run_config(
            r#"
            [[targets]]
            path = "plot.py"
            "#,
        )
        .unwrap();

        let target = &config.targets[0];
        assert_eq!(config.language, "en");
        assert_eq!(config.headless.variable, "MPLBACKEND");
        assert_eq!(config.headless.value, "Agg");
        assert_eq!(target.args, "");
        assert_eq!(target.timeout_secs, None);
        assert!(target.capture_output);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = parse_run_config(
            r#"
            [[targets]]
            path = "plot.py"
            timeout_secs = 0
            "#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("plot.py"));
    }

    #[test]
    fn empty_target_list_is_rejected() {
        assert!(parse_run_config("language = \"en\"").is_err());
    }

    #[test]
    fn headless_variable_must_be_a_name() {
        let result = parse_run_config(
            r#"
            [headless]
            variable = "A=B"

            [[targets]]
            path = "plot.py"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn serialized_default_config_parses_back() {
        let config = default_run_config();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = parse_run_config(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
