//! # Run Planning Module / 运行计划模块
//!
//! Turns a [`RunConfig`] into the ordered list of resolved [`Target`]s the
//! runner consumes, applying run-level defaults and the headless decision
//! uniformly to every target.
//!
//! 将 [`RunConfig`] 转换为运行器使用的有序 [`Target`] 列表，
//! 并对每个目标统一应用运行级默认值和无头模式决策。

use anyhow::{Context, Result};

use crate::core::config::RunConfig;
use crate::core::models::Target;
use crate::infra::command::EnvOverride;
use crate::infra::fs::{expand_path, resolve_target_path};

/// Result of planning a run.
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Targets in execution order / 按执行顺序排列的目标
    pub targets: Vec<Target>,
    /// Whether the headless override applies to this run / 本次运行是否应用无头覆盖
    pub headless: bool,
    /// The variable injected when `headless` is on / 启用无头模式时注入的变量
    pub env_override: EnvOverride,
}

/// Builds the execution plan.
///
/// # Arguments
/// * `config` - The loaded run list
/// * `headless` - Whether the headless override is active for every target
///
/// # Returns
/// A [`RunPlan`], or an error if a path cannot be expanded or an interpreter
/// command line cannot be tokenized
pub fn plan_run(config: &RunConfig, headless: bool) -> Result<RunPlan> {
    let default_interpreter = config
        .interpreter
        .as_deref()
        .map(tokenize_interpreter)
        .transpose()?
        .unwrap_or_default();

    let mut targets = Vec::with_capacity(config.targets.len());
    for entry in &config.targets {
        let working_dir = entry
            .working_dir
            .as_deref()
            .map(expand_path)
            .transpose()?
            .map(|dir| resolve_target_path(&dir, config.base_dir.as_deref()));

        let path = expand_path(&entry.path)?;
        let base = working_dir.as_deref().or(config.base_dir.as_deref());
        let path = resolve_target_path(&path, base);

        let interpreter = match entry.interpreter.as_deref() {
            Some(line) => tokenize_interpreter(line)
                .with_context(|| format!("target '{}'", entry.path))?,
            None => default_interpreter.clone(),
        };

        targets.push(Target {
            name: entry.name.clone().unwrap_or_else(|| entry.path.clone()),
            path,
            args: entry.args.clone(),
            timeout_secs: entry.timeout_secs,
            capture_output: entry.capture_output,
            headless,
            interpreter,
            working_dir,
        });
    }

    Ok(RunPlan {
        targets,
        headless,
        env_override: EnvOverride::new(&config.headless.variable, &config.headless.value),
    })
}

/// Splits an interpreter command line (e.g. `"python3 -u"`) into argv using
/// POSIX shell quoting rules, without invoking a shell.
pub fn tokenize_interpreter(line: &str) -> Result<Vec<String>> {
    shlex::split(line)
        .ok_or_else(|| anyhow::anyhow!("Failed to parse interpreter command: {line}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{TargetConfig, parse_run_config};
    use std::path::PathBuf;

    fn config_with(targets: Vec<TargetConfig>) -> RunConfig {
        RunConfig {
            targets,
            ..crate::core::config::default_run_config()
        }
    }

    #[test]
    fn headless_flag_applies_to_every_target() {
        let config = config_with(vec![TargetConfig::new("a.py"), TargetConfig::new("b.py")]);
        let plan = plan_run(&config, true).unwrap();
        assert!(plan.headless);
        assert!(plan.targets.iter().all(|t| t.headless));

        let plan = plan_run(&config, false).unwrap();
        assert!(plan.targets.iter().all(|t| !t.headless));
    }

    #[test]
    fn target_interpreter_overrides_run_default() {
        let mut direct = TargetConfig::new("tool");
        direct.interpreter = Some(String::new());
        let mut quoted = TargetConfig::new("b.py");
        quoted.interpreter = Some("\"/opt/my python/bin/python\" -u".to_string());

        let config = config_with(vec![TargetConfig::new("a.py"), direct, quoted]);
        let plan = plan_run(&config, false).unwrap();

        assert_eq!(plan.targets[0].interpreter, vec!["python3"]);
        assert!(plan.targets[1].interpreter.is_empty());
        assert_eq!(plan.targets[2].interpreter, vec!["/opt/my python/bin/python", "-u"]);
    }

    #[test]
    fn unbalanced_interpreter_quotes_are_an_error() {
        let mut entry = TargetConfig::new("a.py");
        entry.interpreter = Some("\"python3".to_string());
        assert!(plan_run(&config_with(vec![entry]), false).is_err());
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let mut config = parse_run_config(
            r#"
            [headless]
            variable = "RENDER_BACKEND"
            value = "non-interactive"

            [[targets]]
            path = "demo.py"
            name = "demo"
            args = "--fast"
            timeout_secs = 5
            capture_output = false
            "#,
        )
        .unwrap();
        config.base_dir = Some(PathBuf::from("/srv/runs"));

        let plan = plan_run(&config, false).unwrap();
        let target = &plan.targets[0];
        assert_eq!(target.name, "demo");
        assert_eq!(target.path, PathBuf::from("/srv/runs/demo.py"));
        assert_eq!(target.args, "--fast");
        assert_eq!(target.timeout_secs, Some(5));
        assert!(!target.capture_output);
        assert!(target.interpreter.is_empty());
        assert_eq!(
            plan.env_override,
            EnvOverride::new("RENDER_BACKEND", "non-interactive")
        );
    }

    #[test]
    fn working_dir_becomes_resolution_base() {
        let mut entry = TargetConfig::new("demo.py");
        entry.working_dir = Some("sub".to_string());
        let mut config = config_with(vec![entry]);
        config.base_dir = Some(PathBuf::from("/srv/runs"));

        let plan = plan_run(&config, false).unwrap();
        let target = &plan.targets[0];
        assert_eq!(target.working_dir, Some(PathBuf::from("/srv/runs/sub")));
        assert_eq!(target.path, PathBuf::from("/srv/runs/sub/demo.py"));
    }
}
