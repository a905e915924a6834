//! # Run List Tests / 运行列表测试
//!
//! Loading a run list from disk and turning it into a plan.
//!
//! 从磁盘加载运行列表并将其转换为执行计划。

mod common;

use common::{write_runlist, write_script};
use script_runner::config::{load_run_config, resolve_run_config};
use script_runner::core::planner::plan_run;
use script_runner::execution::Runner;
use tempfile::tempdir;

#[test]
fn test_relative_paths_follow_config_location() {
    let dir = tempdir().unwrap();
    let config_path = write_runlist(
        dir.path(),
        r#"
[[targets]]
path = "scripts/a.py"
args = "--n 3"
"#,
    );

    let config = load_run_config(&config_path).unwrap();
    let plan = plan_run(&config, false).unwrap();

    assert_eq!(plan.targets[0].path, dir.path().join("scripts/a.py"));
    assert_eq!(plan.targets[0].name, "scripts/a.py");
    assert_eq!(plan.targets[0].args, "--n 3");
}

#[test]
fn test_explicit_config_wins() {
    let dir = tempdir().unwrap();
    let config_path = write_runlist(
        dir.path(),
        r#"
language = "zh-CN"

[[targets]]
path = "only.sh"
"#,
    );

    let (config, used) = resolve_run_config(Some(&config_path)).unwrap();
    assert_eq!(used.as_deref(), Some(config_path.as_path()));
    assert_eq!(config.language, "zh-CN");
    assert_eq!(config.targets.len(), 1);
}

#[test]
fn test_unknown_keys_are_ignored_but_bad_types_are_not() {
    let dir = tempdir().unwrap();
    let ok = write_runlist(
        dir.path(),
        r#"
comment = "kept for humans"

[[targets]]
path = "a.sh"
"#,
    );
    assert!(load_run_config(&ok).is_ok());

    let bad = write_runlist(
        dir.path(),
        r#"
[[targets]]
path = "a.sh"
timeout_secs = "soon"
"#,
    );
    assert!(load_run_config(&bad).is_err());
}

#[test]
fn test_environment_variables_in_paths_are_expanded() {
    let dir = tempdir().unwrap();
    let config_path = write_runlist(
        dir.path(),
        r#"
[[targets]]
path = "$HOME/demo.py"
"#,
    );

    let config = load_run_config(&config_path).unwrap();
    let plan = plan_run(&config, false).unwrap();
    let home = std::env::var("HOME").unwrap();
    assert!(plan.targets[0].path.starts_with(&home));
}

#[tokio::test]
async fn test_loaded_plan_runs_end_to_end() {
    let dir = tempdir().unwrap();
    write_script(dir.path(), "hello.sh", "echo \"hi $1\"\n");
    let config_path = write_runlist(
        dir.path(),
        r#"
interpreter = "sh"

[[targets]]
path = "hello.sh"
args = "there"
timeout_secs = 5
"#,
    );

    let config = load_run_config(&config_path).unwrap();
    let plan = plan_run(&config, false).unwrap();
    let summary = Runner::new(plan.env_override).execute_all(&plan.targets).await;

    assert_eq!(summary.successful, 1);
    assert_eq!(summary.results[0].output(), Some("hi there\n"));
}
