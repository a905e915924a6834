//! # Run List Initialization Module / 运行列表初始化模块
//!
//! This module implements the `init` command. It creates a `Runlist.toml`
//! either through an interactive wizard or, with `--non-interactive`, from
//! the built-in run list.
//!
//! 此模块实现了 `init` 命令。它通过交互式向导创建 `Runlist.toml`，
//! 或者在使用 `--non-interactive` 时根据内置运行列表创建。
//!
//! ## Features / 功能特性
//!
//! - **Script Discovery**: Offers the `.py` and `.sh` files next to the run list
//! - **Overwrite Protection**: Confirmation prompt before replacing an existing file
//!
//! - **脚本发现**: 提供运行列表旁边的 `.py` 和 `.sh` 文件供选择
//! - **覆盖保护**: 替换现有文件前的确认提示

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, MultiSelect, theme::ColorfulTheme};
use std::fs;
use std::path::Path;

use crate::core::config::{RunConfig, TargetConfig, default_run_config};
use crate::infra::{fs::write_report, t};

/// Extensions offered by the wizard.
const SCRIPT_EXTENSIONS: [&str; 2] = ["py", "sh"];

/// Creates the run list at `path`.
///
/// # Arguments / 参数
/// * `path` - Where to write the run list / 运行列表的写入位置
/// * `language` - Value stored in the `language` key / 写入 `language` 键的值
/// * `non_interactive` - Skip all prompts and write the built-in list; an
///   existing file is left untouched / 跳过所有提示并写入内置列表；现有文件保持不变
///
/// # Process Flow / 处理流程
/// 1. Confirm overwrite if the file exists / 如果文件存在则确认覆盖
/// 2. Let the user pick scripts from the directory / 让用户从目录中选择脚本
/// 3. Ask for the interpreter and timeout / 询问解释器和超时
/// 4. Serialize and save / 序列化并保存
pub fn run_init_wizard(path: &Path, language: &str, non_interactive: bool) -> Result<()> {
    if non_interactive {
        if path.exists() {
            println!(
                "{}",
                t!("init.file_exists", path = path.display()).yellow()
            );
            return Ok(());
        }
        let config = RunConfig {
            language: language.to_string(),
            ..default_run_config()
        };
        return save_config(&config, path);
    }

    let theme = ColorfulTheme::default();
    println!("\n{}", t!("init.welcome").bold().cyan());
    println!("{}\n", t!("init.description"));

    if !confirm_overwrite(&theme, path)? {
        println!("{}", t!("init.aborted").yellow());
        return Ok(());
    }

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let config = prompt_for_config(&theme, dir, language)?;
    save_config(&config, path)
}

fn confirm_overwrite(theme: &ColorfulTheme, path: &Path) -> Result<bool> {
    if path.exists() {
        Confirm::with_theme(theme)
            .with_prompt(t!("init.overwrite_prompt", path = path.display()))
            .default(false)
            .interact()
            .with_context(|| t!("init.confirmation_failed").to_string())
    } else {
        Ok(true)
    }
}

fn prompt_for_config(theme: &ColorfulTheme, dir: &Path, language: &str) -> Result<RunConfig> {
    let scripts = discover_scripts(dir)?;
    let mut config = RunConfig {
        language: language.to_string(),
        ..default_run_config()
    };

    if scripts.is_empty() {
        println!("{}", t!("init.no_scripts_found", path = dir.display()).yellow());
    } else {
        let defaults = vec![true; scripts.len()];
        let selections = MultiSelect::with_theme(theme)
            .with_prompt(t!("init.select_scripts"))
            .items(&scripts)
            .defaults(&defaults)
            .interact()?;

        if selections.is_empty() {
            println!("{}", t!("init.nothing_selected").yellow());
        } else {
            config.targets = selections
                .into_iter()
                .map(|i| target_for_script(&scripts[i]))
                .collect();
        }
    }

    let interpreter: String = Input::with_theme(theme)
        .with_prompt(t!("init.interpreter_prompt"))
        .default("python3".to_string())
        .interact_text()?;
    config.interpreter = Some(interpreter).filter(|i| !i.trim().is_empty());

    let timeout: u64 = Input::with_theme(theme)
        .with_prompt(t!("init.timeout_prompt"))
        .default(60)
        .interact_text()?;
    let timeout = (timeout > 0).then_some(timeout);
    for target in &mut config.targets {
        target.timeout_secs = timeout;
    }

    Ok(config)
}

/// Lists the script files directly inside `dir`, sorted by name.
pub fn discover_scripts(dir: &Path) -> Result<Vec<String>> {
    let entries =
        fs::read_dir(dir).with_context(|| t!("init.read_dir_failed", path = dir.display()).to_string())?;

    let mut scripts: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
        })
        .filter_map(|path| path.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .collect();
    scripts.sort();
    Ok(scripts)
}

/// Shell scripts get `sh` as their interpreter; everything else uses the
/// run-level default.
fn target_for_script(file_name: &str) -> TargetConfig {
    let mut target = TargetConfig::new(file_name);
    if file_name.ends_with(".sh") {
        target.interpreter = Some("sh".to_string());
    }
    target
}

fn save_config(config: &RunConfig, path: &Path) -> Result<()> {
    let toml_string = toml::to_string_pretty(config)
        .with_context(|| t!("init.serialize_failed").to_string())?;
    write_report(path, &toml_string)
        .with_context(|| t!("init.write_failed", path = path.display()).to_string())?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init.success", path = path.display()).bold()
    );
    println!("{}", t!("init.usage_hint"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::load_run_config;
    use tempfile::tempdir;

    #[test]
    fn discovers_only_scripts_in_order() {
        let dir = tempdir().unwrap();
        for name in ["b.py", "a.sh", "notes.txt", "c.PY"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("sub.py")).unwrap();

        let scripts = discover_scripts(dir.path()).unwrap();
        assert_eq!(scripts, vec!["a.sh", "b.py"]);
    }

    #[test]
    fn shell_scripts_get_sh_interpreter() {
        assert_eq!(target_for_script("x.sh").interpreter.as_deref(), Some("sh"));
        assert_eq!(target_for_script("x.py").interpreter, None);
    }

    #[test]
    fn non_interactive_writes_loadable_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Runlist.toml");

        run_init_wizard(&path, "zh-CN", true).unwrap();

        let config = load_run_config(&path).unwrap();
        assert_eq!(config.language, "zh-CN");
        assert_eq!(config.targets, default_run_config().targets);
    }

    #[test]
    fn non_interactive_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Runlist.toml");
        fs::write(&path, "# mine").unwrap();

        run_init_wizard(&path, "en", true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine");
    }
}
