//! # Script Runner Library / Script Runner 库
//!
//! This library provides the core functionality for the Script Runner tool,
//! which runs an ordered list of scripts as isolated subprocesses with
//! per-script timeouts, optional headless plotting and a pass/fail summary.
//!
//! 此库为 Script Runner 工具提供核心功能，
//! 它将有序的脚本列表作为隔离的子进程运行，支持单脚本超时、可选的无头绘图以及通过/失败摘要。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, run-list configuration, planning and the execution engine
//! - `infra` - Process launching and file system helpers
//! - `reporting` - Console, HTML and JSON reports
//! - `cli` - Command-line interface and commands
//! - `logging` - `tracing` subscriber setup
//!
//! - `core` - 数据模型、运行列表配置、计划和执行引擎
//! - `infra` - 进程启动和文件系统工具
//! - `reporting` - 控制台、HTML 和 JSON 报告
//! - `cli` - 命令行接口和命令
//! - `logging` - `tracing` 订阅器设置

pub mod cli;
pub mod core;
pub mod infra;
pub mod logging;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::execution;
pub use crate::core::models;

/// Selects the UI language.
///
/// An explicit `preferred` language wins; otherwise the system locale is
/// detected. The full locale (e.g. "zh-CN") is tried first, then the
/// language part only (e.g. "en" from "en-US"), and finally "en".
/// Returns the locale that was set.
pub fn init_locale(preferred: Option<&str>) -> String {
    let locale = preferred
        .map(str::to_string)
        .or_else(sys_locale::get_locale)
        .unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    let lang = if available_locales.contains(&locale.as_str()) {
        locale.as_str()
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
    lang.to_string()
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
