//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the runner:
//! data models, run-list configuration, planning and the execution engine.
//!
//! 此模块包含运行器的核心功能：
//! 数据模型、运行列表配置、计划和执行引擎。

pub mod config;
pub mod execution;
pub mod models;
pub mod planner;

// Re-exports
pub use config::RunConfig;
pub use execution::Runner;
pub use models::{ExecutionResult, FailureReason, RunSummary, Target};
