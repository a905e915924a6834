//! # Commands Module / 命令模块
//!
//! This module contains the implementations of the runner's subcommands.
//!
//! 此模块包含运行器各子命令的实现。

pub mod init;
pub mod run;
