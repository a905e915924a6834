//! # Reporting Module / 报告模块
//!
//! This module handles the display and export of run results.
//! It prints the colorful console summary and writes optional HTML and JSON
//! reports, with internationalization support.
//!
//! 此模块处理运行结果的显示和导出。
//! 它打印彩色的控制台摘要，并可选地写入 HTML 和 JSON 报告，支持国际化。

pub mod console;
pub mod html;
pub mod json;

// Re-export common reporting functions
pub use console::{print_failure_details, print_summary};
pub use html::generate_html_report;
pub use json::write_json_report;
