//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which executes every target of
//! the run list in order and reports the outcome.
//!
//! 此模块实现了 `run` 命令，按顺序执行运行列表中的每个目标并报告结果。

use anyhow::Result;
use colored::*;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    cli::RunArgs,
    core::{
        config::{headless_from_env, resolve_run_config},
        execution::Runner,
        models::RunSummary,
        planner::{RunPlan, plan_run},
    },
    infra::{command::LaunchSpec, t},
    reporting::{generate_html_report, print_failure_details, write_json_report},
};

/// Executes the run command.
///
/// # Arguments
/// * `args` - Options of the `run` subcommand
/// * `lang_forced` - Whether `--lang` was given, which takes precedence over
///   the `language` key of the run list
///
/// # Returns
/// `Ok(())` when every target succeeded (or `--legacy-exit` is set), an
/// error otherwise so the process exits non-zero.
pub async fn execute(args: RunArgs, lang_forced: bool) -> Result<()> {
    let (config, config_path) = resolve_run_config(args.config.as_deref())?;

    let locale = if lang_forced {
        rust_i18n::locale().to_string()
    } else {
        crate::init_locale(Some(&config.language))
    };

    match &config_path {
        Some(path) => println!(
            "{}",
            t!("run.loading_config", locale = locale, path = path.display())
        ),
        None => println!("{}", t!("run.builtin_config", locale = locale)),
    }

    let headless = args.headless || headless_from_env();
    let plan = plan_run(&config, headless)?;
    info!(
        targets = plan.targets.len(),
        headless,
        variable = %plan.env_override.variable,
        "run planned"
    );

    if args.dry_run {
        print_plan(&plan, &locale);
        return Ok(());
    }

    let stop_token = setup_signal_handler(&locale);
    let runner = Runner::new(plan.env_override.clone())
        .with_headless(plan.headless)
        .with_cancellation(stop_token);
    let summary = runner.execute_all(&plan.targets).await;

    print_failure_details(&summary, &locale);
    write_reports(&summary, &args, &locale);

    if summary.all_succeeded() || args.legacy_exit {
        Ok(())
    } else {
        anyhow::bail!(
            "{}",
            t!(
                "run.failures_detected",
                locale = locale,
                failed = summary.failed(),
                total = summary.total
            )
        )
    }
}

/// Prints what would be executed, without spawning anything.
fn print_plan(plan: &RunPlan, locale: &str) {
    println!("{}", t!("run.dry_run_banner", locale = locale).bold());
    for (i, target) in plan.targets.iter().enumerate() {
        let spec = LaunchSpec::for_target(target, target.path.clone(), &plan.env_override);
        println!(
            "  {}. {} -> {}",
            i + 1,
            target.name.cyan(),
            spec.display_command()
        );
    }
    if plan.headless {
        println!(
            "{}",
            t!(
                "run.dry_run_override",
                locale = locale,
                variable = &plan.env_override.variable,
                value = &plan.env_override.value
            )
        );
    }
}

/// Writes the optional HTML and JSON reports. A failed report is reported
/// on the console but does not change the outcome of the run.
fn write_reports(summary: &RunSummary, args: &RunArgs, locale: &str) {
    if let Some(path) = &args.html {
        println!(
            "\n{}",
            t!("run.html_report", locale = locale, path = path.display())
        );
        if let Err(e) = generate_html_report(summary, path, locale) {
            warn!(error = %e, "HTML report failed");
            eprintln!("{} {e:#}", t!("run.report_failed", locale = locale).red());
        }
    }

    if let Some(path) = &args.json {
        println!(
            "\n{}",
            t!("run.json_report", locale = locale, path = path.display())
        );
        if let Err(e) = write_json_report(summary, path) {
            warn!(error = %e, "JSON report failed");
            eprintln!("{} {e:#}", t!("run.report_failed", locale = locale).red());
        }
    }
}

/// Sets up a signal handler for graceful shutdown.
fn setup_signal_handler(locale: &str) -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();
    let locale = locale.to_string();

    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            return;
        }
        println!("\n{}", t!("run.shutdown_signal", locale = &locale).yellow());
        token_clone.cancel();
    });

    token
}
