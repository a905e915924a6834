// src/cli.rs
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueEnum};
use std::{env, ffi::OsString, path::PathBuf};

use crate::infra::t;

pub mod commands;

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Options of the `run` subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    /// Explicit run list; `None` falls back to `Runlist.toml` or the built-in list.
    pub config: Option<PathBuf>,
    /// Force the headless override on, regardless of `USE_AGG_BACKEND`.
    pub headless: bool,
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
    /// Exit 0 even when targets fail.
    pub legacy_exit: bool,
    pub dry_run: bool,
}

/// The parsed subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Run(RunArgs),
    Init { non_interactive: bool },
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub lang: Option<String>,
    pub log_level: Option<LogLevel>,
    /// `None` when no subcommand was given; this behaves like `run`.
    pub command: Option<CliCommand>,
}

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` or `--lang=<VALUE>` argument.
fn pre_parse_language(args: &[OsString]) -> Option<String> {
    let args: Vec<String> = args
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        return args.get(pos + 1).cloned();
    }
    args.iter()
        .find_map(|arg| arg.strip_prefix("--lang=").map(str::to_string))
}

fn build_cli(locale: &str) -> Command {
    Command::new("script-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about", locale = locale).to_string())
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help(t!("cli.log_level", locale = locale).to_string())
                .value_name("LEVEL")
                .value_parser(clap::value_parser!(LogLevel))
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cli.cmd_run_about", locale = locale).to_string())
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help(t!("cli.arg_config", locale = locale).to_string())
                        .value_name("CONFIG")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("headless")
                        .long("headless")
                        .help(t!("cli.arg_headless", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .help(t!("cli.arg_html", locale = locale).to_string())
                        .value_name("HTML")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help(t!("cli.arg_json", locale = locale).to_string())
                        .value_name("JSON")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("legacy-exit")
                        .long("legacy-exit")
                        .help(t!("cli.arg_legacy_exit", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help(t!("cli.arg_dry_run", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cli.cmd_init_about", locale = locale).to_string())
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("cli.arg_non_interactive", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn run_args_from(matches: &ArgMatches) -> RunArgs {
    RunArgs {
        config: matches.get_one::<PathBuf>("config").cloned(),
        headless: matches.get_flag("headless"),
        html: matches.get_one::<PathBuf>("html").cloned(),
        json: matches.get_one::<PathBuf>("json").cloned(),
        legacy_exit: matches.get_flag("legacy-exit"),
        dry_run: matches.get_flag("dry-run"),
    }
}

/// Parses an explicit argument list (the first item is the binary name).
pub fn try_parse_from<I, T>(args: I) -> Result<CliArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    // Pre-parse language and initialize i18n first, so help text is localized.
    let lang = pre_parse_language(&args);
    let locale = crate::init_locale(lang.as_deref());

    let matches = build_cli(&locale).try_get_matches_from(args)?;

    let command = match matches.subcommand() {
        Some(("run", run_matches)) => Some(CliCommand::Run(run_args_from(run_matches))),
        Some(("init", init_matches)) => Some(CliCommand::Init {
            non_interactive: init_matches.get_flag("non-interactive"),
        }),
        _ => None,
    };

    Ok(CliArgs {
        lang: matches.get_one::<String>("lang").cloned(),
        log_level: matches.get_one::<LogLevel>("log-level").copied(),
        command,
    })
}

/// Parses the process arguments, exiting with clap's message on error.
pub fn parse_args() -> CliArgs {
    try_parse_from(env::args_os()).unwrap_or_else(|e| e.exit())
}

/// Dispatches the parsed command.
pub async fn process_command(args: CliArgs) -> Result<()> {
    match args.command {
        Some(CliCommand::Init { non_interactive }) => {
            let language = crate::init_locale(args.lang.as_deref());
            commands::init::run_init_wizard(
                std::path::Path::new(crate::config::DEFAULT_CONFIG_FILE),
                &language,
                non_interactive,
            )
        }
        Some(CliCommand::Run(run_args)) => {
            commands::run::execute(run_args, args.lang.is_some()).await
        }
        None => commands::run::execute(RunArgs::default(), args.lang.is_some()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_flags_are_parsed() {
        let args = try_parse_from([
            "script-runner",
            "run",
            "--config",
            "runs/Runlist.toml",
            "--headless",
            "--json",
            "out/report.json",
            "--legacy-exit",
        ])
        .unwrap();

        assert_eq!(
            args.command,
            Some(CliCommand::Run(RunArgs {
                config: Some(PathBuf::from("runs/Runlist.toml")),
                headless: true,
                html: None,
                json: Some(PathBuf::from("out/report.json")),
                legacy_exit: true,
                dry_run: false,
            }))
        );
    }

    #[test]
    fn global_options_work_after_subcommand() {
        let args =
            try_parse_from(["script-runner", "run", "--log-level", "debug", "--lang", "en"])
                .unwrap();
        assert_eq!(args.log_level, Some(LogLevel::Debug));
        assert_eq!(args.lang.as_deref(), Some("en"));
    }

    #[test]
    fn no_subcommand_means_default_run() {
        let args = try_parse_from(["script-runner"]).unwrap();
        assert_eq!(args.command, None);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(try_parse_from(["script-runner", "run", "--parallel"]).is_err());
    }

    #[test]
    fn language_is_pre_parsed_in_both_forms() {
        let split: Vec<OsString> = ["x", "--lang", "zh-CN"].iter().map(OsString::from).collect();
        let joined: Vec<OsString> = ["x", "--lang=en"].iter().map(OsString::from).collect();
        assert_eq!(pre_parse_language(&split).as_deref(), Some("zh-CN"));
        assert_eq!(pre_parse_language(&joined).as_deref(), Some("en"));
        assert_eq!(pre_parse_language(&[]), None);
    }
}
