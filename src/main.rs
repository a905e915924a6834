use script_runner::{cli, logging};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let cli_args = cli::parse_args();

    if let Err(e) = logging::init_logging(cli_args.log_level) {
        eprintln!("Warning: {e}");
    }

    // Process the command
    match cli::process_command(cli_args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
