use clap::Parser;
use std::process::ExitCode;

use digitsweep::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = cli.output();

    if let Err(e) = cli.run(&output) {
        output.error(&format!("{e:#}"));
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
