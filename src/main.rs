//! dupscan - duplicate content finder
//!
//! Entry point for the dupscan CLI application.

use clap::Parser;
use dupscan::{cli::Cli, error::ExitCode, logging::init_logging};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match dupscan::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
    }
}
