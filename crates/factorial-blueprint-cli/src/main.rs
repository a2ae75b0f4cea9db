//! `blueprint` - check, scale and normalize factory blueprint documents

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = factorial_blueprint_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
