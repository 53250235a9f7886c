//! slowcheck CLI entry point.

use clap::Parser;
use slowcheck::cli::{self, Cli, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli::run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
