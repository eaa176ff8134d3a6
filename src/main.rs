//! `dte` binary entrypoint.

use clap::Parser;
use dinner_table_economist::cli_app::{Cli, run};

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("dte: {error}");
            std::process::exit(1);
        }
    }
}
