//! spawndir-ctl: run commands in a chosen working directory

mod cli;
mod commands;
mod logging;
mod runner;

use clap::Parser;
use cli::{Cli, Commands};
use console::style;
use runner::RunConfig;

fn main() {
    let cli = Cli::parse();

    logging::init_logger(cli.verbose);

    match cli.command {
        Commands::Check => commands::check_facility(),
        Commands::Run {
            dir,
            merge_stderr,
            no_redirect,
            fallback,
            program,
            args,
        } => {
            let config = RunConfig {
                dir,
                program,
                args,
                merge_stderr,
                no_redirect,
                force_fallback: fallback,
            };

            match runner::run(config) {
                Ok(code) => std::process::exit(code),
                Err(e) => {
                    eprintln!("{} {}", style("error:").red().bold(), e);
                    std::process::exit(1);
                }
            }
        }
    }
}
