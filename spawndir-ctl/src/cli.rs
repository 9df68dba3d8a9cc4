use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "spawndir-ctl")]
#[command(version, about = "Run a command in a chosen working directory", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Run a build in another directory, stderr kept separate
    spawndir-ctl run --dir /srv/app make all

    # Merge stderr into stdout
    spawndir-ctl run --dir /tmp --merge-stderr sh -c 'echo ok; echo bad 1>&2'

    # Force the fork/exec fallback even where posix_spawn could chdir
    spawndir-ctl run --dir /tmp --fallback ls

    # Show whether the native facility is present
    spawndir-ctl check
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a program in the given working directory
    Run {
        /// Working directory for the child
        #[arg(short = 'd', long = "dir", value_name = "PATH")]
        dir: PathBuf,

        /// Send stderr into the stdout pipe
        #[arg(long)]
        merge_stderr: bool,

        /// Leave stdout/stderr bound to the terminal instead of piping
        #[arg(long)]
        no_redirect: bool,

        /// Skip the native path even when available
        #[arg(long)]
        fallback: bool,

        /// Program to run
        program: String,

        /// Program arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Check whether the native chdir-aware spawn facility is present
    Check,
}
