use console::{style, StyledObject};
use env_logger::{Builder, Env};
use log::{Level, LevelFilter};
use std::io::Write;

fn level_tag(level: Level) -> StyledObject<&'static str> {
    match level {
        Level::Error => style("ERROR").red().bold(),
        Level::Warn => style("WARN ").yellow().bold(),
        Level::Info => style("INFO ").green(),
        Level::Debug => style("DEBUG").cyan(),
        Level::Trace => style("TRACE").dim(),
    }
}

/// Initialize the logger; `--verbose` lowers the filter to debug.
pub fn init_logger(verbose: bool) {
    let (filter, default_spec) = if verbose {
        (LevelFilter::Debug, "debug")
    } else {
        (LevelFilter::Warn, "warn")
    };

    Builder::from_env(Env::default().default_filter_or(default_spec))
        .format(|buf, record| {
            writeln!(buf, "{} {}", level_tag(record.level()), record.args())
        })
        .filter_level(filter)
        .init();
}
