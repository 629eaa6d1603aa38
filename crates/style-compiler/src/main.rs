//! scoped-styles: compiles component-scoped stylesheets.

mod cli;
mod config;
mod orchestrator;
mod output;

use clap::Parser;
use cli::Args;
use miette::Result;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.trace);

    match orchestrator::run(args) {
        Ok(summary) => {
            if summary.failed() {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Installs the logger. `RUST_LOG` wins over `--trace`.
fn init_logging(trace: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Warn);
    if trace {
        builder.filter_module("scoped_styles", log::LevelFilter::Debug);
    }
    builder.parse_default_env().format_timestamp(None).init();
}
