//! fnpack CLI - Command-line utility for packaging serverless function
//! deployment zips.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    logging::init(cli.verbose, cli.quiet);

    // `--dest -` streams the artifact on stdout, so reports go to stderr.
    let stdout_reserved = matches!(&cli.command, cli::Commands::Archive(args) if args.dest == "-");
    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet, stdout_reserved);

    let (operation, result) = match &cli.command {
        cli::Commands::Archive(args) => (
            "archive",
            commands::archive::execute(args, &*formatter, cli.quiet),
        ),
        cli::Commands::Inspect(args) => ("inspect", commands::inspect::execute(args, &*formatter)),
        cli::Commands::Upload(args) => (
            "upload",
            commands::upload::execute(args, &*formatter, cli.quiet),
        ),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            ("completion", Ok(()))
        }
    };

    if let Err(err) = &result {
        formatter.format_error(operation, err);
    }
    result
}
