//! Filearc CLI - Command-line utility for filtered tar and zip archives.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    let result = match &cli.command {
        cli::Commands::Create(args) => commands::create::execute(args, &*formatter),
        cli::Commands::List(args) => commands::list::execute(args, &*formatter),
        cli::Commands::Extract(args) => commands::extract::execute(args, &*formatter),
        cli::Commands::Cat(args) => commands::cat::execute(args),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(cli.command.name(), &err);
            ExitCode::FAILURE
        }
    }
}
