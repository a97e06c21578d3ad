mod commands;
mod config;
mod context;
mod error;
mod generator;
mod hcl;
mod output;
mod select;
mod template;
mod traits;

#[cfg(test)]
mod test_helpers;

use clap::{Parser, Subcommand};
use commands::GenerateCommand;
use error::GenerateError;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "select-usage-groups")]
#[command(about = "Generate Terraform configuration for existing SELECT usage groups", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Flags for `generate`, which also runs when no subcommand is given
    #[command(flatten)]
    generate: GenerateCommand,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch usage group sets and usage groups and write Terraform files plus import.sh
    Generate(GenerateCommand),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let ctx = context::Context::new();

    let command = match cli.command {
        Some(Commands::Generate(command)) => command,
        None => cli.generate,
    };
    let result = command.execute(&ctx);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let generate_error = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<GenerateError>());

            match generate_error {
                Some(e) if e.is_transport() => {
                    ctx.output.error(&format!("API Error: {}", e));
                    ExitCode::from(2)
                }
                _ => {
                    ctx.output.error(&format!("Error: {:#}", err));
                    ExitCode::from(1)
                }
            }
        }
    }
}
